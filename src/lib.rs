//! lambdavm - closure-converting compiler and bytecode VM for the untyped lambda calculus
//!
//! This crate re-exports all layers of the lambdavm system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: lambdavm_runtime    - REPL, line editor, CLI
//! Layer 1: lambdavm_language   - Lexer, parser, scope chain, compiler, bytecode VM
//! Layer 0: lambdavm_foundation - Core types (Value, Env, Error)
//! ```

pub use lambdavm_foundation as foundation;
pub use lambdavm_language as language;
pub use lambdavm_runtime as runtime;
