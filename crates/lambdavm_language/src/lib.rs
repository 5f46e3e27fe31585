//! Lexer, parser, compiler, and bytecode VM for the untyped lambda calculus.
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization of source text
//! - [`Parser`] - Parsing tokens into an [`Ast`]
//! - [`compile_expr`] - Closure conversion of an AST into position-independent [`Bytecode`]
//! - [`Vm`] - Stack machine executing that bytecode against persistent environments
//! - [`Interpreter`] - Direct tree-walking evaluator, used as a reference for the VM

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod compiler;
pub mod interp;
pub mod lexer;
pub mod opcode;
pub mod parser;
pub mod scope;
pub mod span;
pub mod token;
pub mod trace;
pub mod vm;


pub use ast::Ast;
pub use compiler::{LambdaMap, compile, compile_expr, compile_mapped};
pub use interp::{Interpreter, TermClosure, interpret};
pub use lexer::Lexer;
pub use opcode::{Bytecode, Instruction, Opcode};
pub use parser::{DEFAULT_MAX_DEPTH, Parser, parse, parse_one};
pub use scope::ScopeChain;
pub use span::Span;
pub use token::{Token, TokenKind};
pub use trace::{TraceConfig, TraceOutput, TraceRecord, Tracer};
pub use vm::{Vm, VmConfig, eval};
