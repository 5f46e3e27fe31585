//! Cross-layer integration tests for lambdavm
//!
//! Tests that verify correct interaction between multiple crates.

mod pipeline;
mod properties;
