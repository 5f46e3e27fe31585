//! Core types, runtime values, and environment chains for lambdavm.
//!
//! This crate provides:
//! - [`Value`] - The closed set of values the VM manipulates
//! - [`Env`] - Persistent, structurally shared runtime environment chains
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod env;
pub mod error;
pub mod value;

pub use env::Env;
pub use error::{Error, ErrorContext, ErrorKind, StackKind};
pub use value::{Closure, Value, ValueKind};

/// Result type alias using lambdavm's Error type.
pub type Result<T> = std::result::Result<T, Error>;
