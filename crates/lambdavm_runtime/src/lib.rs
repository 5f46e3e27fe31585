//! REPL and CLI for lambdavm.
//!
//! This crate provides:
//! - [`Repl`] - Interactive read-eval-print loop
//! - [`parse_args`] - Command-line parsing for the `lambdavm` binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cli;
pub mod editor;
pub mod highlight;
pub mod repl;

pub use cli::{CliConfig, CliError, parse_args};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Command, Repl};
