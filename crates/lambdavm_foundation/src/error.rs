//! Error types for the lambdavm system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::value::ValueKind;

/// The main error type for lambdavm operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an unbound symbol error.
    #[must_use]
    pub fn unbound_symbol(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundSymbol(name.into()))
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: ValueKind, actual: ValueKind) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates a stack exhaustion error.
    #[must_use]
    pub fn stack_exhausted(stack: StackKind, capacity: usize) -> Self {
        Self::new(ErrorKind::StackExhausted { stack, capacity })
    }

    /// Creates a stack underflow error.
    #[must_use]
    pub fn stack_underflow(stack: StackKind) -> Self {
        Self::new(ErrorKind::StackUnderflow(stack))
    }

    /// Returns true if this error is a resource-exhaustion fault
    /// (a bounded stack or the instruction budget ran out).
    #[must_use]
    pub const fn is_exhaustion(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::StackExhausted { .. } | ErrorKind::StepLimitExceeded(_)
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A symbol was referenced outside every lambda that binds it.
    #[error("unbound symbol: {0}")]
    UnboundSymbol(String),

    /// Parse error in source text.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// The source line where the error occurred.
        context: String,
    },

    /// A push exceeded the capacity of one of the VM stacks.
    #[error("{stack} stack exhausted (capacity {capacity})")]
    StackExhausted {
        /// The stack that overflowed.
        stack: StackKind,
        /// Its configured capacity.
        capacity: usize,
    },

    /// A pop was attempted on an empty VM stack.
    #[error("{0} stack underflow")]
    StackUnderflow(StackKind),

    /// Execution finished with something other than exactly one value.
    #[error("execution ended with {depth} values on the operand stack (expected 1)")]
    MalformedResult {
        /// Number of values left on the operand stack.
        depth: usize,
    },

    /// An instruction found a value of the wrong kind.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected kind.
        expected: ValueKind,
        /// The kind actually found.
        actual: ValueKind,
    },

    /// An instruction word does not encode any opcode.
    #[error("invalid opcode {word} at address {address}")]
    InvalidOpcode {
        /// The undecodable word.
        word: i32,
        /// Where it was found.
        address: usize,
    },

    /// An opcode's inline operand lies past the end of the program.
    #[error("truncated instruction at address {address}")]
    TruncatedInstruction {
        /// Address of the opcode.
        address: usize,
    },

    /// A jump or address computation produced a negative address.
    #[error("invalid address: {0}")]
    InvalidAddress(i64),

    /// An environment lookup walked past the end of the chain.
    #[error("environment lookup of {hops} hops in a chain of depth {depth}")]
    LookupOutOfRange {
        /// Requested hop count.
        hops: usize,
        /// Actual depth of the chain.
        depth: usize,
    },

    /// The configured instruction budget ran out.
    #[error("step limit ({0}) exceeded")]
    StepLimitExceeded(u64),

    /// Internal error (I/O, terminal, or an invariant violation).
    #[error("internal error: {0}")]
    Internal(String),
}

/// The three stacks owned by the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackKind {
    /// Operand stack holding intermediate values.
    Operand,
    /// Saved caller environments.
    Environment,
    /// Return addresses.
    Return,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand => write!(f, "operand"),
            Self::Environment => write!(f, "environment"),
            Self::Return => write!(f, "return"),
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Source file or expression description.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Column number in source.
    pub column: Option<usize>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            line: None,
            column: None,
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source, self.line, self.column) {
            (Some(source), Some(line), Some(col)) => write!(f, "at {source}:{line}:{col}"),
            (Some(source), _, _) => write!(f, "at {source}"),
            (None, Some(line), Some(col)) => write!(f, "at {line}:{col}"),
            _ => Ok(()),
        }
    }
}
