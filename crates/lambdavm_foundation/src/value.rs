//! Runtime values manipulated by the VM.

use std::fmt;

use crate::env::Env;
use crate::error::Error;
use crate::Result;

/// A runtime value.
///
/// Values are produced and consumed only by the VM; the compiler never
/// constructs them. Cloning is cheap: environments are reference counted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A reference to an environment chain.
    Environment(Env),
    /// A code address paired with the environment captured when it was created.
    Closure(Closure),
    /// An absolute offset into the instruction stream.
    Address(usize),
}

/// A closure: code address plus captured lexical environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Closure {
    /// Address of the first instruction of the lambda body.
    pub address: usize,
    /// Environment captured when the lambda expression was evaluated.
    pub env: Env,
}

/// The tag of a [`Value`], for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Environment`]
    Environment,
    /// [`Value::Closure`]
    Closure,
    /// [`Value::Address`]
    Address,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::Closure => write!(f, "closure"),
            Self::Address => write!(f, "address"),
        }
    }
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Environment(_) => ValueKind::Environment,
            Self::Closure(_) => ValueKind::Closure,
            Self::Address(_) => ValueKind::Address,
        }
    }

    /// Returns true if this value is a closure.
    #[must_use]
    pub const fn is_closure(&self) -> bool {
        matches!(self, Self::Closure(_))
    }

    /// Attempts to extract a closure reference.
    #[must_use]
    pub const fn as_closure(&self) -> Option<&Closure> {
        match self {
            Self::Closure(c) => Some(c),
            _ => None,
        }
    }

    /// Attempts to extract an address.
    #[must_use]
    pub const fn as_address(&self) -> Option<usize> {
        match self {
            Self::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// Consumes the value, expecting an environment reference.
    ///
    /// # Errors
    /// Returns a type mismatch error for any other kind.
    pub fn into_env(self) -> Result<Env> {
        match self {
            Self::Environment(env) => Ok(env),
            other => Err(Error::type_mismatch(ValueKind::Environment, other.kind())),
        }
    }

    /// Consumes the value, expecting a closure.
    ///
    /// # Errors
    /// Returns a type mismatch error for any other kind.
    pub fn into_closure(self) -> Result<Closure> {
        match self {
            Self::Closure(closure) => Ok(closure),
            other => Err(Error::type_mismatch(ValueKind::Closure, other.kind())),
        }
    }

    /// Consumes the value, expecting an address.
    ///
    /// # Errors
    /// Returns a type mismatch error for any other kind.
    pub fn into_address(self) -> Result<usize> {
        match self {
            Self::Address(addr) => Ok(addr),
            other => Err(Error::type_mismatch(ValueKind::Address, other.kind())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment(_) => write!(f, "{{environment}}"),
            Self::Closure(_) => write!(f, "<lambda>"),
            Self::Address(addr) => write!(f, "[address: {addr:x}]"),
        }
    }
}
