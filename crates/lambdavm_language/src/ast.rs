//! Abstract Syntax Tree for lambda-calculus expressions.
//!
//! Every node owns its children; nothing is shared between subtrees.
//! Dropping a tree is iterative, so trees of any depth can be built and
//! released without exhausting the native stack.

use std::fmt;

use crate::span::Span;

/// An AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Ast {
    /// Variable reference like `x`
    Symbol(String, Span),
    /// Abstraction like `\x body`
    Lambda(String, Box<Ast>, Span),
    /// Application like `(f a)`
    Application(Box<Ast>, Box<Ast>, Span),
}

impl Ast {
    /// Creates a symbol node with a default span.
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into(), Span::default())
    }

    /// Creates a lambda node with a default span.
    #[must_use]
    pub fn lambda(param: impl Into<String>, body: Self) -> Self {
        Self::Lambda(param.into(), Box::new(body), Span::default())
    }

    /// Creates an application node with a default span.
    #[must_use]
    pub fn apply(operator: Self, operand: Self) -> Self {
        Self::Application(Box::new(operator), Box::new(operand), Span::default())
    }

    /// Returns the source span of this AST node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Symbol(_, s) | Self::Lambda(_, _, s) | Self::Application(_, _, s) => *s,
        }
    }

    /// Returns the symbol name, or None if this is not a symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(name, _) => Some(name),
            _ => None,
        }
    }

    /// Returns true if this is a lambda.
    #[must_use]
    pub const fn is_lambda(&self) -> bool {
        matches!(self, Self::Lambda(..))
    }

    /// Returns true if this is an application.
    #[must_use]
    pub const fn is_application(&self) -> bool {
        matches!(self, Self::Application(..))
    }
}

impl Drop for Ast {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_children(&mut node, &mut pending);
        }
    }
}

/// Moves every non-leaf child of `node` into `out`, leaving empty symbols.
fn detach_children(node: &mut Ast, out: &mut Vec<Ast>) {
    let mut detach = |child: &mut Box<Ast>| {
        if !matches!(**child, Ast::Symbol(..)) {
            out.push(std::mem::replace(
                &mut **child,
                Ast::Symbol(String::new(), Span::default()),
            ));
        }
    };
    match node {
        Ast::Symbol(..) => {}
        Ast::Lambda(_, body, _) => detach(body),
        Ast::Application(operator, operand, _) => {
            detach(operator);
            detach(operand);
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(name, _) => write!(f, "{name}"),
            Self::Lambda(param, body, _) => write!(f, "\\{param} {body}"),
            Self::Application(operator, operand, _) => write!(f, "({operator} {operand})"),
        }
    }
}
