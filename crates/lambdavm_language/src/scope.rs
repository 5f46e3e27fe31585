//! Compile-time scope chain.
//!
//! A [`ScopeChain`] lists the names bound by the enclosing lambdas, innermost
//! first. The position of a name in the chain is the number of frames the VM
//! has to walk at runtime to reach its binding, so the compiler can turn every
//! symbol into an `ENV_LOOKUP <hops>` without any runtime name resolution.
//!
//! Chains are persistent: [`ScopeChain::bind`] returns a new chain that shares
//! structure with the old one, which stays valid for sibling subexpressions.

use im::Vector;

/// Persistent list of bound names, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeChain {
    names: Vector<String>,
}

impl ScopeChain {
    /// Returns the empty chain (top level, nothing bound).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a chain with `name` as the new innermost binding.
    #[must_use]
    pub fn bind(&self, name: impl Into<String>) -> Self {
        let mut names = self.names.clone();
        names.push_front(name.into());
        Self { names }
    }

    /// Returns the hop count of the innermost binding of `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|bound| bound == name)
    }

    /// Returns the number of enclosing bindings.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.names.len()
    }

    /// Iterates over bound names, innermost first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
