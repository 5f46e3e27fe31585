//! Runtime environment chains.
//!
//! An [`Env`] is a persistent singly linked list of frames, innermost first.
//! Frames are reference counted and never mutated: extending an environment
//! allocates a new head frame that points at the existing chain, so a closure
//! can hold on to the chain it captured while other calls extend it
//! independently.

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// One binding in an environment chain.
struct Frame {
    value: Value,
    next: Env,
}

/// A persistent runtime environment chain (possibly empty).
#[derive(Clone, Default)]
pub struct Env(Option<Rc<Frame>>);

impl Env {
    /// Returns the empty environment.
    #[must_use]
    pub const fn empty() -> Self {
        Self(None)
    }

    /// Returns true if this environment has no frames.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns a new environment with `value` bound in a fresh innermost frame.
    ///
    /// `self` is left untouched; the new frame shares the existing chain.
    #[must_use]
    pub fn extend(&self, value: Value) -> Self {
        Self(Some(Rc::new(Frame {
            value,
            next: self.clone(),
        })))
    }

    /// Walks `hops` frames outward and returns the value bound there.
    #[must_use]
    pub fn lookup(&self, hops: usize) -> Option<&Value> {
        let mut frame = self.0.as_deref()?;
        for _ in 0..hops {
            frame = frame.next.0.as_deref()?;
        }
        Some(&frame.value)
    }

    /// Returns the number of frames in the chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.0.as_deref();
        while let Some(frame) = cursor {
            depth += 1;
            cursor = frame.next.0.as_deref();
        }
        depth
    }

    /// Returns true if both environments are the same chain (identity, not structure).
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Env {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Env {}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Env(depth={})", self.depth())
    }
}

// Unlink frames one at a time so long chains don't recurse on drop.
impl Drop for Env {
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(mut frame) => next = frame.next.0.take(),
                Err(_) => break,
            }
        }
    }
}
