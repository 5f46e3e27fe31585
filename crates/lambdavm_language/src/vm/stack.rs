//! Capacity-checked stacks owned by a VM instance.

use lambdavm_foundation::{Error, Result, StackKind};

/// A stack that refuses to grow past a fixed capacity.
#[derive(Debug)]
pub(crate) struct BoundedStack<T> {
    items: Vec<T>,
    capacity: usize,
    kind: StackKind,
}

impl<T> BoundedStack<T> {
    pub(crate) fn new(kind: StackKind, capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity.min(256)),
            capacity,
            kind,
        }
    }

    pub(crate) fn push(&mut self, item: T) -> Result<()> {
        if self.items.len() >= self.capacity {
            return Err(Error::stack_exhausted(self.kind, self.capacity));
        }
        self.items.push(item);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<T> {
        self.items
            .pop()
            .ok_or_else(|| Error::stack_underflow(self.kind))
    }

    pub(crate) fn peek(&self) -> Result<&T> {
        self.items
            .last()
            .ok_or_else(|| Error::stack_underflow(self.kind))
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}
