//! Propagation Context
//!
//! Tracks how deeply `set()` calls are nested inside one another. A
//! subscriber that mutates a cell while a propagation pass is running starts
//! a nested pass on the same call stack; the context counts those passes and
//! refuses to go past the configured limit.
//!
//! # Implementation
//!
//! Each runtime owns one context. Entering returns a guard that decrements
//! the depth again when dropped, so the count stays correct when a callback
//! returns an error or panics halfway through a pass.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::stateful::CellId;
use crate::error::{ReactiveError, Result};

/// Nesting counter for propagation passes of one runtime.
#[derive(Debug)]
pub struct PropagationContext {
    depth: AtomicUsize,
    limit: Option<usize>,
}

impl PropagationContext {
    /// Create a context that allows at most `limit` nested passes.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            depth: AtomicUsize::new(0),
            limit,
        }
    }

    /// Enter a propagation pass for `cell`.
    ///
    /// Fails without changing the depth when the limit would be exceeded.
    pub fn enter(&self, cell: CellId) -> Result<PropagationGuard<'_>> {
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(limit) = self.limit {
            if depth > limit {
                self.depth.fetch_sub(1, Ordering::SeqCst);
                tracing::warn!(%cell, depth, limit, "propagation depth limit reached");
                return Err(ReactiveError::ReentrantMutation { cell, depth, limit });
            }
        }

        Ok(PropagationGuard { context: self, depth })
    }

    /// Current nesting depth; zero outside of any `set()`.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    /// Check if a propagation pass is running.
    pub fn is_propagating(&self) -> bool {
        self.depth() > 0
    }

    /// The configured nesting limit.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// Guard that leaves the propagation pass when dropped.
#[derive(Debug)]
pub struct PropagationGuard<'a> {
    context: &'a PropagationContext,
    depth: usize,
}

impl PropagationGuard<'_> {
    /// Depth of the pass this guard belongs to (1 for a top-level `set()`).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for PropagationGuard<'_> {
    fn drop(&mut self) {
        self.context.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
