//! Error types for the reactive system.
//!
//! Errors surface to whoever triggered the work: construction errors to the
//! caller registering an effect, and callback failures to the caller of the
//! `set()` that started the propagation pass.

use thiserror::Error;

use crate::reactive::{CellId, SlotKey};

/// Boxed error produced by user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = ReactiveError> = std::result::Result<T, E>;

/// Everything that can go wrong inside the reactive core.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// A dependency list entry cannot be wired into the registering runtime.
    #[error("dependency #{position} is not a valid dependency (got {type_name})", position = .index + 1)]
    InvalidDependency {
        /// Zero-based index into the dependency list.
        index: usize,
        /// Type name of the offending entry.
        type_name: &'static str,
    },

    /// A `set()` was entered deeper than the configured propagation limit.
    #[error("reentrant mutation of {cell} at propagation depth {depth} (limit {limit})")]
    ReentrantMutation {
        /// The cell whose `set()` was refused.
        cell: CellId,
        /// Depth at which the mutation was attempted.
        depth: usize,
        /// The configured maximum depth.
        limit: usize,
    },

    /// A named slot was requested with a different value type than it holds.
    #[error("slot {key} holds {found}, requested as {expected}")]
    SlotTypeMismatch {
        /// Identity of the slot.
        key: SlotKey,
        /// The type the caller asked for.
        expected: &'static str,
        /// The type stored on first creation.
        found: &'static str,
    },

    /// A user callback (effect, hook or trigger action) failed.
    #[error("callback failed: {0}")]
    Callback(#[source] BoxError),

    /// Runtime configuration could not be parsed.
    #[error("invalid runtime configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl ReactiveError {
    /// Wrap an arbitrary error raised by user code.
    pub fn callback(err: impl Into<BoxError>) -> Self {
        Self::Callback(err.into())
    }
}
