//! Graph Targets
//!
//! This module defines the identity of the things that can be observed:
//! raw containers, refs and computed values.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for an observed target.
///
/// Targets are identified by reference, never by value: two containers
/// holding equal data still get distinct IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    /// Generate a new unique target ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for TargetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that owns an entry in the dependency graph.
pub trait Target {
    /// The identity under which reads and writes of this value are recorded.
    fn target_id(&self) -> TargetId;
}

impl Target for TargetId {
    fn target_id(&self) -> TargetId {
        *self
    }
}
