//! Error types for container accessors.
//!
//! Most misuse of the engine is defined as a no-op (wrapping a primitive,
//! reading a missing key, writing a read-only computed). The errors here
//! cover writes that have no sensible passthrough.

use thiserror::Error;

use crate::graph::{PropertyKey, TargetId};

/// Errors returned by fallible container operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReactiveError {
    /// An array-only operation was applied to a record.
    #[error("target {0} is a record, not an array")]
    NotAnArray(TargetId),

    /// The key cannot address a slot of an array.
    #[error("key `{key}` does not address an element of array {target}")]
    InvalidArrayKey { target: TargetId, key: PropertyKey },

    /// `length` was assigned something other than a non-negative integer.
    #[error("invalid array length {0}")]
    InvalidLength(String),

    /// Growing an array to `length` could not be allocated.
    #[error("cannot grow array {target} to length {length}")]
    CapacityExceeded { target: TargetId, length: usize },

    /// The key is reserved for the engine.
    #[error("key `{0}` is reserved")]
    ReservedKey(PropertyKey),
}

/// Result alias used throughout the crate.
pub type Result<T, E = ReactiveError> = std::result::Result<T, E>;
