//! Dependency Graph
//!
//! This module implements the bookkeeping that links observed values to
//! the computations that read them.
//!
//! # Overview
//!
//! The graph is a two-level table:
//!
//! - The outer level is indexed by target (a container, ref or computed
//!   value), identified by reference through a [`TargetId`].
//! - The inner level is indexed by [`PropertyKey`] and holds the ordered
//!   set of subscribers that read that key.
//!
//! Reads add edges (`track`), writes look edges up (`trigger`). The graph
//! itself never runs anything; the reactive runtime owns one table per
//! thread and decides how subscribers are notified.
//!
//! # Design Decisions
//!
//! 1. Targets are arena-style IDs rather than references, so a target's
//!    entry can be pruned explicitly when the target is torn down.
//!
//! 2. Buckets are insertion-ordered sets: notification order is
//!    deterministic and duplicate subscriptions are impossible.
//!
//! 3. Edges only grow. A subscriber that stops reading a key on a later
//!    run stays in that key's bucket until the target goes away.

mod deps;
mod key;
mod target;

pub use deps::{Bucket, DependencyGraph, Snapshot, TargetEntry};
pub use key::{PropertyKey, LENGTH_KEY, VALUE_KEY};
pub use target::{Target, TargetId};
