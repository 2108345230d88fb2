//! Dependency Table
//!
//! The dependency table records, for every target and every key of it,
//! which subscribers read that key. It holds no business logic: callers
//! decide what "notify" means.
//!
//! # Layout
//!
//! ```text
//! TargetId -> PropertyKey -> {subscriber, subscriber, ...}
//! ```
//!
//! Buckets keep insertion order so that notification order is
//! deterministic, and they are sets so a subscriber that reads the same
//! key many times is recorded once.

use std::collections::HashMap;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

use super::key::PropertyKey;
use super::target::TargetId;

/// Subscribers of one (target, key) pair, in the order they first read it.
pub type Bucket<S> = IndexSet<S>;

/// All buckets of one target.
pub type TargetEntry<S> = IndexMap<PropertyKey, Bucket<S>>;

/// A copy of a bucket taken before notification starts.
///
/// Most keys have a handful of readers, so small snapshots stay inline.
pub type Snapshot<S> = SmallVec<[S; 4]>;

/// The (target, key) -> subscribers table.
#[derive(Debug)]
pub struct DependencyGraph<S> {
    /// Buckets, indexed by target.
    targets: HashMap<TargetId, TargetEntry<S>>,
}

impl<S> DependencyGraph<S>
where
    S: Clone + Eq + Hash,
{
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            targets: HashMap::new(),
        }
    }

    /// Record that `subscriber` read `key` of `target`.
    ///
    /// Creates the target entry and the bucket on demand. Returns `true`
    /// when the subscriber was not yet in the bucket.
    pub fn add_dependency(&mut self, target: TargetId, key: &PropertyKey, subscriber: &S) -> bool {
        let bucket = self
            .targets
            .entry(target)
            .or_default()
            .entry(key.clone())
            .or_default();

        // Only clone when inserting: a rejected duplicate would otherwise be
        // dropped while the caller still holds the table.
        if bucket.contains(subscriber) {
            return false;
        }
        bucket.insert(subscriber.clone())
    }

    /// Snapshot the subscribers of a (target, key) pair.
    ///
    /// The snapshot is detached from the table, so notifying its members
    /// may freely add to the very bucket it was taken from.
    pub fn subscribers(&self, target: TargetId, key: &PropertyKey) -> Snapshot<S> {
        self.targets
            .get(&target)
            .and_then(|entry| entry.get(key))
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of subscribers of a (target, key) pair.
    pub fn subscriber_count(&self, target: TargetId, key: &PropertyKey) -> usize {
        self.targets
            .get(&target)
            .and_then(|entry| entry.get(key))
            .map_or(0, IndexSet::len)
    }

    /// Number of keys of `target` that have a bucket.
    pub fn key_count(&self, target: TargetId) -> usize {
        self.targets.get(&target).map_or(0, IndexMap::len)
    }

    /// Whether `target` has an entry at all.
    pub fn contains_target(&self, target: TargetId) -> bool {
        self.targets.contains_key(&target)
    }

    /// Remove a target's whole entry.
    ///
    /// The entry is handed back rather than dropped here: dropping
    /// subscribers can release other targets, which need the table again.
    pub fn remove_target(&mut self, target: TargetId) -> Option<TargetEntry<S>> {
        self.targets.remove(&target)
    }

    /// Remove every entry, handing them back to the caller.
    pub fn take_all(&mut self) -> HashMap<TargetId, TargetEntry<S>> {
        std::mem::take(&mut self.targets)
    }

    /// Get the total number of targets with an entry.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

impl<S> Default for DependencyGraph<S>
where
    S: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
