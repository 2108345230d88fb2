//! Observed containers.
//!
//! A [`Reactive`] is the observed view of a raw [`Object`]. Reads through
//! it register the running effect as a dependent of the key read; writes
//! through it notify the dependents of the keys that actually changed.
//!
//! # How Wrapping Works
//!
//! 1. [`reactive`] wraps object-shaped values and passes everything else
//!    through. Wrapping a view returns the same view.
//!
//! 2. The runtime keeps one live view per raw container (the wrap-cache),
//!    so wrapping the same container twice yields the same view for as
//!    long as a handle to it is alive.
//!
//! 3. Nested containers are wrapped on read, not up front. A container
//!    that is never read through a view is never wrapped.
//!
//! # Arrays
//!
//! `length` is an observable key. A write that changes the length
//! notifies `length` readers once, whichever key was written. Truncating
//! also notifies the readers of each removed index.
//!
//! # Records
//!
//! Adding a field changes the key set. Readers of the key set (`len`,
//! `keys`, `values`, `reduce`) are notified through [`KEYS`].

use std::fmt;
use std::rc::Rc;

use super::object::Object;
use super::runtime::Runtime;
use super::value::{has_change, Value};
use crate::error::{ReactiveError, Result};
use crate::graph::{PropertyKey, Target, TargetId};

/// Tag of the marker key that every view answers with `true`.
pub const IS_REACTIVE: &str = "is_reactive";

/// Tag of the key tracked by reads that depend on a record's key set.
pub const KEYS: &str = "keys";

fn is_marker(key: &PropertyKey) -> bool {
    matches!(key, PropertyKey::Symbol(tag) if *tag == IS_REACTIVE)
}

pub(crate) struct ProxyInner {
    raw: Object,
}

impl Drop for ProxyInner {
    fn drop(&mut self) {
        Runtime::evict_proxy(self.raw.id());
    }
}

/// The observed view of a raw container.
///
/// Cloning a `Reactive` creates another handle to the same view. Views
/// share the [`TargetId`] of their raw container.
#[derive(Clone)]
pub struct Reactive {
    inner: Rc<ProxyInner>,
}

impl Reactive {
    /// Get the view of `raw`, creating it if none is alive.
    pub fn new(raw: Object) -> Self {
        if let Some(inner) = Runtime::cached_proxy(raw.id()) {
            return Self { inner };
        }

        let inner = Rc::new(ProxyInner { raw });
        Runtime::cache_proxy(inner.raw.id(), &inner);
        Self { inner }
    }

    /// The raw container behind this view.
    pub fn raw(&self) -> &Object {
        &self.inner.raw
    }

    /// Get the target ID shared with the raw container.
    pub fn id(&self) -> TargetId {
        self.inner.raw.id()
    }

    /// Whether two handles refer to the same view.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_array(&self) -> bool {
        self.inner.raw.is_array()
    }

    /// Read a slot and record the read.
    ///
    /// Containers found in the slot come back as views. The marker key
    /// reads as `true` and is not recorded.
    pub fn get(&self, key: impl Into<PropertyKey>) -> Value {
        let key = self.normalize(key.into());
        if is_marker(&key) {
            return Value::Bool(true);
        }

        Runtime::track(self.id(), &key);
        wrap(self.inner.raw.get(&key))
    }

    /// Read a slot without recording the read.
    pub fn get_untracked(&self, key: impl Into<PropertyKey>) -> Value {
        let key = self.normalize(key.into());
        if is_marker(&key) {
            return Value::Bool(true);
        }
        wrap(self.inner.raw.get(&key))
    }

    /// Whether the container has a slot for `key`. Records the read.
    pub fn has(&self, key: impl Into<PropertyKey>) -> bool {
        let key = self.normalize(key.into());
        if is_marker(&key) {
            return true;
        }

        Runtime::track(self.id(), &key);
        self.inner.raw.contains_key(&key)
    }

    /// Write a slot and notify the readers of what changed.
    ///
    /// Writing a value equal to the current one (NaN included) notifies
    /// nobody.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Result<()> {
        let key = self.normalize(key.into());
        if is_marker(&key) {
            return Err(ReactiveError::ReservedKey(key));
        }

        let raw = &self.inner.raw;
        let value = value.into();
        let is_array = raw.is_array();
        let had_key = raw.contains_key(&key);
        let old_len = raw.len();

        let old = raw.set(&key, value.clone())?;
        let changed = has_change(&old, &value);
        let new_len = raw.len();
        drop(old);

        let id = self.id();
        if changed {
            Runtime::trigger(id, &key);
        }

        if is_array {
            if new_len != old_len && !key.is_length() {
                Runtime::trigger(id, &PropertyKey::length());
            }
            for index in new_len..old_len {
                Runtime::trigger(id, &PropertyKey::Index(index));
            }
        } else if !had_key {
            Runtime::trigger(id, &PropertyKey::Symbol(KEYS));
        }

        Ok(())
    }

    /// Array length or record field count. Records the read.
    pub fn len(&self) -> usize {
        Runtime::track(self.id(), &self.iteration_key());
        self.inner.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in order. Records a read of the key set.
    pub fn keys(&self) -> Vec<PropertyKey> {
        Runtime::track(self.id(), &self.iteration_key());
        self.inner.raw.keys()
    }

    /// Iterate the values in order, recording each read as it happens.
    pub fn iter_values(&self) -> impl Iterator<Item = Value> + '_ {
        self.keys().into_iter().map(move |key| self.get(key))
    }

    /// The values in order. Records every read.
    pub fn values(&self) -> Vec<Value> {
        self.iter_values().collect()
    }

    /// Fold the values in order. Records every read.
    pub fn reduce<A, F>(&self, init: A, f: F) -> A
    where
        F: FnMut(A, Value) -> A,
    {
        self.iter_values().fold(init, f)
    }

    /// Append to an array and return the new length.
    ///
    /// The current length is read without being recorded, so an effect
    /// that pushes does not re-run because of its own push.
    pub fn push(&self, value: impl Into<Value>) -> Result<usize> {
        let raw = &self.inner.raw;
        if !raw.is_array() {
            return Err(ReactiveError::NotAnArray(self.id()));
        }

        let index = raw.len();
        self.set(index, value)?;
        Ok(index + 1)
    }

    /// Remove and return the last element of an array.
    ///
    /// Popping an empty array returns `Undefined` and notifies nobody.
    pub fn pop(&self) -> Result<Value> {
        let raw = &self.inner.raw;
        if !raw.is_array() {
            return Err(ReactiveError::NotAnArray(self.id()));
        }

        let len = raw.len();
        if len == 0 {
            return Ok(Value::Undefined);
        }

        let last = wrap(raw.get(&PropertyKey::Index(len - 1)));
        self.set(PropertyKey::length(), Value::Number((len - 1) as f64))?;
        Ok(last)
    }

    fn iteration_key(&self) -> PropertyKey {
        if self.is_array() {
            PropertyKey::length()
        } else {
            PropertyKey::Symbol(KEYS)
        }
    }

    /// One spelling per slot: indices on arrays, names on records.
    fn normalize(&self, key: PropertyKey) -> PropertyKey {
        if self.is_array() {
            match key.as_index() {
                Some(index) => PropertyKey::Index(index),
                None => key,
            }
        } else {
            key.into_record_key()
        }
    }
}

fn wrap(value: Value) -> Value {
    match value {
        Value::Object(object) => Value::Reactive(Reactive::new(object)),
        other => other,
    }
}

impl Target for Reactive {
    fn target_id(&self) -> TargetId {
        self.id()
    }
}

impl fmt::Debug for Reactive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reactive({:?})", self.inner.raw)
    }
}

/// Wrap an object-shaped value into its observed view.
///
/// Views are returned unchanged and every other value passes through.
///
/// ```rust
/// use ripple_core::{is_reactive, reactive, Object, Value};
///
/// let state = reactive(Object::from_entries([("a", 1)]));
/// assert!(is_reactive(&state));
/// assert_eq!(reactive(state.clone()), state);
///
/// assert_eq!(reactive(3), Value::from(3));
/// ```
pub fn reactive(value: impl Into<Value>) -> Value {
    wrap(value.into())
}

/// Whether the value is an observed view.
///
/// Answered by reading the marker key, which every view reports as set.
pub fn is_reactive(value: &Value) -> bool {
    match value {
        Value::Reactive(view) => {
            view.get_untracked(PropertyKey::Symbol(IS_REACTIVE)) == Value::Bool(true)
        }
        _ => false,
    }
}

/// The raw container behind a view. Other values are returned unchanged.
pub fn to_raw(value: &Value) -> Value {
    match value {
        Value::Reactive(view) => Value::Object(view.raw().clone()),
        other => other.clone(),
    }
}
