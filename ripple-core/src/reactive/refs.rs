//! Ref Implementation
//!
//! A Ref boxes a single value under the observable key `value`. It is the
//! reactive primitive for state that is not a container: a counter, a
//! flag, the currently selected item.
//!
//! # How Refs Work
//!
//! 1. Reading the ref inside an effect registers the effect on `value`.
//!
//! 2. Writing a different value stores it, then notifies those effects.
//!    Writing the value the ref already holds (NaN included) does nothing.
//!
//! 3. Containers stored in a ref are stored as their observed view, so
//!    reads through the ref can be observed deeply.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::proxy::reactive;
use super::runtime::Runtime;
use super::value::{has_change, Value};
use crate::graph::{PropertyKey, Target, TargetId};

struct RefInner {
    id: TargetId,
    value: RefCell<Value>,
}

impl Drop for RefInner {
    fn drop(&mut self) {
        Runtime::release_target(self.id);
    }
}

/// A reactive box holding one [`Value`].
///
/// Cloning a `Ref` creates another handle to the same box.
///
/// # Example
///
/// ```rust
/// use ripple_core::{effect, r#ref, EffectOptions, Value};
///
/// let count = r#ref(1);
///
/// let reader = count.clone();
/// let watcher = effect(move || { reader.get(); }, EffectOptions::default());
///
/// count.set(2);
/// assert_eq!(watcher.run_count(), 2);
///
/// count.set(2);
/// assert_eq!(watcher.run_count(), 2);
/// assert_eq!(count.get(), Value::from(2));
/// ```
#[derive(Clone)]
pub struct Ref {
    inner: Rc<RefInner>,
}

impl Ref {
    /// Box `value`. Boxing a ref returns that same ref.
    pub fn new(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Ref(existing) => existing,
            value => Self {
                inner: Rc::new(RefInner {
                    id: TargetId::new(),
                    value: RefCell::new(reactive(value)),
                }),
            },
        }
    }

    /// Get the ref's target ID.
    pub fn id(&self) -> TargetId {
        self.inner.id
    }

    /// Whether two handles refer to the same ref.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read the value and record the read.
    pub fn get(&self) -> Value {
        Runtime::track(self.inner.id, &PropertyKey::value());
        self.get_untracked()
    }

    /// Read the value without recording the read.
    pub fn get_untracked(&self) -> Value {
        self.inner.value.borrow().clone()
    }

    /// Store `value` and notify readers if it differs from the current one.
    pub fn set(&self, value: impl Into<Value>) {
        let value = value.into();
        if !has_change(&self.inner.value.borrow(), &value) {
            return;
        }

        let previous = self.inner.value.replace(reactive(value));
        drop(previous);
        Runtime::trigger(self.inner.id, &PropertyKey::value());
    }

    /// Replace the value with `f(current)`. The current value is read
    /// without being recorded.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&Value) -> Value,
    {
        let next = f(&self.get_untracked());
        self.set(next);
    }
}

impl Target for Ref {
    fn target_id(&self) -> TargetId {
        self.inner.id
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

/// Box `value` in a [`Ref`]. Passing a ref returns it unchanged.
pub fn r#ref(value: impl Into<Value>) -> Ref {
    Ref::new(value)
}

/// Whether the value is a ref.
pub fn is_ref(value: &Value) -> bool {
    matches!(value, Value::Ref(_))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
