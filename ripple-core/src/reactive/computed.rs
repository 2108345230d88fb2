//! Computed Implementation
//!
//! A Computed is a cached derived value that re-evaluates only when it is
//! read after one of its dependencies changed.
//!
//! # How Computed Values Work
//!
//! 1. On creation nothing runs. The value starts dirty.
//!
//! 2. On first read, the getter runs inside the computed's own lazy
//!    effect, so every observed read it makes subscribes that effect. The
//!    result is cached and the value becomes clean.
//!
//! 3. When a dependency changes, the effect's scheduler runs instead of
//!    the getter: a clean value becomes dirty and its own readers are
//!    notified. A value that is already dirty ignores further changes, so
//!    any number of writes between two reads cost one notification.
//!
//! 4. The next read sees the dirty flag and runs the getter again.
//!
//! # Why This Matters
//!
//! - A source changes
//! - 10 computed values depend on it
//! - Only the ones actually read recompute
//! - The rest stay dirty and do no work
//!
//! Every read registers the reader, whether or not it recomputed, so an
//! effect that first reads a clean value still hears about later changes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use super::effect::{Effect, EffectOptions};
use super::runtime::Runtime;
use crate::graph::{PropertyKey, Target, TargetId};

/// Dirty state of a computed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputedState {
    /// The cached value is up to date.
    Clean,

    /// A dependency changed since the last evaluation, or there never was
    /// one. The next read runs the getter.
    Dirty,
}

/// Getter and optional setter of a computed value.
pub struct ComputedOptions<T> {
    /// Derives the value. Observed reads made here become dependencies.
    pub get: Box<dyn Fn() -> T>,

    /// Receives writes. Without one the computed value is read-only, and
    /// writes are ignored with the same warning as [`computed`] gives.
    /// Pass a no-op setter to ignore writes silently.
    pub set: Option<Box<dyn Fn(T)>>,
}

impl<T> ComputedOptions<T> {
    /// Options for a read-only computed value.
    pub fn new<G>(get: G) -> Self
    where
        G: Fn() -> T + 'static,
    {
        Self {
            get: Box::new(get),
            set: None,
        }
    }

    /// Attach a setter.
    pub fn with_setter<S>(mut self, set: S) -> Self
    where
        S: Fn(T) + 'static,
    {
        self.set = Some(Box::new(set));
        self
    }
}

struct ComputedInner<T> {
    id: TargetId,
    getter: Box<dyn Fn() -> T>,
    setter: Option<Box<dyn Fn(T)>>,
    effect: Effect,
    state: Cell<ComputedState>,
    value: RefCell<Option<T>>,
}

impl<T: Clone> ComputedInner<T> {
    /// Run the getter and cache the result.
    fn refresh(&self) -> T {
        let value = (self.getter)();
        let previous = self.value.replace(Some(value.clone()));
        self.state.set(ComputedState::Clean);
        drop(previous);
        value
    }

    /// Scheduler of the internal effect.
    fn invalidate(&self) {
        if self.state.get() == ComputedState::Dirty {
            return;
        }

        self.state.set(ComputedState::Dirty);
        trace!(computed = %self.id, "computed marked dirty");
        Runtime::trigger(self.id, &PropertyKey::value());
    }
}

impl<T> Drop for ComputedInner<T> {
    fn drop(&mut self) {
        Runtime::release_target(self.id);
    }
}

/// A cached value derived from other observed values.
///
/// Cloning a `Computed` creates another handle to the same cache.
///
/// # Example
///
/// ```rust
/// use ripple_core::{computed, r#ref, Value};
///
/// let count = r#ref(2);
///
/// let source = count.clone();
/// let doubled = computed(move || source.get().as_f64().unwrap_or_default() * 2.0);
/// assert!(doubled.is_dirty());
///
/// assert_eq!(doubled.get(), 4.0);
///
/// count.set(5);
/// assert!(doubled.is_dirty());
/// assert_eq!(doubled.get(), 10.0);
/// ```
pub struct Computed<T: Clone + 'static> {
    inner: Rc<ComputedInner<T>>,
}

impl<T: Clone + 'static> Computed<T> {
    /// Create a read-only computed value. The getter does not run yet.
    pub fn new<G>(getter: G) -> Self
    where
        G: Fn() -> T + 'static,
    {
        Self::with_options(ComputedOptions::new(getter))
    }

    /// Create a computed value from a getter and an optional setter.
    pub fn with_options(options: ComputedOptions<T>) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<ComputedInner<T>>| {
            let body_target = weak.clone();
            let scheduler_target = weak.clone();

            let effect = Effect::new(
                move || {
                    if let Some(inner) = body_target.upgrade() {
                        inner.refresh();
                    }
                },
                EffectOptions::lazy().with_scheduler(move |_: &Effect| {
                    if let Some(inner) = scheduler_target.upgrade() {
                        inner.invalidate();
                    }
                }),
            );

            ComputedInner {
                id: TargetId::new(),
                getter: options.get,
                setter: options.set,
                effect,
                state: Cell::new(ComputedState::Dirty),
                value: RefCell::new(None),
            }
        });

        Self { inner }
    }

    /// Get the computed value's target ID.
    pub fn id(&self) -> TargetId {
        self.inner.id
    }

    /// Read the value, recomputing it if dirty, and record the read.
    ///
    /// The caller is tracked on every read, clean or dirty, so an effect
    /// whose first read hits an already cached value still subscribes.
    pub fn get(&self) -> T {
        let cached = match self.inner.state.get() {
            ComputedState::Clean => self.inner.value.borrow().clone(),
            ComputedState::Dirty => None,
        };

        let value = match cached {
            Some(value) => value,
            None => {
                trace!(computed = %self.inner.id, "evaluating computed");
                let inner = &self.inner;
                inner.effect.run_with(|| inner.refresh())
            }
        };

        Runtime::track(self.inner.id, &PropertyKey::value());
        value
    }

    /// Write the value through the setter.
    ///
    /// A read-only computed value ignores the write and logs a warning.
    pub fn set(&self, value: T) {
        match &self.inner.setter {
            Some(setter) => setter(value),
            None => {
                if Runtime::config().warn_on_readonly_write {
                    warn!(computed = %self.inner.id, "write to a read-only computed value ignored");
                }
            }
        }
    }

    /// Whether the next read will run the getter.
    pub fn is_dirty(&self) -> bool {
        self.inner.state.get() == ComputedState::Dirty
    }

    pub fn state(&self) -> ComputedState {
        self.inner.state.get()
    }

    /// Whether a setter was supplied.
    pub fn is_writable(&self) -> bool {
        self.inner.setter.is_some()
    }

    /// Number of times the getter has run.
    pub fn evaluation_count(&self) -> usize {
        self.inner.effect.run_count()
    }
}

impl<T: Clone + 'static> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Target for Computed<T> {
    fn target_id(&self) -> TargetId {
        self.inner.id
    }
}

impl<T: Clone + 'static> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("id", &self.inner.id)
            .field("state", &self.inner.state.get())
            .finish()
    }
}

/// Create a read-only computed value from a getter.
pub fn computed<T, G>(getter: G) -> Computed<T>
where
    T: Clone + 'static,
    G: Fn() -> T + 'static,
{
    Computed::new(getter)
}

/// Create a computed value from a getter and an optional setter.
pub fn computed_with<T: Clone + 'static>(options: ComputedOptions<T>) -> Computed<T> {
    Computed::with_options(options)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
