//! Effect Implementation
//!
//! An Effect is a computation that re-runs whenever a value it read
//! changes.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its body immediately to collect its
//!    first set of dependencies (unless it is lazy).
//!
//! 2. Every run happens inside a [`ReactiveContext`], so each observed
//!    read made by the body registers this effect as a dependent.
//!
//! 3. When a dependency changes, the runtime either calls the effect's
//!    scheduler or, without one, runs the effect again right away.
//!
//! # Schedulers
//!
//! A scheduler is the only way to turn "a dependency changed" into
//! something other than an immediate re-run: batching, deferring to a
//! host queue, or just marking a cache stale, as [`Computed`] does.
//!
//! [`Computed`]: super::Computed
//!
//! # Dependencies only grow
//!
//! Re-running does not clear the buckets joined on earlier runs. If a
//! later run stops reading a key, changes to that key keep notifying the
//! effect until the key's target is torn down.

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use tracing::trace;

use super::context::ReactiveContext;
use super::subscriber::SubscriberId;

/// Callback that replaces direct re-execution when a dependency changes.
///
/// It receives the effect being notified, so a deferring scheduler can
/// queue the handle and call [`Effect::run`] later.
pub type Scheduler = Rc<dyn Fn(&Effect)>;

/// Options accepted by [`effect`].
#[derive(Clone, Default)]
pub struct EffectOptions {
    /// Skip the implicit first run at construction.
    pub lazy: bool,

    /// Called instead of re-running when a dependency changes.
    pub scheduler: Option<Scheduler>,
}

impl EffectOptions {
    /// Options for an effect that does not run at construction.
    pub fn lazy() -> Self {
        Self {
            lazy: true,
            scheduler: None,
        }
    }

    /// Attach a scheduler.
    pub fn with_scheduler<F>(mut self, scheduler: F) -> Self
    where
        F: Fn(&Effect) + 'static,
    {
        self.scheduler = Some(Rc::new(scheduler));
        self
    }
}

impl fmt::Debug for EffectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectOptions")
            .field("lazy", &self.lazy)
            .field("scheduler", &self.scheduler.is_some())
            .finish()
    }
}

struct EffectInner {
    id: SubscriberId,
    body: Box<dyn Fn()>,
    scheduler: Option<Scheduler>,
    run_count: Cell<usize>,
}

/// A computation registered to re-run when what it read changes.
///
/// Cloning an `Effect` creates another handle to the same computation.
///
/// # Example
///
/// ```rust
/// use ripple_core::{effect, reactive, EffectOptions, Object};
///
/// let state = reactive(Object::from_entries([("count", 0)]));
/// let state = state.as_reactive().unwrap().clone();
///
/// let reader = state.clone();
/// let runs = effect(move || { reader.get("count"); }, EffectOptions::default());
/// assert_eq!(runs.run_count(), 1);
///
/// state.set("count", 5).unwrap();
/// assert_eq!(runs.run_count(), 2);
/// ```
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Create a new effect from a body and options.
    ///
    /// Unless `options.lazy` is set, the body runs once before this
    /// returns.
    pub fn new<F>(body: F, options: EffectOptions) -> Self
    where
        F: Fn() + 'static,
    {
        let effect = Self {
            inner: Rc::new(EffectInner {
                id: SubscriberId::new(),
                body: Box::new(body),
                scheduler: options.scheduler,
                run_count: Cell::new(0),
            }),
        };

        if !options.lazy {
            effect.run();
        }

        effect
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// Run the body with this effect as the active subscriber.
    ///
    /// The context is restored on every exit path, panics included.
    pub fn run(&self) {
        self.run_with(|| (self.inner.body)());
    }

    /// Run `f` in place of the body, with this effect as the active
    /// subscriber, and return its result.
    pub(crate) fn run_with<R>(&self, f: impl FnOnce() -> R) -> R {
        let _ctx = ReactiveContext::enter(self);
        self.inner.run_count.set(self.inner.run_count.get() + 1);
        trace!(effect = %self.inner.id, run = self.inner.run_count.get(), "running effect");

        f()
    }

    /// React to a dependency change: call the scheduler, or run.
    pub fn notify(&self) {
        match &self.inner.scheduler {
            Some(scheduler) => scheduler(self),
            None => self.run(),
        }
    }

    /// Whether the effect carries a scheduler.
    pub fn has_scheduler(&self) -> bool {
        self.inner.scheduler.is_some()
    }

    /// Get the number of times the body has started running.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    /// Whether two handles refer to the same effect.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Effect {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Effect {}

impl Hash for Effect {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("run_count", &self.run_count())
            .field("scheduler", &self.has_scheduler())
            .finish()
    }
}

/// Register `body` as a reactive computation.
pub fn effect<F>(body: F, options: EffectOptions) -> Effect
where
    F: Fn() + 'static,
{
    Effect::new(body, options)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
