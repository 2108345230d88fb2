//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects observed values
//! and the effects reading them. It owns the dependency graph, the
//! wrap-cache and the configuration.
//!
//! # How It Works
//!
//! 1. When an observed value is read inside a running effect, the runtime
//!    records the effect in the (target, key) bucket (`track`).
//!
//! 2. When an observed value changes, the runtime snapshots the bucket and
//!    notifies each effect in insertion order (`trigger`): the effect's
//!    scheduler if it has one, otherwise a direct re-run.
//!
//! 3. When a target is torn down, its entry is pruned (`release`).
//!
//! # Thread Model
//!
//! All state is thread-local and every handle is `!Send`, so exactly one
//! writer touches the graph at a time. Each thread gets an independent
//! runtime; [`Runtime::reset`] clears the current thread's.
//!
//! # Borrow Discipline
//!
//! No `RefCell` borrow of runtime state is held while user code runs or
//! while handles are dropped. Removed entries are always handed back and
//! dropped after the borrow ends, because dropping an effect can release
//! further targets, which re-enter the runtime.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use super::context::ReactiveContext;
use super::effect::Effect;
use super::proxy::ProxyInner;
use super::subscriber::SubscriberId;
use crate::config::RuntimeConfig;
use crate::graph::{DependencyGraph, PropertyKey, Target, TargetId};

thread_local! {
    static GRAPH: RefCell<DependencyGraph<Effect>> = RefCell::new(DependencyGraph::new());
    static WRAP_CACHE: RefCell<HashMap<TargetId, Weak<ProxyInner>>> = RefCell::new(HashMap::new());
    static CONFIG: RefCell<RuntimeConfig> = RefCell::new(RuntimeConfig::default());
    static TRIGGER_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// The per-thread reactive runtime.
pub struct Runtime;

impl Runtime {
    /// Record that the running effect read `key` of `target`.
    ///
    /// Outside of any effect this does nothing.
    pub fn track(target: TargetId, key: &PropertyKey) {
        let Some(active) = ReactiveContext::current() else {
            return;
        };

        let added = GRAPH.with(|graph| graph.borrow_mut().add_dependency(target, key, &active));
        if added {
            trace!(%target, %key, effect = %active.id(), "tracked dependency");
        }
    }

    /// Notify every effect that read `key` of `target`.
    ///
    /// The bucket is snapshotted first, so effects notified here may read
    /// and write the same key without disturbing this pass. Subscribers
    /// that join the bucket during the pass are first notified by the
    /// next trigger.
    ///
    /// Effects that are currently running are skipped: an effect writing
    /// a key it read does not re-enter itself.
    pub fn trigger(target: TargetId, key: &PropertyKey) {
        let subscribers = GRAPH.with(|graph| graph.borrow().subscribers(target, key));
        if subscribers.is_empty() {
            return;
        }

        let Some(_depth) = TriggerDepth::enter() else {
            warn!(
                %target,
                %key,
                max_depth = ?Self::config().max_trigger_depth,
                "trigger depth exceeded; dropping nested propagation"
            );
            return;
        };

        trace!(%target, %key, count = subscribers.len(), "triggering subscribers");
        for subscriber in subscribers {
            if ReactiveContext::is_running(&subscriber) {
                trace!(%target, %key, effect = %subscriber.id(), "skipping running effect");
                continue;
            }
            subscriber.notify();
        }
    }

    /// Number of effects subscribed to `key` of `target`.
    pub fn subscriber_count(target: &impl Target, key: impl Into<PropertyKey>) -> usize {
        let key = key.into();
        GRAPH.with(|graph| graph.borrow().subscriber_count(target.target_id(), &key))
    }

    /// Number of targets that currently have dependency entries.
    pub fn tracked_target_count() -> usize {
        GRAPH.with(|graph| graph.borrow().target_count())
    }

    /// Prune every dependency entry of `target`.
    ///
    /// Containers, refs and computed values do this themselves when their
    /// last handle drops. Call it explicitly to tear down a target that is
    /// kept alive by the effects observing it.
    pub fn release(target: &impl Target) {
        Self::release_target(target.target_id());
    }

    pub(crate) fn release_target(target: TargetId) {
        // The thread-local may already be gone during thread teardown.
        let removed = GRAPH
            .try_with(|graph| {
                graph
                    .try_borrow_mut()
                    .ok()
                    .and_then(|mut graph| graph.remove_target(target))
            })
            .ok()
            .flatten();

        if let Some(entry) = removed {
            debug!(%target, keys = entry.len(), "released target");
            drop(entry);
        }
    }

    /// Get the current subscriber being tracked, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        ReactiveContext::current_subscriber()
    }

    /// Check if we're inside a reactive context.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }

    /// Replace this thread's configuration.
    pub fn configure(config: RuntimeConfig) {
        debug!(?config, "runtime configured");
        CONFIG.with(|current| *current.borrow_mut() = config);
    }

    /// This thread's configuration.
    pub fn config() -> RuntimeConfig {
        CONFIG.with(|current| current.borrow().clone())
    }

    /// Clear all dependency entries, the wrap-cache and the configuration
    /// of the current thread.
    ///
    /// Must not be called from inside a running effect.
    pub fn reset() {
        debug_assert!(
            !ReactiveContext::is_active(),
            "Runtime::reset called inside a running effect"
        );

        let entries = GRAPH.with(|graph| graph.borrow_mut().take_all());
        let proxies = WRAP_CACHE.with(|cache| std::mem::take(&mut *cache.borrow_mut()));
        CONFIG.with(|current| *current.borrow_mut() = RuntimeConfig::default());
        TRIGGER_DEPTH.with(|depth| depth.set(0));

        debug!(targets = entries.len(), proxies = proxies.len(), "runtime reset");
        drop(entries);
        drop(proxies);
    }

    // ------------------------------------------------------------------------
    // Wrap-cache
    // ------------------------------------------------------------------------

    /// The live wrapper of a raw target, if any.
    pub(crate) fn cached_proxy(target: TargetId) -> Option<Rc<ProxyInner>> {
        WRAP_CACHE.with(|cache| cache.borrow().get(&target).and_then(Weak::upgrade))
    }

    /// Remember `proxy` as the wrapper of `target`.
    pub(crate) fn cache_proxy(target: TargetId, proxy: &Rc<ProxyInner>) {
        let previous =
            WRAP_CACHE.with(|cache| cache.borrow_mut().insert(target, Rc::downgrade(proxy)));
        debug_assert!(
            previous.map_or(true, |weak| weak.strong_count() == 0),
            "a live wrapper for {target} was replaced"
        );
    }

    /// Forget the wrapper of `target` once it is no longer alive.
    pub(crate) fn evict_proxy(target: TargetId) {
        let _ = WRAP_CACHE.try_with(|cache| {
            if let Ok(mut cache) = cache.try_borrow_mut() {
                if cache
                    .get(&target)
                    .is_some_and(|weak| weak.strong_count() == 0)
                {
                    cache.remove(&target);
                }
            }
        });
    }

    /// Number of wrappers currently cached.
    pub fn cached_proxy_count() -> usize {
        WRAP_CACHE.with(|cache| cache.borrow().len())
    }
}

/// Guard counting how deeply triggers are nested on this thread.
struct TriggerDepth;

impl TriggerDepth {
    fn enter() -> Option<Self> {
        let max_depth = Runtime::config().max_trigger_depth;
        TRIGGER_DEPTH.with(|depth| {
            if max_depth.is_some_and(|max_depth| depth.get() >= max_depth) {
                return None;
            }
            depth.set(depth.get() + 1);
            Some(Self)
        })
    }
}

impl Drop for TriggerDepth {
    fn drop(&mut self) {
        TRIGGER_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::EffectOptions;

    fn counting_effect(runs: &Rc<Cell<usize>>, target: TargetId, key: &'static str) -> Effect {
        let runs = runs.clone();
        Effect::new(
            move || {
                runs.set(runs.get() + 1);
                Runtime::track(target, &PropertyKey::from(key));
            },
            EffectOptions::default(),
        )
    }

    #[test]
    fn track_outside_effect_is_a_no_op() {
        let target = TargetId::new();
        Runtime::track(target, &PropertyKey::from("a"));
        assert_eq!(Runtime::subscriber_count(&target, "a"), 0);
    }

    #[test]
    fn trigger_runs_subscribers_of_the_key_only() {
        let target = TargetId::new();
        let runs_a = Rc::new(Cell::new(0));
        let runs_b = Rc::new(Cell::new(0));

        let _a = counting_effect(&runs_a, target, "a");
        let _b = counting_effect(&runs_b, target, "b");

        Runtime::trigger(target, &PropertyKey::from("a"));

        assert_eq!(runs_a.get(), 2);
        assert_eq!(runs_b.get(), 1);
    }

    #[test]
    fn trigger_without_bucket_is_a_no_op() {
        Runtime::trigger(TargetId::new(), &PropertyKey::from("a"));
    }

    #[test]
    fn trigger_prefers_scheduler() {
        let target = TargetId::new();
        let scheduled = Rc::new(Cell::new(0));
        let scheduled_clone = scheduled.clone();

        let effect = Effect::new(
            move || Runtime::track(target, &PropertyKey::from("a")),
            EffectOptions::default()
                .with_scheduler(move |_: &Effect| scheduled_clone.set(scheduled_clone.get() + 1)),
        );

        Runtime::trigger(target, &PropertyKey::from("a"));

        assert_eq!(scheduled.get(), 1);
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn notification_follows_subscription_order() {
        let target = TargetId::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let effects: Vec<Effect> = (0..3)
            .map(|index| {
                let order = order.clone();
                Effect::new(
                    move || {
                        order.borrow_mut().push(index);
                        Runtime::track(target, &PropertyKey::from("a"));
                    },
                    EffectOptions::default(),
                )
            })
            .collect();
        order.borrow_mut().clear();

        Runtime::trigger(target, &PropertyKey::from("a"));

        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(effects.len(), 3);
    }

    #[test]
    fn subscriber_added_during_trigger_waits_for_the_next_one() {
        let target = TargetId::new();
        let late: Rc<RefCell<Option<Effect>>> = Rc::new(RefCell::new(None));

        let late_clone = late.clone();
        let _early = Effect::new(
            move || Runtime::track(target, &PropertyKey::from("a")),
            EffectOptions::default().with_scheduler(move |_: &Effect| {
                if late_clone.borrow().is_some() {
                    return;
                }
                let joined = Effect::new(
                    move || Runtime::track(target, &PropertyKey::from("a")),
                    EffectOptions::default(),
                );
                *late_clone.borrow_mut() = Some(joined);
            }),
        );

        Runtime::trigger(target, &PropertyKey::from("a"));
        let joined = late.borrow().clone().unwrap();
        assert_eq!(Runtime::subscriber_count(&target, "a"), 2);
        // Only the run at construction; the pass that created it skipped it.
        assert_eq!(joined.run_count(), 1);

        Runtime::trigger(target, &PropertyKey::from("a"));
        assert_eq!(joined.run_count(), 2);
    }

    #[test]
    fn running_effect_is_not_renotified() {
        let target = TargetId::new();
        let effect = Effect::new(
            move || {
                Runtime::track(target, &PropertyKey::from("a"));
                Runtime::trigger(target, &PropertyKey::from("a"));
            },
            EffectOptions::default(),
        );
        assert_eq!(effect.run_count(), 1);

        Runtime::trigger(target, &PropertyKey::from("a"));
        assert_eq!(effect.run_count(), 2);
    }

    #[test]
    fn trigger_depth_is_unbounded_by_default() {
        let target = TargetId::new();
        let calls = Rc::new(Cell::new(0));

        let calls_clone = calls.clone();
        let _effect = Effect::new(
            move || Runtime::track(target, &PropertyKey::from("a")),
            EffectOptions::default().with_scheduler(move |_: &Effect| {
                calls_clone.set(calls_clone.get() + 1);
                if calls_clone.get() < 300 {
                    Runtime::trigger(target, &PropertyKey::from("a"));
                }
            }),
        );

        Runtime::trigger(target, &PropertyKey::from("a"));
        assert_eq!(calls.get(), 300);
    }

    #[test]
    fn configured_depth_bounds_recursive_schedulers() {
        Runtime::configure(RuntimeConfig::default().with_max_trigger_depth(5));

        let target = TargetId::new();
        let calls = Rc::new(Cell::new(0));

        let calls_clone = calls.clone();
        let _effect = Effect::new(
            move || Runtime::track(target, &PropertyKey::from("a")),
            EffectOptions::default().with_scheduler(move |_: &Effect| {
                calls_clone.set(calls_clone.get() + 1);
                Runtime::trigger(target, &PropertyKey::from("a"));
            }),
        );

        Runtime::trigger(target, &PropertyKey::from("a"));

        // Five nested passes, the sixth is abandoned.
        assert_eq!(calls.get(), 5);
        Runtime::reset();
    }

    #[test]
    fn release_prunes_entries() {
        let target = TargetId::new();
        let runs = Rc::new(Cell::new(0));
        let _effect = counting_effect(&runs, target, "a");

        assert_eq!(Runtime::subscriber_count(&target, "a"), 1);
        Runtime::release(&target);
        assert_eq!(Runtime::subscriber_count(&target, "a"), 0);

        Runtime::trigger(target, &PropertyKey::from("a"));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let target = TargetId::new();
        let runs = Rc::new(Cell::new(0));
        let _effect = counting_effect(&runs, target, "a");
        Runtime::configure(RuntimeConfig::default().with_max_trigger_depth(3));

        Runtime::reset();

        assert_eq!(Runtime::tracked_target_count(), 0);
        assert_eq!(Runtime::cached_proxy_count(), 0);
        assert_eq!(Runtime::config(), RuntimeConfig::default());
    }

    #[test]
    fn tracking_state_reflects_context() {
        assert!(!Runtime::is_tracking());
        assert!(Runtime::current_subscriber().is_none());

        let seen = Rc::new(Cell::new(false));
        let seen_clone = seen.clone();
        let effect = Effect::new(
            move || seen_clone.set(Runtime::is_tracking()),
            EffectOptions::default(),
        );

        assert!(seen.get());
        assert_eq!(effect.run_count(), 1);
    }
}
