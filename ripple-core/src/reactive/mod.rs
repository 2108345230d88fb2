//! Reactive Primitives
//!
//! This module implements the core reactive system: observed containers,
//! refs, computed values and effects. These primitives form the foundation
//! of Ripple's fine-grained reactivity.
//!
//! # Concepts
//!
//! ## Observed containers
//!
//! A raw [`Object`] (record or array) becomes observable through
//! [`reactive`]. Reads through the resulting [`Reactive`] view register
//! the running effect as a dependent of the key read; writes notify the
//! dependents of the keys that changed.
//!
//! ## Refs
//!
//! A [`Ref`] boxes one value under the key `value`, for state that is not
//! a container.
//!
//! ## Computed values
//!
//! A [`Computed`] is a derived value that caches its result. It
//! re-evaluates only when read after one of its dependencies changed.
//!
//! ## Effects
//!
//! An [`Effect`] is a computation that re-runs whenever something it read
//! changes, or hands the change to its scheduler. Effects are used to
//! synchronize reactive state with external systems, such as a renderer.
//!
//! # Implementation Notes
//!
//! The reactive system uses a thread-local tracking context to detect
//! dependencies automatically. When an observed value is read, we check
//! whether an effect is running and, if so, record the dependency in the
//! runtime's graph.

mod computed;
mod context;
mod effect;
mod object;
mod proxy;
mod refs;
mod runtime;
mod subscriber;
mod value;

pub use computed::{computed, computed_with, Computed, ComputedOptions, ComputedState};
pub use context::ReactiveContext;
pub use effect::{effect, Effect, EffectOptions, Scheduler};
pub use object::{Container, Object, MAX_ARRAY_LENGTH};
pub use proxy::{is_reactive, reactive, to_raw, Reactive, IS_REACTIVE, KEYS};
pub use refs::{is_ref, r#ref, Ref};
pub use runtime::Runtime;
pub use subscriber::SubscriberId;
pub use value::{has_change, is_array, is_object, Value};
