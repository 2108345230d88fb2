//! Ripple Core
//!
//! This crate provides a fine-grained reactive dependency-tracking engine.
//! It implements:
//!
//! - Observed records and arrays with lazy deep wrapping
//! - Refs, boxed reactive values
//! - Computed values with lazy, cached re-evaluation
//! - Effects with optional lazy start and custom schedulers
//!
//! The engine only propagates "this value changed" to "these computations
//! must re-run". It knows nothing about rendering; a host builds on
//! [`effect`], [`reactive`], [`r#ref`] and [`computed`].
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: the (target, key) → subscribers table and its key types
//! - `reactive`: the primitives, the tracking context and the runtime
//! - `config`: per-thread runtime configuration
//! - `error`: errors of fallible container writes
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use ripple_core::{computed, effect, r#ref, EffectOptions};
//!
//! let count = r#ref(1);
//!
//! let source = count.clone();
//! let doubled = computed(move || source.get().as_f64().unwrap_or_default() * 2.0);
//!
//! let seen = Rc::new(Cell::new(0.0));
//! let seen_clone = seen.clone();
//! let reader = doubled.clone();
//! let _watcher = effect(move || seen_clone.set(reader.get()), EffectOptions::default());
//! assert_eq!(seen.get(), 2.0);
//!
//! // The effect re-runs automatically.
//! count.set(5);
//! assert_eq!(seen.get(), 10.0);
//! ```
//!
//! # Threads
//!
//! Every handle is `!Send`. Each thread has its own independent runtime.

pub mod config;
pub mod error;
pub mod graph;
pub mod reactive;

pub use config::RuntimeConfig;
pub use error::{ReactiveError, Result};
pub use graph::{PropertyKey, Target, TargetId};
pub use reactive::{
    computed, computed_with, effect, has_change, is_array, is_object, is_reactive, is_ref,
    r#ref, reactive, to_raw, Computed, ComputedOptions, ComputedState, Effect, EffectOptions,
    Object, Reactive, Ref, Runtime, Value,
};
