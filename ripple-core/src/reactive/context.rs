//! Reactive Context
//!
//! The reactive context tracks which subscriber is currently running.
//! This enables automatic dependency tracking: when an observed value is
//! read, the current subscriber is recorded as one of its dependents.
//!
//! # Implementation
//!
//! We use a thread-local stack of running effects. Entering a context
//! pushes the effect, and dropping the returned guard pops it, so the
//! previous top of the stack becomes active again.
//!
//! The guard is what makes nesting safe: an effect created or run inside
//! another one never attributes its reads to the outer effect, and the
//! outer effect resumes correct attribution as soon as the inner one
//! finishes, including when the inner body panics.

use std::cell::RefCell;

use super::effect::Effect;
use super::SubscriberId;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Effect>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the context when dropped.
pub struct ReactiveContext {
    subscriber_id: SubscriberId,
}

impl ReactiveContext {
    /// Enter a new reactive context for the given effect.
    ///
    /// While this context is active, observed reads register `effect` as
    /// a dependent. The context is exited when the guard is dropped.
    pub fn enter(effect: &Effect) -> Self {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(effect.clone()));

        Self {
            subscriber_id: effect.id(),
        }
    }

    /// Check if there is an active reactive context.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// Get the currently running effect, if any.
    pub fn current() -> Option<Effect> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
    }

    /// Get the current subscriber ID, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().map(Effect::id))
    }

    /// Whether `effect` is anywhere on the stack of running effects.
    pub fn is_running(effect: &Effect) -> bool {
        CONTEXT_STACK.with(|stack| stack.borrow().iter().any(|running| running.ptr_eq(effect)))
    }

    /// Number of effects currently running inside one another.
    pub fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        // The popped handle is released after the stack borrow ends.
        let popped = CONTEXT_STACK.with(|stack| stack.borrow_mut().pop());

        if let Some(effect) = popped {
            debug_assert_eq!(
                effect.id(),
                self.subscriber_id,
                "ReactiveContext mismatch: expected {:?}, got {:?}",
                self.subscriber_id,
                effect.id()
            );
        }
    }
}
