//! Property-based invariant tests for dependency tracking.
//!
//! Verifies structural guarantees of the engine under arbitrary write
//! sequences:
//!
//! 1. An effect re-runs exactly once per write that changed a key it read
//! 2. A `length` reader re-runs exactly once per push
//! 3. A computed value always matches its getter and runs it at most once
//!    per batch of changes
//! 4. `has_change` is irreflexive and symmetric

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use ripple_core::{
    computed, effect, has_change, r#ref, reactive, EffectOptions, Object, Reactive, Value,
};

// ── Helpers ──────────────────────────────────────────────────────────

const KEYS: [&str; 3] = ["k0", "k1", "k2"];

fn view(value: Value) -> Reactive {
    match value {
        Value::Reactive(view) => view,
        other => panic!("expected an observed view, got {other:?}"),
    }
}

/// Small integers plus NaN, so repeated and NaN writes are common.
fn arb_number() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => (-2i32..=2).prop_map(f64::from),
        1 => Just(f64::NAN),
    ]
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Undefined),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        arb_number().prop_map(Value::Number),
        "[a-c]{0,2}".prop_map(Value::from),
    ]
}

fn changed(old: f64, new: f64) -> bool {
    !(old == new || (old.is_nan() && new.is_nan()))
}

#[derive(Debug, Clone)]
enum ComputedOp {
    Write(i32),
    Read,
}

fn arb_computed_op() -> impl Strategy<Value = ComputedOp> {
    prop_oneof![
        (-2i32..=2).prop_map(ComputedOp::Write),
        Just(ComputedOp::Read),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Attribution: runs track changed writes of the key read
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn effect_runs_once_per_changing_write(
        writes in proptest::collection::vec((0usize..KEYS.len(), arb_number()), 0..40)
    ) {
        let state = view(reactive(Object::from_entries(KEYS.map(|key| (key, 0.0)))));

        let runs: Vec<Rc<Cell<usize>>> = KEYS.iter().map(|_| Rc::new(Cell::new(0))).collect();
        let _effects: Vec<_> = KEYS
            .iter()
            .zip(&runs)
            .map(|(&key, runs)| {
                let reader = state.clone();
                let runs = runs.clone();
                effect(
                    move || {
                        runs.set(runs.get() + 1);
                        reader.get(key);
                    },
                    EffectOptions::default(),
                )
            })
            .collect();

        let mut current = [0.0f64; 3];
        let mut expected = [1usize; 3];
        for (slot, number) in writes {
            if changed(current[slot], number) {
                expected[slot] += 1;
            }
            current[slot] = number;
            state.set(KEYS[slot], number).unwrap();
        }

        for slot in 0..KEYS.len() {
            prop_assert_eq!(runs[slot].get(), expected[slot]);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Length side effect of push
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn length_reader_runs_once_per_push(items in proptest::collection::vec(-5i32..5, 0..20)) {
        let list = view(reactive(Object::array()));
        let runs = Rc::new(Cell::new(0usize));
        let total = Rc::new(Cell::new(0.0));

        let reader = list.clone();
        let runs_clone = runs.clone();
        let total_clone = total.clone();
        let _effect = effect(
            move || {
                runs_clone.set(runs_clone.get() + 1);
                total_clone.set(reader.reduce(0.0, |sum, item| {
                    sum + item.as_f64().unwrap_or_default()
                }));
            },
            EffectOptions::default(),
        );

        for item in &items {
            list.push(*item).unwrap();
        }

        prop_assert_eq!(runs.get(), 1 + items.len());
        prop_assert_eq!(total.get(), items.iter().map(|item| f64::from(*item)).sum::<f64>());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Computed values stay consistent and lazy
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn computed_matches_getter_and_coalesces(
        ops in proptest::collection::vec(arb_computed_op(), 0..40)
    ) {
        let source = r#ref(0);
        let calls = Rc::new(Cell::new(0usize));

        let getter_source = source.clone();
        let calls_clone = calls.clone();
        let doubled = computed(move || {
            calls_clone.set(calls_clone.get() + 1);
            getter_source.get().as_f64().unwrap_or_default() * 2.0
        });

        let mut model = 0i32;
        let mut dirty = true;
        let mut expected_calls = 0usize;
        for op in ops {
            match op {
                ComputedOp::Write(next) => {
                    if next != model {
                        dirty = true;
                    }
                    model = next;
                    source.set(next);
                }
                ComputedOp::Read => {
                    if dirty {
                        expected_calls += 1;
                        dirty = false;
                    }
                    prop_assert_eq!(doubled.get(), f64::from(model) * 2.0);
                }
            }
            prop_assert_eq!(doubled.is_dirty(), dirty);
        }

        prop_assert_eq!(calls.get(), expected_calls);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Change detection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn has_change_is_irreflexive(value in arb_scalar()) {
        prop_assert!(!has_change(&value, &value.clone()));
    }

    #[test]
    fn has_change_is_symmetric(a in arb_scalar(), b in arb_scalar()) {
        prop_assert_eq!(has_change(&a, &b), has_change(&b, &a));
    }
}
