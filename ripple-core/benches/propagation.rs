//! Benchmarks for change propagation.
//!
//! These benchmarks measure:
//! - Fan-out: one write notifying many effects
//! - Chains: a write travelling through stacked computed values
//! - Array iteration: a reducing effect re-running after a push

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ripple_core::{
    computed, effect, r#ref, reactive, Computed, Effect, EffectOptions, Object, Runtime, Value,
};

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for subscribers in [1usize, 10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, &subscribers| {
                let source = r#ref(0);
                let _effects: Vec<Effect> = (0..subscribers)
                    .map(|_| {
                        let reader = source.clone();
                        effect(
                            move || {
                                black_box(reader.get());
                            },
                            EffectOptions::default(),
                        )
                    })
                    .collect();

                let mut next = 0;
                b.iter(|| {
                    next += 1;
                    source.set(next);
                });

                Runtime::reset();
            },
        );
    }

    group.finish();
}

fn bench_computed_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("computed_chain");

    for depth in [1usize, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let source = r#ref(0);
            let first_source = source.clone();
            let first: Computed<f64> =
                computed(move || first_source.get().as_f64().unwrap_or_default());

            let mut last = first;
            for _ in 1..depth {
                let upstream = last.clone();
                last = computed(move || upstream.get() + 1.0);
            }

            let reader = last.clone();
            let _watcher = effect(
                move || {
                    black_box(reader.get());
                },
                EffectOptions::default(),
            );

            let mut next = 0;
            b.iter(|| {
                next += 1;
                source.set(next);
            });

            Runtime::reset();
        });
    }

    group.finish();
}

fn bench_array_reduce(c: &mut Criterion) {
    c.bench_function("array_push_reduce_100", |b| {
        let list = match reactive(Object::from_values(0..100)) {
            Value::Reactive(list) => list,
            _ => unreachable!("containers always wrap"),
        };

        let reader = list.clone();
        let _summer = effect(
            move || {
                black_box(reader.reduce(0.0, |sum, item| sum + item.as_f64().unwrap_or_default()));
            },
            EffectOptions::default(),
        );

        b.iter(|| {
            list.push(1).ok();
            list.pop().ok();
        });

        Runtime::reset();
    });
}

criterion_group!(
    benches,
    bench_fan_out,
    bench_computed_chain,
    bench_array_reduce
);
criterion_main!(benches);
