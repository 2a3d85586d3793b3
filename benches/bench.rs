use std::cell::RefCell;
use std::env;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use polysort::{patterns, SwapStrategy};

const STRATEGIES: [(&str, SwapStrategy); 3] = [
    ("unstable", SwapStrategy::Unstable),
    ("semistable", SwapStrategy::Semistable),
    ("stable", SwapStrategy::Stable),
];

fn batch_size_for(test_size: usize) -> BatchSize {
    if test_size > 30 {
        BatchSize::LargeInput
    } else {
        BatchSize::SmallInput
    }
}

fn measure_comp_count(
    name: &str,
    test_size: usize,
    instrumented_sort_func: impl Fn(),
    comp_count: Rc<RefCell<u64>>,
) {
    // Measure how many comparisons are performed by a specific strategy and
    // input combination.
    let run_count: usize = if test_size <= 20 {
        100_000
    } else if test_size < 10_000 {
        3000
    } else if test_size < 100_000 {
        1000
    } else {
        100
    };

    *comp_count.borrow_mut() = 0;
    for _ in 0..run_count {
        instrumented_sort_func();
    }

    // If there is on average less than a single comparison this will be
    // wrong. But that's such a corner case I don't care about it.
    let total = *comp_count.borrow() / (run_count as u64);
    println!("{name}: mean comparisons: {total}");
}

#[inline(never)]
fn bench_sort<T: Ord + std::fmt::Debug>(
    c: &mut Criterion,
    test_size: usize,
    transform_name: &str,
    transform: &fn(Vec<i32>) -> Vec<T>,
    pattern_name: &str,
    pattern_provider: &fn(usize) -> Vec<i32>,
    strategy_name: &str,
    strategy: SwapStrategy,
) {
    if env::var("MEASURE_COMP").is_ok() {
        // Configure this to filter results. For now the only real difference
        // is copy types.
        if transform_name == "i32" && test_size <= 100_000 {
            let name = format!("sort-{strategy_name}-comp-{pattern_name}-{test_size}");

            // Instrument via sort_by to ensure the properties of the type
            // that is being sorted, such as Copy, don't change.
            let comp_count = Rc::new(RefCell::new(0u64));
            let comp_count_copy = comp_count.clone();
            let instrumented_sort_func = || {
                let mut test_data = transform(pattern_provider(test_size));
                polysort::sort_by(
                    black_box(test_data.as_mut_slice()),
                    |a, b| {
                        *comp_count_copy.borrow_mut() += 1;
                        a.cmp(b)
                    },
                    strategy,
                );
            };
            measure_comp_count(&name, test_size, instrumented_sort_func, comp_count);
        }
        return;
    }

    c.bench_function(
        &format!("sort-{strategy_name}-{transform_name}-{pattern_name}-{test_size}"),
        |b| {
            b.iter_batched(
                || transform(pattern_provider(test_size)),
                |mut test_data| {
                    polysort::sort(black_box(test_data.as_mut_slice()), strategy);
                },
                batch_size_for(test_size),
            )
        },
    );
}

fn shuffle_vec<T: Ord>(mut v: Vec<T>) -> Vec<T> {
    use rand::seq::SliceRandom;
    use rand::thread_rng;

    let mut rng = thread_rng();
    v.shuffle(&mut rng);

    v
}

fn split_len(size: usize, part_a_percent: f64) -> (usize, usize) {
    let len_a = ((size as f64 / 100.0) * part_a_percent).round() as usize;
    let len_b = size - len_a;

    (len_a, len_b)
}

fn pattern_providers() -> Vec<(&'static str, fn(usize) -> Vec<i32>)> {
    vec![
        ("random", patterns::random),
        ("random_dense", |size| {
            patterns::random_uniform(size, 0..=((size as f64).log2().round()) as i32)
        }),
        ("random_binary", |size| {
            patterns::random_uniform(size, 0..=1)
        }),
        ("random_5p", |size| {
            let (len_95p, len_5p) = split_len(size, 95.0);
            let v: Vec<i32> = std::iter::repeat(0)
                .take(len_95p)
                .chain(patterns::random(len_5p))
                .collect();

            shuffle_vec(v)
        }),
        ("ascending", patterns::ascending),
        ("descending", patterns::descending),
        ("saws_long", |size| {
            patterns::saw_mixed(size, ((size as f64).log2().round()) as usize)
        }),
        ("saws_short", |size| {
            patterns::saw_mixed(size, (size as f64 / 22.0).round() as usize)
        }),
        ("pipe_organ", patterns::pipe_organ),
    ]
}

fn bench_patterns<T: Ord + std::fmt::Debug>(
    c: &mut Criterion,
    test_size: usize,
    transform_name: &str,
    transform: fn(Vec<i32>) -> Vec<T>,
) {
    if test_size > 100_000 && !(transform_name == "i32" || transform_name == "u64") {
        // These are just too expensive.
        return;
    }

    for (pattern_name, pattern_provider) in pattern_providers().iter() {
        if test_size < 3 && *pattern_name != "random" {
            continue;
        }

        for (strategy_name, strategy) in STRATEGIES {
            bench_sort(
                c,
                test_size,
                transform_name,
                &transform,
                pattern_name,
                pattern_provider,
                strategy_name,
                strategy,
            );
        }
    }
}

fn bench_ops(c: &mut Criterion, test_size: usize) {
    if test_size < 3 || env::var("MEASURE_COMP").is_ok() {
        return;
    }

    c.bench_function(&format!("top_n-random-{test_size}"), |b| {
        b.iter_batched(
            || patterns::random(test_size),
            |mut test_data| {
                let nth = test_data.len() / 2;
                polysort::top_n(black_box(test_data.as_mut_slice()), nth);
            },
            batch_size_for(test_size),
        )
    });

    for (strategy_name, strategy) in STRATEGIES {
        c.bench_function(&format!("partition-{strategy_name}-random-{test_size}"), |b| {
            b.iter_batched(
                || patterns::random(test_size),
                |mut test_data| {
                    black_box(polysort::partition(
                        black_box(test_data.as_mut_slice()),
                        |x| x % 2 == 0,
                        strategy,
                    ));
                },
                batch_size_for(test_size),
            )
        });
    }

    for (strategy_name, strategy) in STRATEGIES {
        c.bench_function(&format!("multi_sort-{strategy_name}-random-{test_size}"), |b| {
            b.iter_batched(
                || {
                    patterns::random(test_size)
                        .into_iter()
                        .map(|x| (x & 0xF, x))
                        .collect::<Vec<(i32, i32)>>()
                },
                |mut test_data| {
                    polysort::multi_sort(
                        black_box(test_data.as_mut_slice()),
                        &mut [
                            &mut |a: &(i32, i32), b: &(i32, i32)| a.0.cmp(&b.0),
                            &mut |a: &(i32, i32), b: &(i32, i32)| a.1.cmp(&b.1),
                        ],
                        strategy,
                    );
                },
                batch_size_for(test_size),
            )
        });
    }
}

fn ensure_true_random() {
    // Ensure that random vecs are actually different.
    let random_vec_a = patterns::random(5);
    let random_vec_b = patterns::random(5);

    // The test logic for fixed seeds must not leak in here, otherwise the
    // benchmarks would always see the same numbers and random wouldn't be
    // random at all anymore.
    assert_ne!(random_vec_a, random_vec_b);
}

fn criterion_benchmark(c: &mut Criterion) {
    let test_sizes = [
        0, 1, 2, 3, 5, 7, 8, 9, 11, 13, 15, 16, 17, 19, 20, 24, 28, 31, 36, 50, 101, 200, 500,
        1_000, 2_048, 10_000, 100_000, 1_000_000,
    ];

    patterns::disable_fixed_seed();
    ensure_true_random();

    for test_size in test_sizes {
        // Basic type often used to test sorting algorithms.
        bench_patterns(c, test_size, "i32", |values| values);

        // Common type for usize on 64-bit machines. Sorting indices is very
        // common.
        bench_patterns(c, test_size, "u64", |values| {
            values
                .iter()
                .map(|val| -> u64 {
                    // Extends the value into the 64 bit range, while
                    // preserving input order.
                    let x = ((*val as i64) + (i32::MAX as i64) + 1) as u64;
                    x.checked_mul(i32::MAX as u64).unwrap()
                })
                .collect()
        });

        // Larger type that is not Copy and does heap access.
        bench_patterns(c, test_size, "string", |values| {
            // Strings are compared lexicographically, so we zero extend them
            // to maintain the input order.
            values
                .iter()
                .map(|val| format!("{:010}", val.saturating_abs()))
                .collect()
        });

        bench_ops(c, test_size);
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
