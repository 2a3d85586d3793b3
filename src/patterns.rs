//! Input distributions for tests and benchmarks. Currently limited to i32
//! values.
//!
//! Every generator derives its rng from a process-wide seed, so a failing
//! test can be replayed by exporting `OVERRIDE_SEED`. Benchmarks call
//! [`disable_fixed_seed`] to draw fresh randomness on every invocation
//! instead.

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;
use rand::distributions::Uniform;
use rand::prelude::*;

/// Uniformly random values over the full i32 range.
pub fn random(size: usize) -> Vec<i32> {
    let mut rng = rng();
    (0..size).map(|_| rng.gen::<i32>()).collect()
}

/// Random values drawn from `range`. A narrow range gives dense duplicates.
pub fn random_uniform<R>(size: usize, range: R) -> Vec<i32>
where
    R: Into<Uniform<i32>>,
{
    let dist = range.into();
    let mut rng = rng();
    (0..size).map(|_| dist.sample(&mut rng)).collect()
}

/// The same value repeated.
pub fn all_equal(size: usize) -> Vec<i32> {
    vec![66; size]
}

/// Already sorted.
pub fn ascending(size: usize) -> Vec<i32> {
    (0..size as i32).collect()
}

/// Sorted the wrong way around.
pub fn descending(size: usize) -> Vec<i32> {
    (0..size as i32).rev().collect()
}

/// `saw_count` equally long sorted chunks of random values.
pub fn ascending_saw(size: usize, saw_count: usize) -> Vec<i32> {
    let mut v = random(size);
    for chunk in v.chunks_mut(chunk_len(size, saw_count)) {
        chunk.sort_unstable();
    }
    v
}

/// Like [`ascending_saw`] with each chunk sorted descending.
pub fn descending_saw(size: usize, saw_count: usize) -> Vec<i32> {
    let mut v = random(size);
    for chunk in v.chunks_mut(chunk_len(size, saw_count)) {
        chunk.sort_unstable();
        chunk.reverse();
    }
    v
}

/// Sorted chunks of alternating direction.
pub fn saw_mixed(size: usize, saw_count: usize) -> Vec<i32> {
    let mut v = random(size);
    for (i, chunk) in v.chunks_mut(chunk_len(size, saw_count)).enumerate() {
        chunk.sort_unstable();
        if i % 2 == 1 {
            chunk.reverse();
        }
    }
    v
}

/// First half ascending, second half descending.
pub fn pipe_organ(size: usize) -> Vec<i32> {
    let mut v = random(size);
    let mid = size / 2;
    v[..mid].sort_unstable();
    v[mid..].sort_unstable_by(|a, b| b.cmp(a));
    v
}

static USE_FIXED_SEED: AtomicBool = AtomicBool::new(true);
static SEED: OnceCell<u64> = OnceCell::new();

/// Makes every generator draw a fresh seed instead of the per-process one.
pub fn disable_fixed_seed() {
    USE_FIXED_SEED.store(false, Ordering::Release);
}

/// The seed all generators derive their rng from. Picked once per process
/// unless overridden, so a test harness can print it on failure and a rerun
/// with `OVERRIDE_SEED` set can replay the exact inputs.
pub fn random_init_seed() -> u64 {
    if USE_FIXED_SEED.load(Ordering::Acquire) {
        *SEED.get_or_init(|| {
            env::var("OVERRIDE_SEED")
                .ok()
                .and_then(|val| val.parse().ok())
                .unwrap_or_else(|| thread_rng().gen())
        })
    } else {
        thread_rng().gen()
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(random_init_seed())
}

fn chunk_len(size: usize, saw_count: usize) -> usize {
    (size / saw_count.max(1)).max(1)
}
