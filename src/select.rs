//! Randomized selection of order statistics.

use std::cmp::Ordering;

use rand::Rng;

use crate::partition;

/// Reorders `v` so that `v[nth]` holds the element a full ascending sort
/// would put there, everything before it compares less than or equal to it,
/// and everything after it greater than or equal. Does nothing if `nth` is
/// out of bounds.
///
/// Runs in *O*(*n*) on average by repeatedly partitioning around a randomly
/// chosen pivot and recursing into the side that contains `nth`.
///
/// # Examples
///
/// ```
/// let mut v = [25, 7, 9, 2, 0, 5, 21];
/// polysort::top_n(&mut v, 4);
/// assert_eq!(v[4], 9);
/// assert!(v[..4].iter().all(|x| *x <= 9));
/// assert!(v[5..].iter().all(|x| *x >= 9));
/// ```
#[inline(always)]
pub fn top_n<T>(v: &mut [T], nth: usize)
where
    T: Ord,
{
    top_n_rng(v, nth, &mut rand::thread_rng())
}

/// Same as [`top_n`] with a comparator function.
///
/// # Examples
///
/// ```
/// let mut v = [3_i32, -7, 4, -1, 9];
/// polysort::top_n_by(&mut v, 2, |a, b| a.abs().cmp(&b.abs()));
/// assert_eq!(v[2].abs(), 4);
/// ```
#[inline(always)]
pub fn top_n_by<T, F>(v: &mut [T], nth: usize, mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    top_n_impl(
        v,
        nth,
        &mut |a, b| compare(a, b) == Ordering::Less,
        &mut rand::thread_rng(),
    )
}

/// [`top_n`] with caller-supplied randomness, for deterministic pivot
/// sequences in tests and benchmarks.
#[inline(always)]
pub fn top_n_rng<T, R>(v: &mut [T], nth: usize, rng: &mut R)
where
    T: Ord,
    R: Rng,
{
    top_n_impl(v, nth, &mut |a: &T, b: &T| a.lt(b), rng)
}

/// [`top_n_by`] with caller-supplied randomness.
#[inline(always)]
pub fn top_n_by_rng<T, F, R>(v: &mut [T], nth: usize, mut compare: F, rng: &mut R)
where
    F: FnMut(&T, &T) -> Ordering,
    R: Rng,
{
    top_n_impl(v, nth, &mut |a, b| compare(a, b) == Ordering::Less, rng)
}

fn top_n_impl<T, F, R>(mut v: &mut [T], mut nth: usize, is_less: &mut F, rng: &mut R)
where
    F: FnMut(&T, &T) -> bool,
    R: Rng,
{
    if nth >= v.len() {
        return;
    }

    while v.len() > 1 {
        let last = v.len() - 1;
        let pivot_idx = rng.gen_range(0..v.len());
        v.swap(pivot_idx, last);

        // Split the pivot off so the partition predicate can borrow it while
        // the rest of the slice is reordered.
        let (rest, pivot) = v.split_at_mut(last);
        let pivot = &pivot[0];
        let mid = partition::hoare(rest, &mut |e| is_less(e, pivot));
        v.swap(mid, last);

        if nth < mid {
            let (left, _) = v.split_at_mut(mid);
            v = left;
            continue;
        }

        // Elements equal to the pivot are scattered right of mid. Group them
        // directly after it, otherwise inputs with few distinct values would
        // shrink by only one element per round.
        let (head, tail) = v.split_at_mut(mid + 1);
        let pivot = &head[mid];
        let eq_len = partition::hoare(tail, &mut |e| !is_less(pivot, e));

        let eq_end = mid + 1 + eq_len;
        if nth < eq_end {
            return;
        }

        let (_, right) = v.split_at_mut(eq_end);
        nth -= eq_end;
        v = right;
    }
}
