//! Sorting by a list of tie-breaking key comparators.

use std::cmp::Ordering;
use std::mem;

use crate::partition::partition3_impl;
use crate::quicksort::median_of_three;
use crate::SwapStrategy;

/// Sorts `v` by `keys[0]`, breaking ties with `keys[1]`, and so on.
///
/// Instead of chaining the keys into one lexicographic comparator, each level
/// three-way partitions around a median-of-3 pivot under its key and hands
/// only the equivalence classes down to the next key. Elements already told
/// apart by an earlier key never reach the later, often more expensive, ones.
///
/// The last key level sorts its classes with [`sort_by`](crate::sort_by)
/// semantics under `strategy`. The partitioning levels above it do not
/// preserve relative order regardless of `strategy`. An empty key list leaves
/// `v` untouched.
///
/// # Examples
///
/// ```
/// use polysort::SwapStrategy;
///
/// let mut points = [(0, 0), (5, 5), (0, 1), (0, 2)];
/// polysort::multi_sort(
///     &mut points,
///     &mut [
///         &mut |a: &(i32, i32), b: &(i32, i32)| a.0.cmp(&b.0),
///         &mut |a: &(i32, i32), b: &(i32, i32)| a.1.cmp(&b.1),
///     ],
///     SwapStrategy::Unstable,
/// );
/// assert_eq!(points, [(0, 0), (0, 1), (0, 2), (5, 5)]);
/// ```
pub fn multi_sort<T>(
    v: &mut [T],
    keys: &mut [&mut dyn FnMut(&T, &T) -> Ordering],
    strategy: SwapStrategy,
) {
    if mem::size_of::<T>() == 0 || keys.is_empty() {
        return;
    }
    multi_sort_impl(v, keys, strategy);
}

fn multi_sort_impl<T>(
    mut v: &mut [T],
    keys: &mut [&mut dyn FnMut(&T, &T) -> Ordering],
    strategy: SwapStrategy,
) {
    loop {
        if keys.len() == 1 {
            let key = &mut *keys[0];
            crate::sort_impl(v, &mut |a, b| key(a, b) == Ordering::Less, strategy);
            return;
        }
        if v.len() <= 1 {
            return;
        }

        let last = v.len() - 1;
        let pivot_idx = {
            let key = &mut *keys[0];
            median_of_three(v, &mut |a: &T, b: &T| key(a, b) == Ordering::Less)
        };
        v.swap(pivot_idx, last);

        let (rest, pivot) = v.split_at_mut(last);
        let pivot = &pivot[0];
        let (lt_len, eq_len) = {
            let key = &mut *keys[0];
            let (lt, eq, _) = partition3_impl(rest, pivot, &mut |a, b| key(a, b) == Ordering::Less);
            (lt.len(), eq.len())
        };

        // Join the pivot to its equivalence class.
        v.swap(lt_len + eq_len, last);

        let (lt, rest) = v.split_at_mut(lt_len);
        let (eq, gt) = rest.split_at_mut(eq_len + 1);

        // Only this class is still tied, so only it sees the later keys.
        multi_sort_impl(eq, &mut keys[1..], strategy);

        // Recurse into the smaller remaining side, iterate on the larger.
        if lt.len() <= gt.len() {
            multi_sort_impl(lt, &mut *keys, strategy);
            v = gt;
        } else {
            multi_sort_impl(gt, &mut *keys, strategy);
            v = lt;
        }
    }
}
