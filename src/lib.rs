//! In-place sorting and order statistics over mutable slices.
//!
//! Every entry point is parameterized by a comparator and, where it matters,
//! by a [`SwapStrategy`] choosing how much stability the caller wants to pay
//! for. [`sort`] dispatches between an introsort-style quicksort and an
//! adaptive run-merging stable sort, [`top_n`] is a randomized quickselect,
//! [`partition`] and [`partition3`] expose the partitioning layer directly,
//! and [`multi_sort`] sorts by a list of tie-breaking key comparators without
//! building a combined comparator.
//!
//! ```
//! use polysort::SwapStrategy;
//!
//! let mut v = [4, 3, 2, 1];
//! polysort::sort(&mut v, SwapStrategy::Unstable);
//! assert_eq!(v, [1, 2, 3, 4]);
//! ```
//!
//! Comparators must describe a strict weak ordering. A comparator that
//! doesn't (or one that panics) never breaks memory safety and never loses
//! elements: the slice is left holding some permutation of its original
//! contents.

use std::cmp::Ordering;
use std::mem;

mod multisort;
mod partition;
mod quicksort;
mod select;
mod sorted;
mod timsort;

pub mod patterns;

pub use multisort::multi_sort;
pub use partition::{partition, partition3, partition3_by};
pub use select::{top_n, top_n_by, top_n_by_rng, top_n_rng};
pub use sorted::Sorted;

/// Stability policy threaded through the partition and sort entry points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwapStrategy {
    /// No guarantee about the relative order of equivalent elements. Picked
    /// to minimize element moves.
    Unstable,
    /// Equivalent elements keep their relative order on the side that ends up
    /// left of the partition point, but not on the right side.
    Semistable,
    /// Equivalent elements keep their relative order everywhere.
    Stable,
}

/// Sorts `v` ascending and returns a [`Sorted`] view over it.
///
/// `SwapStrategy::Unstable` selects quicksort: in-place, *O*(*n* \* log(*n*))
/// typical, no order guarantee for equal elements. The other strategies
/// select an adaptive merge sort: stable, *O*(*n* \* log(*n*)) worst case,
/// *O*(*n*) on presorted input, allocating up to half the slice length of
/// scratch memory.
///
/// # Examples
///
/// ```
/// use polysort::SwapStrategy;
///
/// let mut v = [-5, 4, 1, -3, 2];
/// polysort::sort(&mut v, SwapStrategy::Stable);
/// assert_eq!(v, [-5, -3, 1, 2, 4]);
/// ```
#[inline(always)]
pub fn sort<T>(v: &mut [T], strategy: SwapStrategy) -> Sorted<'_, T, impl FnMut(&T, &T) -> Ordering>
where
    T: Ord,
{
    sort_by(v, |a: &T, b: &T| a.cmp(b), strategy)
}

/// Sorts `v` with a comparator function and returns a [`Sorted`] view that
/// keeps the comparator for later searches.
///
/// The comparator must define a total ordering. If it doesn't, the resulting
/// order is unspecified but `v` still holds all of its original elements.
///
/// # Examples
///
/// ```
/// use polysort::SwapStrategy;
///
/// let mut words = ["aBc", "a", "abc", "b", "ABC", "c"];
/// polysort::sort_by(
///     &mut words,
///     |a, b| a.to_lowercase().cmp(&b.to_lowercase()),
///     SwapStrategy::Stable,
/// );
/// assert_eq!(words, ["a", "aBc", "abc", "ABC", "b", "c"]);
/// ```
#[inline(always)]
pub fn sort_by<T, F>(v: &mut [T], mut compare: F, strategy: SwapStrategy) -> Sorted<'_, T, F>
where
    F: FnMut(&T, &T) -> Ordering,
{
    sort_impl(v, &mut |a, b| compare(a, b) == Ordering::Less, strategy);

    debug_assert!(
        v.windows(2).all(|w| compare(&w[1], &w[0]) != Ordering::Less),
        "sort produced an unsorted result, the comparator is not a strict weak ordering"
    );

    Sorted::new(v, compare)
}

pub(crate) fn sort_impl<T, F>(v: &mut [T], is_less: &mut F, strategy: SwapStrategy)
where
    F: FnMut(&T, &T) -> bool,
{
    // Sorting has no meaningful behavior on zero-sized types.
    if mem::size_of::<T>() == 0 {
        return;
    }

    match strategy {
        SwapStrategy::Unstable => quicksort::quicksort(v, is_less),
        SwapStrategy::Semistable | SwapStrategy::Stable => timsort::tim_sort(v, is_less),
    }
}
