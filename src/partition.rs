//! Predicate and pivot based partitioning of slices.

use std::cmp::Ordering;

use crate::SwapStrategy;

/// Reorders `v` so every element satisfying `pred` ends up before every
/// element that doesn't, and returns the index of the first element of the
/// false block (`v.len()` if all elements satisfy `pred`).
///
/// The strategy decides how much of the original relative order survives:
/// `Unstable` converges two cursors and swaps misplaced pairs, moving the
/// fewest elements. `Semistable` keeps the true block in its original order
/// with a single forward scan. `Stable` keeps both blocks in their original
/// order via divide-and-rotate, costing *O*(*n* \* log(*n*)) moves but no
/// allocation.
///
/// # Examples
///
/// ```
/// use polysort::SwapStrategy;
///
/// let mut v = [1, 4, 2, 3, 6, 7, 5];
/// let split = polysort::partition(&mut v, |x| x % 2 == 0, SwapStrategy::Stable);
/// assert_eq!(split, 3);
/// assert_eq!(v, [4, 2, 6, 1, 3, 7, 5]);
/// ```
pub fn partition<T, F>(v: &mut [T], mut pred: F, strategy: SwapStrategy) -> usize
where
    F: FnMut(&T) -> bool,
{
    match strategy {
        SwapStrategy::Unstable => hoare(v, &mut pred),
        SwapStrategy::Semistable => forward_scan(v, &mut pred),
        SwapStrategy::Stable => stable_split(v, &mut pred),
    }
}

/// Reorders `v` into three adjacent blocks: elements ordered before `pivot`,
/// elements equivalent to it, and elements ordered after it. Returns the
/// blocks as subslices of `v` in that order.
///
/// Runs in a single pass. No relative order is preserved within the blocks.
///
/// # Examples
///
/// ```
/// let mut v = [8, 3, 4, 1, 4, 7, 4];
/// let (lt, eq, gt) = polysort::partition3(&mut v, &4);
/// assert_eq!(eq, [4, 4, 4]);
/// assert!(lt.iter().all(|x| *x < 4));
/// assert!(gt.iter().all(|x| *x > 4));
/// ```
pub fn partition3<'a, T>(v: &'a mut [T], pivot: &T) -> (&'a mut [T], &'a mut [T], &'a mut [T])
where
    T: Ord,
{
    partition3_impl(v, pivot, &mut |a, b| a.lt(b))
}

/// Same as [`partition3`] but with a comparator function, where equivalence
/// means the comparator returned `Ordering::Equal`.
pub fn partition3_by<'a, T, F>(
    v: &'a mut [T],
    pivot: &T,
    mut compare: F,
) -> (&'a mut [T], &'a mut [T], &'a mut [T])
where
    F: FnMut(&T, &T) -> Ordering,
{
    partition3_impl(v, pivot, &mut |a, b| compare(a, b) == Ordering::Less)
}

/// Two converging cursors. Each swap fixes one misplaced element on each
/// side, so the number of moves is minimal.
pub(crate) fn hoare<T, F>(v: &mut [T], pred: &mut F) -> usize
where
    F: FnMut(&T) -> bool,
{
    let mut lo = 0;
    let mut hi = v.len();

    loop {
        // First element from the front that fails the predicate.
        loop {
            if lo >= hi {
                return lo;
            }
            if !pred(&v[lo]) {
                break;
            }
            lo += 1;
        }
        // First element from the back that satisfies it.
        loop {
            if lo >= hi {
                return lo;
            }
            if pred(&v[hi - 1]) {
                break;
            }
            hi -= 1;
        }
        v.swap(lo, hi - 1);
        lo += 1;
        hi -= 1;
    }
}

/// Single forward scan that pulls satisfying elements down to the boundary.
/// They are encountered and placed in input order, which is what makes the
/// true block stable.
fn forward_scan<T, F>(v: &mut [T], pred: &mut F) -> usize
where
    F: FnMut(&T) -> bool,
{
    let len = v.len();

    let mut dest = 0;
    while dest < len && pred(&v[dest]) {
        dest += 1;
    }
    if dest == len {
        return len;
    }

    // v[..dest] satisfies pred, v[dest..i] doesn't.
    for i in dest + 1..len {
        if pred(&v[i]) {
            v.swap(dest, i);
            dest += 1;
        }
    }
    dest
}

/// Partition both halves recursively, then rotate the left half's false
/// block past the right half's true block.
fn stable_split<T, F>(v: &mut [T], pred: &mut F) -> usize
where
    F: FnMut(&T) -> bool,
{
    let len = v.len();
    if len == 0 {
        return 0;
    }
    if len == 1 {
        return pred(&v[0]) as usize;
    }

    let mid = len / 2;
    let left_split = stable_split(&mut v[..mid], pred);
    let right_split = mid + stable_split(&mut v[mid..], pred);

    v[left_split..right_split].rotate_left(mid - left_split);
    left_split + (right_split - mid)
}

/// Three-way partition after Bentley-McIlroy: equivalent elements are parked
/// at both ends of the slice during the scan and swapped into the middle
/// afterwards, so runs of duplicates cost no extra passes.
pub(crate) fn partition3_impl<'a, T, F>(
    v: &'a mut [T],
    pivot: &T,
    is_less: &mut F,
) -> (&'a mut [T], &'a mut [T], &'a mut [T])
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();

    // v[..i] equal, v[i..j] less, v[k..l] greater, v[l..] equal.
    let (mut i, mut j) = (0, 0);
    let (mut k, mut l) = (len, len);

    'scan: loop {
        loop {
            if j == k {
                break 'scan;
            }
            if is_less(&v[j], pivot) {
                j += 1;
            } else if is_less(pivot, &v[j]) {
                break;
            } else {
                v.swap(i, j);
                i += 1;
                j += 1;
            }
        }
        loop {
            k -= 1;
            if !is_less(pivot, &v[k]) {
                if is_less(&v[k], pivot) {
                    break;
                }
                l -= 1;
                v.swap(k, l);
            }
            if j == k {
                break 'scan;
            }
        }
        // v[j] belongs after the pivot, v[k] before it.
        v.swap(j, k);
        j += 1;
    }

    let strictly_less = j - i;
    let strictly_greater = l - k;

    // Move the parked equals into the middle. Each block is swapped with the
    // far end of its neighboring block, whichever of the two is shorter.
    let swap_len = i.min(strictly_less);
    swap_ranges(v, 0, j - swap_len, swap_len);
    let swap_len = (len - l).min(strictly_greater);
    swap_ranges(v, k, len - swap_len, swap_len);

    let (lt, rest) = v.split_at_mut(strictly_less);
    let (eq, gt) = rest.split_at_mut(len - strictly_less - strictly_greater);
    (lt, eq, gt)
}

// The ranges are disjoint, each block is swapped with at most the length of
// its counterpart.
fn swap_ranges<T>(v: &mut [T], mut a: usize, mut b: usize, n: usize) {
    for _ in 0..n {
        v.swap(a, b);
        a += 1;
        b += 1;
    }
}
