//! Adaptive stable merge sort over natural runs, with galloping merges.

use std::mem::ManuallyDrop;
use std::ptr;
use std::slice;

/// One binary insertion pass handles slices up to this length.
const MIN_MERGE: usize = 128;
/// A side must win this many comparisons in a row before a merge switches
/// from one-at-a-time mode to galloping.
const MIN_GALLOP: usize = 7;
/// Initial scratch allocation is capped here, merges grow it on demand.
const MIN_SCRATCH: usize = 256;
/// Enough pending runs for any slice length once the stack invariant holds.
const STACK_SIZE: usize = 40;

// A maximal already-sorted stretch of the slice, pending merge.
#[derive(Copy, Clone)]
struct Run {
    start: usize,
    len: usize,
}

pub(crate) fn tim_sort<T, F>(v: &mut [T], is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();

    if len <= MIN_MERGE {
        binary_insertion_sort(v, 1, is_less);
        return;
    }

    let min_run = min_run_length(len);
    let mut buf: Vec<T> = Vec::with_capacity((len / 2).min(MIN_SCRATCH));
    let mut stack = [Run { start: 0, len: 0 }; STACK_SIZE];
    let mut stack_len = 0;
    let mut min_gallop = MIN_GALLOP;

    let mut i = 0;
    while i < len {
        let mut run_len = find_run(&mut v[i..], is_less);

        // Pad short natural runs to min_run by insertion sorting the rest in.
        if run_len < min_run {
            let force = min_run.min(len - i);
            binary_insertion_sort(&mut v[i..i + force], run_len, is_less);
            run_len = force;
        }

        debug_assert!(stack_len < STACK_SIZE);
        stack[stack_len] = Run {
            start: i,
            len: run_len,
        };
        stack_len += 1;
        i += run_len;

        // Re-establish the stack invariant: every run longer than the one
        // above it, and at least as long as the two above it combined. The
        // checks reach two runs deep because a single merge can re-violate
        // the invariant one level down.
        while stack_len > 1 {
            let r3 = stack_len - 1;
            let r2 = stack_len - 2;

            let at = if (stack_len > 2 && stack[r2 - 1].len <= stack[r2].len + stack[r3].len)
                || (stack_len > 3 && stack[r2 - 2].len <= stack[r2 - 1].len + stack[r2].len)
            {
                if stack[r2 - 1].len < stack[r3].len {
                    r2 - 1
                } else {
                    r2
                }
            } else if stack[r2].len <= stack[r3].len {
                r2
            } else {
                break;
            };

            merge_at(v, &mut stack, stack_len, at, &mut buf, &mut min_gallop, is_less);
            stack_len -= 1;
        }
    }

    // Collapse whatever is left, top down.
    while stack_len > 1 {
        let at = stack_len - 2;
        merge_at(v, &mut stack, stack_len, at, &mut buf, &mut min_gallop, is_less);
        stack_len -= 1;
    }

    debug_assert!(stack_len == 1 && stack[0].start == 0 && stack[0].len == len);
}

/// Length of the run starting at `v[0]`. A strictly descending stretch is
/// reversed in place, so the caller always receives an ascending run.
/// Descending means strictly: reversing a stretch with equal neighbors
/// would reorder them.
fn find_run<T, F>(v: &mut [T], is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    if len < 2 {
        return len;
    }

    let mut end = 2;
    if is_less(&v[1], &v[0]) {
        while end < len && is_less(&v[end], &v[end - 1]) {
            end += 1;
        }
        v[..end].reverse();
    } else {
        while end < len && !is_less(&v[end], &v[end - 1]) {
            end += 1;
        }
    }
    end
}

/// Minimum profitable run length for `len`, between 32 and 64: the top six
/// bits of `len`, plus one if any of the remaining bits are set.
fn min_run_length(len: usize) -> usize {
    debug_assert!(len > MIN_MERGE);

    let shift = usize::BITS as usize - 6 - len.leading_zeros() as usize;
    (len >> shift) + ((len & ((1 << shift) - 1)) != 0) as usize
}

/// Sorts `v` given an already sorted prefix of `sorted_len` elements. Finds
/// each insertion point by binary search, shifts the gap right by one block
/// copy.
fn binary_insertion_sort<T, F>(v: &mut [T], sorted_len: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    let mut sorted = sorted_len.max(1);

    while sorted < len {
        // Equal elements make the search continue right, which keeps them in
        // their original order.
        let mut lower = 0;
        let mut upper = sorted;
        while lower != upper {
            let center = lower + (upper - lower) / 2;
            if is_less(&v[sorted], &v[center]) {
                upper = center;
            } else {
                lower = center + 1;
            }
        }

        if lower != sorted {
            let arr_ptr = v.as_mut_ptr();
            // SAFETY: lower < sorted < len. All comparisons already happened,
            // so between the read and the write-back no user code can.
            unsafe {
                let tmp = ManuallyDrop::new(ptr::read(arr_ptr.add(sorted)));
                ptr::copy(arr_ptr.add(lower), arr_ptr.add(lower + 1), sorted - lower);
                ptr::copy_nonoverlapping(&*tmp, arr_ptr.add(lower), 1);
            }
        }

        sorted += 1;
    }
}

/// Merges the stack entries `at` and `at + 1` and replaces them with the
/// combined run.
fn merge_at<T, F>(
    v: &mut [T],
    stack: &mut [Run; STACK_SIZE],
    stack_len: usize,
    at: usize,
    buf: &mut Vec<T>,
    min_gallop: &mut usize,
    is_less: &mut F,
) where
    F: FnMut(&T, &T) -> bool,
{
    let base = stack[at].start;
    let mid = stack[at].len;
    let top = stack[at + 1].start + stack[at + 1].len;

    debug_assert!(base + mid == stack[at + 1].start);

    stack[at] = Run {
        start: base,
        len: top - base,
    };
    if at + 3 == stack_len {
        stack[at + 1] = stack[at + 2];
    }

    merge(&mut v[base..top], mid, buf, min_gallop, is_less);
}

/// Merges the adjacent sorted runs `v[..mid]` and `v[mid..]`.
fn merge<T, F>(v: &mut [T], mid: usize, buf: &mut Vec<T>, min_gallop: &mut usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    debug_assert!(mid > 0 && mid < v.len());

    // Shrink the window first: the left-run prefix at most right's head and
    // the right-run suffix at least left's tail are already in place.
    let first = {
        let (left, right) = v.split_at(mid);
        gallop_upper(left, &right[0], is_less)
    };
    if first == mid {
        return;
    }
    let last = {
        let (left, right) = v.split_at(mid);
        mid + gallop_lower_rev(right, &left[mid - 1], is_less)
    };
    if last == mid {
        return;
    }

    let v = &mut v[first..last];
    let mid = mid - first;

    // Stage the shorter run in scratch.
    if mid <= v.len() - mid {
        merge_lo(v, mid, buf, min_gallop, is_less);
    } else {
        merge_hi(v, mid, buf, min_gallop, is_less);
    }
}

// Scratch only ever holds bitwise copies whose originals sit in the merge
// gap, so len stays 0 and dropping the Vec never drops elements.
fn ensure_capacity<T>(buf: &mut Vec<T>, need: usize) {
    if buf.capacity() < need {
        *buf = Vec::with_capacity(need.next_power_of_two());
    }
}

// Forward-merge bookkeeping: the left run is staged in buf, of which
// buf[left..left_len] is unmerged, and the gap in v starts at dest. The gap
// width always equals the unmerged count, so the Drop impl both finishes a
// normal merge and restores the slice when a comparator panics.
struct MergeLo<T> {
    buf: *mut T,
    left: usize,
    left_len: usize,
    v: *mut T,
    dest: usize,
}

impl<T> Drop for MergeLo<T> {
    fn drop(&mut self) {
        // SAFETY: buf[left..left_len] holds initialized elements whose slots
        // in v are exactly v[dest..dest + (left_len - left)].
        unsafe {
            ptr::copy_nonoverlapping(
                self.buf.add(self.left),
                self.v.add(self.dest),
                self.left_len - self.left,
            );
        }
    }
}

/// Merges with the left run staged in scratch, writing forward. Requires
/// both runs non-empty and the left one no longer than the right.
fn merge_lo<T, F>(v: &mut [T], mid: usize, buf: &mut Vec<T>, min_gallop: &mut usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    debug_assert!(mid > 0 && mid <= len - mid);

    ensure_capacity(buf, mid);
    let buf_ptr = buf.as_mut_ptr();
    let arr_ptr = v.as_mut_ptr();

    // SAFETY: scratch has capacity for the whole left run. Writes through
    // dest stay in bounds because dest trails the right cursor by exactly
    // the unmerged left count.
    unsafe {
        ptr::copy_nonoverlapping(arr_ptr, buf_ptr, mid);
        let mut state = MergeLo {
            buf: buf_ptr,
            left: 0,
            left_len: mid,
            v: arr_ptr,
            dest: 0,
        };
        let mut right = mid;

        'merge: loop {
            // One element at a time, counting consecutive wins per side.
            // Ties go left, which keeps the merge stable.
            let mut left_wins = 0;
            let mut right_wins = 0;
            loop {
                if is_less(&*arr_ptr.add(right), &*buf_ptr.add(state.left)) {
                    ptr::copy_nonoverlapping(arr_ptr.add(right), arr_ptr.add(state.dest), 1);
                    right += 1;
                    state.dest += 1;
                    right_wins += 1;
                    left_wins = 0;
                    if right == len {
                        break 'merge;
                    }
                } else {
                    ptr::copy_nonoverlapping(buf_ptr.add(state.left), arr_ptr.add(state.dest), 1);
                    state.left += 1;
                    state.dest += 1;
                    left_wins += 1;
                    right_wins = 0;
                    if state.left == state.left_len {
                        break 'merge;
                    }
                }
                if left_wins >= *min_gallop || right_wins >= *min_gallop {
                    break;
                }
            }

            // Galloping mode: bulk-copy whole stretches until neither side
            // produces one long enough to pay for the searches.
            loop {
                if *min_gallop > 1 {
                    *min_gallop -= 1;
                }

                let left_rest =
                    slice::from_raw_parts(buf_ptr.add(state.left), state.left_len - state.left);
                let take_left = gallop_upper(left_rest, &*arr_ptr.add(right), is_less);
                ptr::copy_nonoverlapping(buf_ptr.add(state.left), arr_ptr.add(state.dest), take_left);
                state.left += take_left;
                state.dest += take_left;
                if state.left == state.left_len {
                    break 'merge;
                }

                let right_rest = slice::from_raw_parts(arr_ptr.add(right), len - right);
                let take_right = gallop_lower(right_rest, &*buf_ptr.add(state.left), is_less);
                // The stretch may overlap its destination.
                ptr::copy(arr_ptr.add(right), arr_ptr.add(state.dest), take_right);
                right += take_right;
                state.dest += take_right;
                if right == len {
                    break 'merge;
                }

                if take_left < MIN_GALLOP && take_right < MIN_GALLOP {
                    break;
                }
            }
            *min_gallop += 2;
        }
        // state drops here and moves any unmerged left elements into place.
    }
}

// Backward-merge counterpart of MergeLo: the right run is staged in buf, of
// which buf[..right] is unmerged, and the gap is v[left..left + right].
struct MergeHi<T> {
    buf: *mut T,
    right: usize,
    v: *mut T,
    left: usize,
}

impl<T> Drop for MergeHi<T> {
    fn drop(&mut self) {
        // SAFETY: same accounting as MergeLo, seen from the other end.
        unsafe {
            ptr::copy_nonoverlapping(self.buf, self.v.add(self.left), self.right);
        }
    }
}

/// Merges with the right run staged in scratch, writing backward. Requires
/// both runs non-empty and the right one shorter than the left.
fn merge_hi<T, F>(v: &mut [T], mid: usize, buf: &mut Vec<T>, min_gallop: &mut usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    let right_len = len - mid;
    debug_assert!(right_len > 0 && right_len < mid);

    ensure_capacity(buf, right_len);
    let buf_ptr = buf.as_mut_ptr();
    let arr_ptr = v.as_mut_ptr();

    // SAFETY: mirror of merge_lo with the write cursor walking backward. The
    // write cursor leads the left cursor by exactly the staged count.
    unsafe {
        ptr::copy_nonoverlapping(arr_ptr.add(mid), buf_ptr, right_len);
        let mut state = MergeHi {
            buf: buf_ptr,
            right: right_len,
            v: arr_ptr,
            left: mid,
        };
        let mut dest = len;

        'merge: loop {
            // Take from the left run when its tail is strictly greater, so
            // of two equal elements the right run's copy is placed last.
            let mut left_wins = 0;
            let mut right_wins = 0;
            loop {
                if is_less(&*buf_ptr.add(state.right - 1), &*arr_ptr.add(state.left - 1)) {
                    dest -= 1;
                    state.left -= 1;
                    ptr::copy_nonoverlapping(arr_ptr.add(state.left), arr_ptr.add(dest), 1);
                    left_wins += 1;
                    right_wins = 0;
                    if state.left == 0 {
                        break 'merge;
                    }
                } else {
                    dest -= 1;
                    state.right -= 1;
                    ptr::copy_nonoverlapping(buf_ptr.add(state.right), arr_ptr.add(dest), 1);
                    right_wins += 1;
                    left_wins = 0;
                    if state.right == 0 {
                        break 'merge;
                    }
                }
                if left_wins >= *min_gallop || right_wins >= *min_gallop {
                    break;
                }
            }

            loop {
                if *min_gallop > 1 {
                    *min_gallop -= 1;
                }

                // Left-tail stretch strictly greater than the staged tail.
                let left_rest = slice::from_raw_parts(arr_ptr, state.left);
                let boundary = gallop_upper_rev(left_rest, &*buf_ptr.add(state.right - 1), is_less);
                let take_left = state.left - boundary;
                dest -= take_left;
                state.left = boundary;
                ptr::copy(arr_ptr.add(boundary), arr_ptr.add(dest), take_left);
                if state.left == 0 {
                    break 'merge;
                }

                // Staged-tail stretch not less than the left tail.
                let right_rest = slice::from_raw_parts(buf_ptr, state.right);
                let boundary = gallop_lower_rev(right_rest, &*arr_ptr.add(state.left - 1), is_less);
                let take_right = state.right - boundary;
                dest -= take_right;
                state.right = boundary;
                ptr::copy_nonoverlapping(buf_ptr.add(boundary), arr_ptr.add(dest), take_right);
                if state.right == 0 {
                    break 'merge;
                }

                if take_left < MIN_GALLOP && take_right < MIN_GALLOP {
                    break;
                }
            }
            *min_gallop += 2;
        }
    }
}

/// Number of leading elements of sorted `v` less than `value`.
fn gallop_lower<T, F>(v: &[T], value: &T, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    gallop_forward(v, |e| is_less(e, value))
}

/// Number of leading elements of sorted `v` not greater than `value`.
fn gallop_upper<T, F>(v: &[T], value: &T, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    gallop_forward(v, |e| !is_less(value, e))
}

/// Index of the first element of sorted `v` not less than `value`, probing
/// from the back.
fn gallop_lower_rev<T, F>(v: &[T], value: &T, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    gallop_reverse(v, |e| !is_less(e, value))
}

/// Index of the first element of sorted `v` greater than `value`, probing
/// from the back.
fn gallop_upper_rev<T, F>(v: &[T], value: &T, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    gallop_reverse(v, |e| is_less(value, e))
}

/// Length of the longest prefix of `v` whose elements satisfy `keep`:
/// exponential probes at offsets 1, 3, 7, ... bracket the boundary, a binary
/// search pins it down.
fn gallop_forward<T, K>(v: &[T], mut keep: K) -> usize
where
    K: FnMut(&T) -> bool,
{
    let len = v.len();
    if len == 0 || !keep(&v[0]) {
        return 0;
    }

    let mut prev = 0;
    let mut probe = 1;
    while probe < len && keep(&v[probe]) {
        prev = probe;
        probe = probe * 2 + 1;
    }

    let mut lower = prev + 1;
    let mut upper = probe.min(len);
    while lower != upper {
        let center = lower + (upper - lower) / 2;
        if keep(&v[center]) {
            lower = center + 1;
        } else {
            upper = center;
        }
    }
    lower
}

/// Start of the longest suffix of `v` whose elements satisfy `keep`
/// (`v.len()` if even the last element fails), probing from the back with
/// doubling gaps.
fn gallop_reverse<T, K>(v: &[T], mut keep: K) -> usize
where
    K: FnMut(&T) -> bool,
{
    let len = v.len();
    if len == 0 || !keep(&v[len - 1]) {
        return len;
    }

    // v[upper] always satisfies keep, v[lower - 1] (if any) does not.
    let mut upper = len - 1;
    let mut lower = 0;
    let mut gap = 1;
    while gap <= upper {
        let probe = upper - gap;
        if keep(&v[probe]) {
            upper = probe;
            gap *= 2;
        } else {
            lower = probe + 1;
            break;
        }
    }

    while lower != upper {
        let center = lower + (upper - lower) / 2;
        if keep(&v[center]) {
            upper = center;
        } else {
            lower = center + 1;
        }
    }
    upper
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallop_forward_bounds() {
        let v = [1, 1, 2, 2, 2, 3, 5, 5, 8, 9];
        let mut is_less = |a: &i32, b: &i32| a < b;

        assert_eq!(gallop_lower(&v, &2, &mut is_less), 2);
        assert_eq!(gallop_upper(&v, &2, &mut is_less), 5);
        assert_eq!(gallop_lower(&v, &0, &mut is_less), 0);
        assert_eq!(gallop_upper(&v, &9, &mut is_less), 10);
        assert_eq!(gallop_lower(&v, &4, &mut is_less), 6);
        assert_eq!(gallop_upper(&v, &4, &mut is_less), 6);

        let empty: [i32; 0] = [];
        assert_eq!(gallop_lower(&empty, &7, &mut is_less), 0);
        assert_eq!(gallop_upper(&empty, &7, &mut is_less), 0);
    }

    #[test]
    fn gallop_reverse_bounds() {
        let v = [1, 1, 2, 2, 2, 3, 5, 5, 8, 9];
        let mut is_less = |a: &i32, b: &i32| a < b;

        assert_eq!(gallop_lower_rev(&v, &2, &mut is_less), 2);
        assert_eq!(gallop_upper_rev(&v, &2, &mut is_less), 5);
        assert_eq!(gallop_lower_rev(&v, &99, &mut is_less), 10);
        assert_eq!(gallop_upper_rev(&v, &0, &mut is_less), 0);

        let empty: [i32; 0] = [];
        assert_eq!(gallop_lower_rev(&empty, &7, &mut is_less), 0);
        assert_eq!(gallop_upper_rev(&empty, &7, &mut is_less), 0);
    }

    #[test]
    fn min_run_computation() {
        assert_eq!(min_run_length(129), 33);
        assert_eq!(min_run_length(256), 32);
        assert_eq!(min_run_length(257), 33);
        assert_eq!(min_run_length(1 << 20), 32);
        assert_eq!(min_run_length((1 << 20) - 1), 64);

        for len in [129usize, 1_000, 4_096, 65_537, 1 << 24] {
            assert!((32..=64).contains(&min_run_length(len)));
        }
    }

    #[test]
    fn run_detection() {
        let mut is_less = |a: &i32, b: &i32| a < b;

        let mut v = [1, 2, 2, 3, 0, 9];
        assert_eq!(find_run(&mut v, &mut is_less), 4);
        assert_eq!(v, [1, 2, 2, 3, 0, 9]);

        // A strictly descending prefix comes back reversed.
        let mut v = [5, 4, 3, 1, 1, 2];
        assert_eq!(find_run(&mut v, &mut is_less), 4);
        assert_eq!(v, [1, 3, 4, 5, 1, 2]);

        let mut v = [7];
        assert_eq!(find_run(&mut v, &mut is_less), 1);

        let mut empty: [i32; 0] = [];
        assert_eq!(find_run(&mut empty, &mut is_less), 0);
    }

    #[test]
    fn collapse_keeps_many_short_runs_sorted() {
        // Enough equal-length runs to trip both collapse rules, with distinct
        // values so any misordered merge is visible.
        let mut v: Vec<i32> = Vec::new();
        for run in 0..20 {
            v.extend((0..32).rev().map(|x| run * 100 + x));
        }

        let mut is_less = |a: &i32, b: &i32| a < b;
        tim_sort(&mut v, &mut is_less);

        assert!(v.windows(2).all(|w| w[0] < w[1]));
    }
}
