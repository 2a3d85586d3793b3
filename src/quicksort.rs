//! Unstable quicksort with median-of-3 pivots and an insertion sort floor.

use std::mem::ManuallyDrop;
use std::ptr;

/// Below this length a single insertion sort pass beats further partitioning.
const MAX_INSERTION: usize = 25;

pub(crate) fn quicksort<T, F>(mut v: &mut [T], is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    while v.len() > MAX_INSERTION {
        let last = v.len() - 1;
        let pivot_idx = median_of_three(v, is_less);
        v.swap(pivot_idx, last);

        // Split the pivot off so the scan can borrow it while the rest of
        // the slice is reordered.
        let (rest, pivot) = v.split_at_mut(last);
        let pivot = &pivot[0];
        let mid = partition_around(rest, pivot, is_less);
        v.swap(mid, last);

        // Recurse into the shorter side, iterate on the longer. Keeps the
        // stack depth logarithmic even for adversarial inputs.
        let (left, right) = v.split_at_mut(mid);
        let right = &mut right[1..];
        if left.len() <= right.len() {
            quicksort(left, is_less);
            v = right;
        } else {
            quicksort(right, is_less);
            v = left;
        }
    }

    if v.len() > 1 {
        insertion_sort_shift_left(v, 1, is_less);
    }
}

/// Partitions `v` against `pivot` with a two-pointer scan from both ends.
///
/// Both scans stop on elements equal to the pivot, splitting runs of
/// duplicates roughly in half. Returns the split point: `v[..split]` holds
/// only elements `<= pivot` and `v[split..]` only elements `>= pivot`.
fn partition_around<T, F>(v: &mut [T], pivot: &T, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let mut lo = 0;
    let mut hi = v.len();

    loop {
        while lo < hi && is_less(&v[lo], pivot) {
            lo += 1;
        }
        while lo < hi && is_less(pivot, &v[hi - 1]) {
            hi -= 1;
        }
        if lo >= hi {
            return lo;
        }

        hi -= 1;
        v.swap(lo, hi);
        lo += 1;
    }
}

/// Sorts `v[0]`, `v[mid]` and `v[last]` in place and returns `mid`, which
/// then holds the median of the three. The branch pattern packs the three
/// comparison results into one value so each arrangement costs exactly three
/// comparisons and at most two swaps.
///
/// The two patterns without a match arm cannot occur if the comparator is a
/// strict weak ordering.
pub(crate) fn median_of_three<T, F>(v: &mut [T], is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let last = v.len() - 1;
    let mid = v.len() / 2;

    let pattern = ((is_less(&v[0], &v[mid]) as usize) << 2)
        | ((is_less(&v[0], &v[last]) as usize) << 1)
        | (is_less(&v[mid], &v[last]) as usize);

    match pattern {
        0b000 => v.swap(0, last),
        0b001 => {
            v.swap(0, last);
            v.swap(0, mid);
        }
        0b011 => v.swap(0, mid),
        0b100 => {
            v.swap(mid, last);
            v.swap(0, mid);
        }
        0b110 => v.swap(mid, last),
        0b111 => {}
        _ => debug_assert!(false, "comparator is not a strict weak ordering"),
    }

    mid
}

// When dropped, copies from `src` into `dest`.
struct InsertionHole<T> {
    src: *const T,
    dest: *mut T,
}

impl<T> Drop for InsertionHole<T> {
    fn drop(&mut self) {
        // SAFETY: whoever constructed the hole keeps src valid and dest in
        // bounds for the whole time it is live.
        unsafe {
            ptr::copy_nonoverlapping(self.src, self.dest, 1);
        }
    }
}

/// Inserts `v[v.len() - 1]` into the sorted prefix `v[..v.len() - 1]`.
///
/// SAFETY: the caller must ensure `v.len() >= 2`.
unsafe fn insert_tail<T, F>(v: &mut [T], is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    debug_assert!(v.len() >= 2);

    let arr_ptr = v.as_mut_ptr();
    let i = v.len() - 1;

    // SAFETY: caller guarantees i >= 1, so i and i - 1 are in bounds. The
    // element is read out exactly once and the hole guard writes it back even
    // if a comparison panics, so every slot stays initialized.
    unsafe {
        if is_less(&*arr_ptr.add(i), &*arr_ptr.add(i - 1)) {
            let tmp = ManuallyDrop::new(ptr::read(arr_ptr.add(i)));
            let mut hole = InsertionHole {
                src: &*tmp,
                dest: arr_ptr.add(i - 1),
            };
            ptr::copy_nonoverlapping(arr_ptr.add(i - 1), arr_ptr.add(i), 1);

            for j in (0..(i - 1)).rev() {
                let j_ptr = arr_ptr.add(j);
                if !is_less(&*tmp, &*j_ptr) {
                    break;
                }

                ptr::copy_nonoverlapping(j_ptr, hole.dest, 1);
                hole.dest = j_ptr;
            }
            // `hole` is dropped here, moving tmp into its final position.
        }
    }
}

/// Sorts `v` assuming `v[..offset]` is already sorted.
fn insertion_sort_shift_left<T, F>(v: &mut [T], offset: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();

    // Also lets the compiler drop the bounds checks inside the loop.
    assert!(offset != 0 && offset <= len);

    // Shift each element of the unsorted region as far left as needed.
    for i in offset..len {
        // SAFETY: offset >= 1, so the subslice has at least two elements.
        unsafe {
            insert_tail(&mut v[..=i], is_less);
        }
    }
}
