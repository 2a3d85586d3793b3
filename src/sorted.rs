//! A view that witnesses a slice is sorted.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

/// Exclusive view over a slice that was sorted under a specific comparator.
///
/// Returned by [`sort`](crate::sort) and [`sort_by`](crate::sort_by). The
/// view holds both the borrow and the comparator: the order cannot be
/// disturbed through it, and its searches always use the relation that
/// established the order in the first place.
///
/// # Examples
///
/// ```
/// use polysort::SwapStrategy;
///
/// let mut v = [2, 1, 3, 2];
/// let mut sorted = polysort::sort(&mut v, SwapStrategy::Stable);
/// assert_eq!(sorted.as_slice(), [1, 2, 2, 3]);
/// assert_eq!(sorted.equal_range(&2), 1..3);
/// assert!(sorted.contains(&3));
/// ```
pub struct Sorted<'a, T, F> {
    v: &'a mut [T],
    compare: F,
}

impl<'a, T, F> Sorted<'a, T, F> {
    pub(crate) fn new(v: &'a mut [T], compare: F) -> Self {
        Self { v, compare }
    }

    /// Read access to the ordered elements.
    pub fn as_slice(&self) -> &[T] {
        self.v
    }

    pub fn len(&self) -> usize {
        self.v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }

    /// Gives the underlying storage back. Any mutation afterwards is free to
    /// break the order, which is why this consumes the view.
    pub fn into_inner(self) -> &'a mut [T] {
        self.v
    }
}

impl<'a, T, F> Sorted<'a, T, F>
where
    F: FnMut(&T, &T) -> Ordering,
{
    /// First index at which `value` could be inserted without breaking the
    /// order: everything before it compares less than `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use polysort::SwapStrategy;
    ///
    /// let mut v = [5, 1, 3, 3, 7];
    /// let mut sorted = polysort::sort(&mut v, SwapStrategy::Unstable);
    /// assert_eq!(sorted.lower_bound(&3), 1);
    /// assert_eq!(sorted.upper_bound(&3), 3);
    /// assert_eq!(sorted.lower_bound(&4), 3);
    /// ```
    pub fn lower_bound(&mut self, value: &T) -> usize {
        let mut lower = 0;
        let mut upper = self.v.len();
        while lower != upper {
            let center = lower + (upper - lower) / 2;
            if (self.compare)(&self.v[center], value) == Ordering::Less {
                lower = center + 1;
            } else {
                upper = center;
            }
        }
        lower
    }

    /// One past the last element equivalent to `value`: everything from this
    /// index on compares greater than `value`.
    pub fn upper_bound(&mut self, value: &T) -> usize {
        let mut lower = 0;
        let mut upper = self.v.len();
        while lower != upper {
            let center = lower + (upper - lower) / 2;
            if (self.compare)(value, &self.v[center]) == Ordering::Less {
                upper = center;
            } else {
                lower = center + 1;
            }
        }
        lower
    }

    /// Half-open index range of the elements equivalent to `value`. Empty
    /// (with both ends at the insertion point) if there are none.
    pub fn equal_range(&mut self, value: &T) -> Range<usize> {
        self.lower_bound(value)..self.upper_bound(value)
    }

    /// Whether some element is equivalent to `value` under the comparator.
    pub fn contains(&mut self, value: &T) -> bool {
        let idx = self.lower_bound(value);
        idx < self.v.len() && (self.compare)(&self.v[idx], value) == Ordering::Equal
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Sorted<'_, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.v.iter()).finish()
    }
}
