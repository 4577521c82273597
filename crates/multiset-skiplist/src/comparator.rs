use std::cmp::Ordering;
use std::fmt::{Debug, Formatter, Result as FmtResult};

pub use seekable_iterator::{Comparator, OrdComparator as DefaultComparator};


/// A [`Comparator`] which forwards to a closure.
///
/// The closure must implement a total order which is consistent between calls. If it does not,
/// the resulting order of a skiplist's entries is unspecified (but memory-safe); this is not
/// checked at runtime.
///
/// # Example
/// ```
/// use std::cmp::Ordering;
/// use multiset_skiplist::{FnComparator, MultisetSkiplist};
///
/// let descending = FnComparator(|lhs: &u32, rhs: &u32| -> Ordering { rhs.cmp(lhs) });
/// let mut list = MultisetSkiplist::new_seeded(descending, 7);
/// list.extend([1, 3, 2]);
///
/// assert!(list.iter().eq(&[3, 2, 1]));
/// ```
#[derive(Default, Clone, Copy)]
pub struct FnComparator<F>(pub F);

impl<T: ?Sized, F: Fn(&T, &T) -> Ordering> Comparator<T> for FnComparator<F> {
    #[inline]
    fn cmp(&self, lhs: &T, rhs: &T) -> Ordering {
        (self.0)(lhs, rhs)
    }
}

impl<F> Debug for FnComparator<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("FnComparator(..)")
    }
}
