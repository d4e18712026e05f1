//! Factory-enforced heap wrapper for value payloads.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Shared, immutable heap allocation for value payloads.
///
/// The constructor is crate-private: heap values are built only through the
/// factory methods on `Value`, which keeps the "immutable once constructed"
/// invariant in one place.
#[repr(transparent)]
pub struct Heap<T>(Arc<T>);

impl<T> Heap<T> {
    /// Allocate a payload. Crate-private on purpose.
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }

    /// Returns `true` if both handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_allocation() {
        let a = Heap::new(String::from("hello"));
        let b = a.clone();
        assert!(Heap::ptr_eq(&a, &b));
    }

    #[test]
    fn equality_compares_contents() {
        let a = Heap::new(String::from("hello"));
        let b = Heap::new(String::from("hello"));
        assert!(!Heap::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }
}
