//! Trait impls for [`DynArray`]: slice views, equality, concatenation and
//! iteration.

use std::fmt;
use std::ops::{Add, AddAssign, Deref, DerefMut};

use crate::array::DynArray;

impl<T> Deref for DynArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

/// Equal iff the lengths match and every element compares equal in index
/// order. Capacity and growth policy are not compared.
impl<T: PartialEq> PartialEq for DynArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynArray<T> {}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// `&a + &b`: a new array holding `a` then `b`; both operands are unchanged.
impl<T: Clone> Add<&DynArray<T>> for &DynArray<T> {
    type Output = DynArray<T>;

    fn add(self, rhs: &DynArray<T>) -> DynArray<T> {
        let mut out = DynArray::with_policy(self.policy());
        out.reserve(self.len().saturating_add(rhs.len()));
        out.extend_from_slice(self);
        out.extend_from_slice(rhs);
        out
    }
}

/// `a + &b`: reuses `a`'s allocation.
impl<T: Clone> Add<&DynArray<T>> for DynArray<T> {
    type Output = DynArray<T>;

    fn add(mut self, rhs: &DynArray<T>) -> DynArray<T> {
        self += rhs;
        self
    }
}

impl<T: Clone> AddAssign<&DynArray<T>> for DynArray<T> {
    fn add_assign(&mut self, rhs: &DynArray<T>) {
        self.push_back_all(rhs);
    }
}

impl<T> Extend<T> for DynArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(self.len().saturating_add(lower));
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = DynArray::new();
        out.extend(iter);
        out
    }
}

impl<T: Clone> From<&[T]> for DynArray<T> {
    fn from(items: &[T]) -> Self {
        let mut out = DynArray::new();
        out.extend_from_slice(items);
        out
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
