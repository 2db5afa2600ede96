//! The type-erased dynamic array.
//!
//! [`ErasedArray`] stores a flat run of `element_size`-byte records with no
//! header or padding between them. Growth follows the same
//! [`GrowthPolicy`] as the typed array, with all arithmetic done as
//! `count * element_size`. Allocation failure is an ordinary, recoverable
//! error throughout.
//!
//! Teardown is two-phase because the container cannot know whether records
//! own resources:
//!
//! - [`ErasedArray::shallow_free`] releases the buffer only.
//! - [`ErasedArray::deep_free`] runs the deep-free hook on every record
//!   first.
//!
//! Dropping an `ErasedArray` is a shallow free.

#![allow(unsafe_code)]

use std::fmt;
use std::ops::Range;
use std::ptr;
use std::rc::Rc;
use std::slice;

use contig_core::{ContainerError, ElementLayout, GrowthPolicy, GrowthStats, HookKind, RawBuf};

use crate::hooks::{ElementHooks, RawHooks};

/// A growable array of opaque fixed-size records.
pub struct ErasedArray {
    buf: RawBuf,
    len: usize,
    policy: GrowthPolicy,
    hooks: Rc<dyn ElementHooks>,
}

impl ErasedArray {
    /// Create an empty array of `element_size`-byte records with
    /// [`RawHooks`]. A size of zero is coerced to one byte. Does not allocate.
    pub fn new(element_size: usize) -> Self {
        Self::with_policy(element_size, GrowthPolicy::default())
    }

    /// Create an empty array that grows according to `policy`.
    pub fn with_policy(element_size: usize, policy: GrowthPolicy) -> Self {
        Self {
            buf: RawBuf::new(ElementLayout::bytes(element_size)),
            len: 0,
            policy,
            hooks: Rc::new(RawHooks),
        }
    }

    /// Builder form of [`set_hooks`](Self::set_hooks).
    pub fn with_hooks(mut self, hooks: Rc<dyn ElementHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Install the per-element copy and free behaviour.
    pub fn set_hooks(&mut self, hooks: Rc<dyn ElementHooks>) {
        self.hooks = hooks;
    }

    /// The installed element hooks.
    pub fn hooks(&self) -> &Rc<dyn ElementHooks> {
        &self.hooks
    }

    /// Size of one record in bytes (always at least 1).
    pub fn element_size(&self) -> usize {
        self.buf.layout().size()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no records are live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of records the current allocation can hold.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Size of the current allocation in bytes.
    pub fn allocated_bytes(&self) -> usize {
        self.buf.capacity_bytes()
    }

    /// The growth policy this array grows with.
    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Allocation counters for this array's buffer.
    ///
    /// Counters survive a change of element size by
    /// [`deep_copy_from`](Self::deep_copy_from).
    pub fn stats(&self) -> &GrowthStats {
        self.buf.stats()
    }

    /// The live records as one byte slice of exactly
    /// `len * element_size` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the buffer holds at least `len` records, every byte of
        // which was written by `push_back`, `resize` or a copy hook; the
        // pointer is non-null and byte-aligned.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.live_bytes()) }
    }

    /// The live records as one mutable byte slice.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_bytes`; `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.buf.as_ptr(), self.live_bytes()) }
    }

    /// Record `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        let range = self.record_range(index)?;
        Some(&self.as_bytes()[range])
    }

    /// Record `index` mutably, or `None` past the end.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let range = self.record_range(index)?;
        Some(&mut self.as_bytes_mut()[range])
    }

    /// Checked access: [`ContainerError::IndexOutOfRange`] when
    /// `index >= len`.
    pub fn at(&self, index: usize) -> Result<&[u8], ContainerError> {
        self.get(index).ok_or(ContainerError::IndexOutOfRange {
            index,
            len: self.len,
        })
    }

    /// Iterate over the live records in index order.
    pub fn records(&self) -> std::slice::ChunksExact<'_, u8> {
        self.as_bytes().chunks_exact(self.element_size())
    }

    /// Ensure capacity for at least `requested` records in total.
    pub fn reserve(&mut self, requested: usize) -> Result<(), ContainerError> {
        self.buf.try_grow(&self.policy, requested)
    }

    /// Set the number of live records to exactly `new_len`.
    ///
    /// New records are zero-filled. Shrinking truncates without invoking
    /// the deep-free hook and keeps the allocation; free owned resources
    /// first if the records have any.
    pub fn resize(&mut self, new_len: usize) -> Result<(), ContainerError> {
        if new_len > self.len {
            self.reserve(new_len)?;
            let start = self.live_bytes();
            let added = (new_len - self.len) * self.element_size();
            // SAFETY: `reserve` guaranteed room for `new_len` records, so
            // `[start, start + added)` lies inside the allocation.
            unsafe { ptr::write_bytes(self.buf.as_ptr().add(start), 0, added) };
        }
        self.len = new_len;
        Ok(())
    }

    /// Append one record. `element` must be exactly `element_size` bytes.
    ///
    /// On failure the array is unchanged.
    pub fn push_back(&mut self, element: &[u8]) -> Result<(), ContainerError> {
        self.check_record_len(element.len())?;
        self.reserve(self.len.saturating_add(1))?;
        let offset = self.live_bytes();
        // SAFETY: capacity exceeds `len`, so the slot at `offset` is
        // `element_size` writable bytes. `element` borrows immutably and so
        // cannot alias the buffer while `&mut self` is held.
        unsafe {
            ptr::copy_nonoverlapping(
                element.as_ptr(),
                self.buf.as_ptr().add(offset),
                element.len(),
            )
        };
        self.len += 1;
        Ok(())
    }

    /// Copy the last record into `out`, then drop it from the array.
    ///
    /// Fails with [`ContainerError::Empty`] when there is nothing to pop, and
    /// with [`ContainerError::ElementSizeMismatch`] when `out` is not
    /// `element_size` bytes. The allocation is kept for reuse.
    pub fn pop_back(&mut self, out: &mut [u8]) -> Result<(), ContainerError> {
        if self.len == 0 {
            return Err(ContainerError::Empty { op: "pop_back" });
        }
        self.check_record_len(out.len())?;
        let last = self.len - 1;
        let range = last * self.element_size()..self.live_bytes();
        out.copy_from_slice(&self.as_bytes()[range]);
        self.len = last;
        Ok(())
    }

    /// Reallocate so that `allocated_bytes() == len * element_size`.
    ///
    /// Releases the allocation when empty; a no-op when already tight.
    pub fn fit(&mut self) -> Result<(), ContainerError> {
        debug_assert!(
            self.len <= self.buf.capacity(),
            "length {} exceeds capacity {}",
            self.len,
            self.buf.capacity()
        );
        if self.buf.capacity() == self.len {
            return Ok(());
        }
        self.buf.try_set_capacity(self.len)
    }

    /// Make `self` a deep copy of `src`.
    ///
    /// `self` adopts `src`'s element size, hooks and growth policy. Its
    /// previous records are discarded without invoking any hook (call
    /// [`deep_free`](Self::deep_free) first if they own resources). Then
    /// `src`'s deep-copy hook runs once per record, in index order.
    ///
    /// On allocation failure `self` is unchanged. If the hook fails at record
    /// `i`, the sweep stops with [`ContainerError::HookFailed`] and `self`
    /// holds exactly the `i` records copied so far, so a following
    /// `deep_free` releases precisely what was duplicated.
    pub fn deep_copy_from(&mut self, src: &ErasedArray) -> Result<(), ContainerError> {
        if self.element_size() == src.element_size() {
            self.buf.try_grow(&src.policy, src.len)?;
        } else {
            self.buf.try_relayout(src.buf.layout(), &src.policy, src.len)?;
        }
        self.len = 0;
        self.policy = src.policy;
        self.hooks = Rc::clone(&src.hooks);

        let size = src.element_size();
        for (index, record) in src.records().enumerate() {
            let start = index * size;
            // SAFETY: capacity covers `src.len` records and `index < src.len`,
            // so the slot is `size` in-bounds bytes, disjoint from `src`.
            let dest = unsafe { slice::from_raw_parts_mut(self.buf.as_ptr().add(start), size) };
            // Stale bytes from an earlier occupant must not leak into the hook.
            dest.fill(0);
            if !src.hooks.deep_copy(dest, record) {
                return Err(ContainerError::HookFailed {
                    hook: HookKind::Copy,
                    index,
                });
            }
            self.len = index + 1;
        }
        Ok(())
    }

    /// A new array holding a deep copy of `self`.
    pub fn try_clone(&self) -> Result<Self, ContainerError> {
        let mut out = Self::with_policy(self.element_size(), self.policy);
        out.deep_copy_from(self)?;
        Ok(out)
    }

    /// Release the allocation without invoking any hook.
    ///
    /// The array becomes empty and remains usable; calling this twice is
    /// harmless.
    pub fn shallow_free(&mut self) {
        self.buf.release();
        self.len = 0;
    }

    /// Run the deep-free hook on every record in index order, then release
    /// the allocation.
    ///
    /// Stops at the first record whose hook fails, returning
    /// [`ContainerError::HookFailed`]. Records after it are not visited, and
    /// the array (length and allocation) is left as it was so the caller can
    /// decide how to proceed.
    pub fn deep_free(&mut self) -> Result<(), ContainerError> {
        let hooks = Rc::clone(&self.hooks);
        let size = self.element_size();
        for (index, record) in self.as_bytes_mut().chunks_exact_mut(size).enumerate() {
            if !hooks.deep_free(record) {
                return Err(ContainerError::HookFailed {
                    hook: HookKind::Free,
                    index,
                });
            }
        }
        self.shallow_free();
        Ok(())
    }

    fn live_bytes(&self) -> usize {
        self.len * self.element_size()
    }

    fn record_range(&self, index: usize) -> Option<Range<usize>> {
        if index >= self.len {
            return None;
        }
        let start = index * self.element_size();
        Some(start..start + self.element_size())
    }

    fn check_record_len(&self, actual: usize) -> Result<(), ContainerError> {
        let expected = self.element_size();
        if actual != expected {
            return Err(ContainerError::ElementSizeMismatch { expected, actual });
        }
        Ok(())
    }
}

impl fmt::Debug for ErasedArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedArray")
            .field("element_size", &self.element_size())
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::FnHooks;
    use std::cell::Cell;

    fn filled(bytes: &[u8]) -> ErasedArray {
        let mut arr = ErasedArray::new(1);
        for b in bytes {
            arr.push_back(std::slice::from_ref(b)).unwrap();
        }
        arr
    }

    #[test]
    fn zero_element_size_is_coerced() {
        let arr = ErasedArray::new(0);
        assert_eq!(arr.element_size(), 1);
        assert_eq!(arr.capacity(), 0);
        assert_eq!(arr.allocated_bytes(), 0);
    }

    #[test]
    fn push_back_grows_in_bytes() {
        let mut arr = ErasedArray::new(4);
        arr.push_back(&7u32.to_le_bytes()).unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr.capacity(), 2);
        assert_eq!(arr.allocated_bytes(), 8);
        arr.push_back(&9u32.to_le_bytes()).unwrap();
        arr.push_back(&11u32.to_le_bytes()).unwrap();
        assert_eq!(arr.allocated_bytes(), 24);
        assert_eq!(arr.as_bytes().len(), 12);
        assert_eq!(arr.at(2).unwrap(), &11u32.to_le_bytes());
    }

    #[test]
    fn push_back_rejects_wrong_size() {
        let mut arr = ErasedArray::new(4);
        let err = arr.push_back(&[1, 2]).unwrap_err();
        assert_eq!(
            err,
            ContainerError::ElementSizeMismatch {
                expected: 4,
                actual: 2
            }
        );
        assert!(arr.is_empty());
        assert_eq!(arr.capacity(), 0);
    }

    #[test]
    fn pop_back_copies_out_last_record() {
        let mut arr = filled(b"ab");
        let mut out = [0u8; 1];
        arr.pop_back(&mut out).unwrap();
        assert_eq!(out, [b'b']);
        assert_eq!(arr.len(), 1);
        assert_eq!(arr.capacity(), 2);
    }

    #[test]
    fn pop_back_on_empty_fails_without_touching_out() {
        let mut arr = ErasedArray::new(1);
        let mut out = [42u8];
        assert_eq!(
            arr.pop_back(&mut out),
            Err(ContainerError::Empty { op: "pop_back" })
        );
        assert_eq!(out, [42]);
    }

    #[test]
    fn resize_zero_fills_new_records() {
        let mut arr = filled(b"xy");
        arr.resize(5).unwrap();
        assert_eq!(arr.as_bytes(), b"xy\0\0\0");
        arr.resize(1).unwrap();
        assert_eq!(arr.as_bytes(), b"x");
        assert_eq!(arr.capacity(), 10);
    }

    #[test]
    fn resize_overflow_leaves_array_unchanged() {
        let mut arr = filled(b"abc");
        let (cap, ptr, stats) = (arr.capacity(), arr.as_bytes().as_ptr(), arr.stats().clone());
        let err = arr.resize(usize::MAX).unwrap_err();
        assert!(matches!(err, ContainerError::AllocationFailed { .. }));
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.capacity(), cap);
        assert_eq!(arr.as_bytes().as_ptr(), ptr);
        assert_eq!(arr.as_bytes(), b"abc");
        assert_eq!(arr.stats(), &stats);
    }

    #[test]
    fn fit_matches_allocation_to_live_bytes() {
        let mut arr = ErasedArray::new(3);
        for i in 0..5u8 {
            arr.push_back(&[i, i, i]).unwrap();
        }
        arr.fit().unwrap();
        assert_eq!(arr.allocated_bytes(), arr.len() * arr.element_size());
        arr.fit().unwrap();
        assert_eq!(arr.allocated_bytes(), 15);
    }

    #[test]
    fn reserve_overflow_leaves_array_unchanged() {
        let mut arr = filled(b"keep");
        let cap = arr.capacity();
        let err = arr.reserve(usize::MAX).unwrap_err();
        assert!(matches!(err, ContainerError::AllocationFailed { .. }));
        assert_eq!(arr.capacity(), cap);
        assert_eq!(arr.as_bytes(), b"keep");
    }

    #[test]
    fn deep_copy_runs_hook_per_record() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let hooks = FnHooks::new().on_copy(move |dest, src| {
            seen.set(seen.get() + 1);
            dest.copy_from_slice(src);
            true
        });
        let src = filled(b"hello").with_hooks(Rc::new(hooks));
        let mut dest = ErasedArray::new(1);
        dest.deep_copy_from(&src).unwrap();
        assert_eq!(calls.get(), 5);
        assert_eq!(dest.as_bytes(), b"hello");
        assert_ne!(dest.as_bytes().as_ptr(), src.as_bytes().as_ptr());
        assert!(Rc::ptr_eq(dest.hooks(), src.hooks()));
    }

    #[test]
    fn deep_copy_adopts_element_size() {
        let mut src = ErasedArray::new(2);
        src.push_back(&[1, 2]).unwrap();
        src.push_back(&[3, 4]).unwrap();
        let mut dest = filled(b"zzzzzzz");
        dest.deep_copy_from(&src).unwrap();
        assert_eq!(dest.element_size(), 2);
        assert_eq!(dest.len(), 2);
        assert_eq!(dest.as_bytes(), &[1u8, 2, 3, 4]);
    }

    #[test]
    fn deep_copy_sizes_with_source_policy() {
        let src = filled(b"abcde");
        let custom = GrowthPolicy::new(3, 4).unwrap();

        let mut same_size = ErasedArray::with_policy(1, custom);
        same_size.deep_copy_from(&src).unwrap();
        let mut other_size = ErasedArray::with_policy(2, custom);
        other_size.deep_copy_from(&src).unwrap();

        for dest in [&same_size, &other_size] {
            assert_eq!(dest.policy(), GrowthPolicy::default());
            assert_eq!(dest.capacity(), 10);
            assert_eq!(dest.as_bytes(), b"abcde");
        }
    }

    #[test]
    fn deep_copy_keeps_stats_across_element_size_change() {
        let mut dest = filled(b"xyz");
        let before = dest.stats().clone();
        assert_eq!(before.reallocations, 2);

        let mut src = ErasedArray::new(4);
        src.push_back(&[1, 2, 3, 4]).unwrap();
        dest.deep_copy_from(&src).unwrap();

        assert_eq!(dest.element_size(), 4);
        assert_eq!(dest.stats().reallocations, before.reallocations + 1);
        assert_eq!(dest.stats().releases, before.releases + 1);
        assert_eq!(dest.stats().peak_capacity, before.peak_capacity);
    }

    #[test]
    fn deep_copy_allocation_failure_leaves_dest_unchanged() {
        let mut dest = filled(b"keep");
        let cap = dest.capacity();
        let mut src = ErasedArray::new(1);
        // Length without allocation: no hook runs before the reservation.
        src.len = usize::MAX;
        let err = dest.deep_copy_from(&src).unwrap_err();
        src.len = 0;
        assert!(matches!(err, ContainerError::AllocationFailed { .. }));
        assert_eq!(dest.as_bytes(), b"keep");
        assert_eq!(dest.capacity(), cap);
    }

    #[test]
    fn deep_copy_stops_at_failing_hook() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let hooks = FnHooks::new().on_copy(move |dest, src| {
            seen.set(seen.get() + 1);
            if src == b"!" {
                return false;
            }
            dest.copy_from_slice(src);
            true
        });
        let src = filled(b"ab!cd").with_hooks(Rc::new(hooks));
        let mut dest = ErasedArray::new(1);
        let err = dest.deep_copy_from(&src).unwrap_err();
        assert_eq!(
            err,
            ContainerError::HookFailed {
                hook: HookKind::Copy,
                index: 2
            }
        );
        assert_eq!(calls.get(), 3);
        assert_eq!(dest.as_bytes(), b"ab");
    }

    #[test]
    fn deep_free_visits_every_record_then_releases() {
        let frees = Rc::new(Cell::new(0));
        let seen = Rc::clone(&frees);
        let hooks = FnHooks::new().on_free(move |_| {
            seen.set(seen.get() + 1);
            true
        });
        let mut arr = filled(b"four").with_hooks(Rc::new(hooks));
        arr.deep_free().unwrap();
        assert_eq!(frees.get(), 4);
        assert_eq!(arr.len(), 0);
        assert_eq!(arr.capacity(), 0);
        assert_eq!(arr.stats().releases, 1);
    }

    #[test]
    fn deep_free_aborts_at_first_failure() {
        let frees = Rc::new(Cell::new(0));
        let seen = Rc::clone(&frees);
        let hooks = FnHooks::new().on_free(move |rec| {
            seen.set(seen.get() + 1);
            rec != b"x"
        });
        let mut arr = filled(b"abxde").with_hooks(Rc::new(hooks));
        let err = arr.deep_free().unwrap_err();
        assert_eq!(
            err,
            ContainerError::HookFailed {
                hook: HookKind::Free,
                index: 2
            }
        );
        assert_eq!(frees.get(), 3);
        assert_eq!(arr.len(), 5);
        assert!(arr.capacity() > 0);
        arr.shallow_free();
        assert_eq!(arr.capacity(), 0);
    }

    #[test]
    fn shallow_free_is_repeatable_and_array_reusable() {
        let mut arr = filled(b"abc");
        arr.shallow_free();
        arr.shallow_free();
        assert!(arr.is_empty());
        assert_eq!(arr.allocated_bytes(), 0);
        arr.push_back(b"z").unwrap();
        assert_eq!(arr.as_bytes(), b"z");
    }

    #[test]
    fn records_iterates_in_order() {
        let mut arr = ErasedArray::new(2);
        arr.push_back(&[1, 1]).unwrap();
        arr.push_back(&[2, 2]).unwrap();
        let firsts: Vec<u8> = arr.records().map(|r| r[0]).collect();
        assert_eq!(firsts, vec![1, 2]);
        arr.get_mut(1).unwrap()[1] = 9;
        assert_eq!(arr.get(1), Some(&[2u8, 9][..]));
        assert_eq!(arr.get(2), None);
        assert_eq!(
            arr.at(2),
            Err(ContainerError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn try_clone_is_independent() {
        let src = filled(b"copy");
        let mut dup = src.try_clone().unwrap();
        dup.as_bytes_mut()[0] = b'C';
        assert_eq!(src.as_bytes(), b"copy");
        assert_eq!(dup.as_bytes(), b"Copy");
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn push_pop_is_lifo(
                size in 1usize..16,
                records in prop::collection::vec(any::<u8>(), 0..64),
            ) {
                let mut arr = ErasedArray::new(size);
                for b in &records {
                    arr.push_back(&vec![*b; size]).unwrap();
                }
                prop_assert_eq!(arr.as_bytes().len(), records.len() * size);

                let mut out = vec![0u8; size];
                for b in records.iter().rev() {
                    arr.pop_back(&mut out).unwrap();
                    prop_assert!(out.iter().all(|x| x == b));
                }
                prop_assert!(arr.pop_back(&mut out).is_err());
            }

            #[test]
            fn deep_copy_equals_source(
                size in 1usize..8,
                bytes in prop::collection::vec(any::<u8>(), 0..128),
            ) {
                let mut src = ErasedArray::new(size);
                for chunk in bytes.chunks_exact(size) {
                    src.push_back(chunk).unwrap();
                }
                let copy = src.try_clone().unwrap();
                prop_assert_eq!(copy.len(), src.len());
                prop_assert_eq!(copy.as_bytes(), src.as_bytes());
            }

            #[test]
            fn fit_is_tight(n in 0usize..200, size in 1usize..8) {
                let mut arr = ErasedArray::new(size);
                arr.resize(n).unwrap();
                arr.fit().unwrap();
                prop_assert_eq!(arr.allocated_bytes(), n * size);
            }
        }
    }
}
