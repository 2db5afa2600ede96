//! The typed dynamic array.
//!
//! [`DynArray`] owns one [`RawBuf`] and tracks how many of its leading
//! slots hold live `T` values. Growth goes through the shared
//! [`GrowthPolicy`]; relocation is a bytewise `realloc`, which is a valid
//! move for every Rust type.

#![allow(unsafe_code)]

use std::alloc::handle_alloc_error;
use std::marker::PhantomData;
use std::ptr;
use std::slice;

use contig_core::{ContainerError, ElementLayout, GrowthPolicy, GrowthStats, RawBuf};

/// A growable, contiguous array of `T`.
///
/// Slots `[0, len)` are live; slots `[len, capacity)` are storage only.
/// A new array holds no allocation. Any mutating call may move the buffer,
/// invalidating outstanding element references (the borrow checker already
/// enforces this).
///
/// Operations that grow have two forms: `try_*` returns
/// [`ContainerError::AllocationFailed`] and leaves the array untouched,
/// while the plain form aborts through [`handle_alloc_error`] when the
/// allocator is exhausted and panics when the requested size overflows.
pub struct DynArray<T> {
    buf: RawBuf,
    len: usize,
    policy: GrowthPolicy,
    _marker: PhantomData<T>,
}

impl<T> DynArray<T> {
    /// Create an empty array with the default doubling policy. Does not allocate.
    pub fn new() -> Self {
        Self::with_policy(GrowthPolicy::default())
    }

    /// Create an empty array that grows according to `policy`.
    pub fn with_policy(policy: GrowthPolicy) -> Self {
        Self {
            buf: RawBuf::new(ElementLayout::of::<T>()),
            len: 0,
            policy,
            _marker: PhantomData,
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds no live elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current allocation can hold.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The growth policy this array was created with.
    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Allocation counters for this array's buffer.
    pub fn stats(&self) -> &GrowthStats {
        self.buf.stats()
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the pointer is aligned and non-null (dangling only when
        // `len == 0`), and slots `[0, len)` hold initialised values.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Pointer to the first slot. Valid for `len` reads.
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr().cast::<T>()
    }

    /// Mutable pointer to the first slot. Valid for `len` reads and
    /// `capacity` writes.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_ptr().cast::<T>()
    }

    /// Ensure capacity for at least `requested` elements in total.
    ///
    /// A no-op when `requested <= capacity`; otherwise allocates
    /// `max(requested, floor) * factor` slots.
    pub fn try_reserve(&mut self, requested: usize) -> Result<(), ContainerError> {
        self.buf.try_grow(&self.policy, requested)
    }

    /// Infallible form of [`try_reserve`](Self::try_reserve).
    pub fn reserve(&mut self, requested: usize) {
        if let Err(err) = self.try_reserve(requested) {
            allocation_failure::<T>(err);
        }
    }

    /// Append one element.
    ///
    /// On failure `value` is dropped and the array is unchanged.
    pub fn try_push_back(&mut self, value: T) -> Result<(), ContainerError> {
        self.try_reserve(self.len.saturating_add(1))?;
        // SAFETY: capacity was just ensured to exceed `len`.
        unsafe { self.push_unchecked(value) };
        Ok(())
    }

    /// Append one element. Amortized O(1).
    pub fn push_back(&mut self, value: T) {
        self.reserve(self.len.saturating_add(1));
        // SAFETY: capacity was just ensured to exceed `len`.
        unsafe { self.push_unchecked(value) };
    }

    /// Remove and return the last element.
    ///
    /// Returns [`ContainerError::Empty`] when there is nothing to pop. The
    /// allocation is kept for reuse; call [`fit`](Self::fit) or
    /// [`clear`](Self::clear) to release memory.
    pub fn pop_back(&mut self) -> Result<T, ContainerError> {
        if self.len == 0 {
            return Err(ContainerError::Empty { op: "pop_back" });
        }
        self.len -= 1;
        // SAFETY: slot `len` held a live value and is now outside the live
        // range, so ownership moves to the caller exactly once.
        Ok(unsafe { ptr::read(self.as_ptr().add(self.len)) })
    }

    /// The first element, or [`ContainerError::Empty`].
    pub fn front(&self) -> Result<&T, ContainerError> {
        self.as_slice()
            .first()
            .ok_or(ContainerError::Empty { op: "front" })
    }

    /// The first element mutably, or [`ContainerError::Empty`].
    pub fn front_mut(&mut self) -> Result<&mut T, ContainerError> {
        self.as_mut_slice()
            .first_mut()
            .ok_or(ContainerError::Empty { op: "front" })
    }

    /// The last element, or [`ContainerError::Empty`].
    pub fn back(&self) -> Result<&T, ContainerError> {
        self.as_slice()
            .last()
            .ok_or(ContainerError::Empty { op: "back" })
    }

    /// The last element mutably, or [`ContainerError::Empty`].
    pub fn back_mut(&mut self) -> Result<&mut T, ContainerError> {
        self.as_mut_slice()
            .last_mut()
            .ok_or(ContainerError::Empty { op: "back" })
    }

    /// Checked access: [`ContainerError::IndexOutOfRange`] when `index >= len`.
    ///
    /// The unchecked fast path is the slice method
    /// [`get_unchecked`](slice::get_unchecked), reachable through `Deref`.
    pub fn at(&self, index: usize) -> Result<&T, ContainerError> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(ContainerError::IndexOutOfRange { index, len })
    }

    /// Checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ContainerError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(ContainerError::IndexOutOfRange { index, len })
    }

    /// Drop trailing elements so that at most `new_len` remain.
    ///
    /// Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail_len = self.len - new_len;
        // SAFETY: `new_len < len`, so the tail lies within the live range.
        let tail =
            unsafe { ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(new_len), tail_len) };
        // Shrink first: a panicking destructor must not cause a double drop.
        self.len = new_len;
        // SAFETY: the tail held live values that are no longer reachable.
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Drop every element and release the allocation.
    pub fn clear(&mut self) {
        self.truncate(0);
        self.buf.release();
    }

    /// Reallocate so that `capacity == len`. Releases the allocation when
    /// empty. A no-op when already tight.
    pub fn try_fit(&mut self) -> Result<(), ContainerError> {
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

    /// Infallible form of [`try_fit`](Self::try_fit).
    pub fn fit(&mut self) {
        if let Err(err) = self.try_fit() {
            allocation_failure::<T>(err);
        }
    }

    /// Move the contents out in O(1), leaving `self` empty with no allocation.
    ///
    /// The returned array keeps this array's growth policy.
    pub fn take(&mut self) -> Self {
        std::mem::replace(self, Self::with_policy(self.policy))
    }

    /// Write `value` into slot `len` and bump the length.
    ///
    /// # Safety
    ///
    /// `len < capacity` must hold.
    unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.buf.capacity());
        // SAFETY: guaranteed by the caller; slot `len` is unused storage.
        unsafe { ptr::write(self.as_mut_ptr().add(self.len), value) };
        self.len += 1;
    }

    fn fill_with(&mut self, new_len: usize, mut make: impl FnMut() -> T) {
        while self.len < new_len {
            // SAFETY: callers reserve `new_len` slots first. `len` is bumped
            // per element, so a panicking `make` leaves only live values.
            unsafe { self.push_unchecked(make()) };
        }
    }
}

impl<T: Default> DynArray<T> {
    /// Resize to exactly `new_len` elements.
    ///
    /// Growing appends `T::default()` values; shrinking drops the trailing
    /// elements. `new_len == 0` is [`clear`](Self::clear) and releases the
    /// allocation.
    pub fn try_resize(&mut self, new_len: usize) -> Result<(), ContainerError> {
        if new_len == 0 {
            self.clear();
            return Ok(());
        }
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        self.try_reserve(new_len)?;
        self.fill_with(new_len, T::default);
        Ok(())
    }

    /// Infallible form of [`try_resize`](Self::try_resize).
    pub fn resize(&mut self, new_len: usize) {
        if new_len > self.len {
            self.reserve(new_len);
        }
        if let Err(err) = self.try_resize(new_len) {
            allocation_failure::<T>(err);
        }
    }
}

impl<T: Clone> DynArray<T> {
    /// Append clones of every element of `items`, in order, after a single
    /// batch reservation.
    pub fn extend_from_slice(&mut self, items: &[T]) {
        self.reserve(self.len.saturating_add(items.len()));
        for item in items {
            // SAFETY: room for all of `items` was reserved above. `len` is
            // bumped per element, so a panicking `clone` leaves only live
            // values.
            unsafe { self.push_unchecked(item.clone()) };
        }
    }

    /// Append every element of `other`, in order.
    ///
    /// Equivalent to pushing each element, with one reservation instead of
    /// many.
    pub fn push_back_all(&mut self, other: &DynArray<T>) {
        self.extend_from_slice(other.as_slice());
    }
}

impl<T: Clone> Clone for DynArray<T> {
    /// Deep copy into a tightly-fitted allocation (`capacity == len`).
    fn clone(&self) -> Self {
        let mut out = Self::with_policy(self.policy);
        if let Err(err) = out.buf.try_set_capacity(self.len) {
            allocation_failure::<T>(err);
        }
        for item in self.iter() {
            // SAFETY: `out` was sized for exactly `self.len` elements.
            unsafe { out.push_unchecked(item.clone()) };
        }
        out
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        // The buffer frees itself; only the live values need dropping.
        self.truncate(0);
    }
}

#[cold]
fn allocation_failure<T>(err: ContainerError) -> ! {
    if let ContainerError::AllocationFailed { elements, .. } = err {
        if let Some(layout) = ElementLayout::of::<T>().array(elements) {
            handle_alloc_error(layout);
        }
    }
    panic!("capacity overflow: {err}");
}
