//! The single owning allocation behind both container variants.
//!
//! [`RawBuf`] owns at most one heap block sized for `capacity` slots of an
//! [`ElementLayout`]. It never reads or drops slot contents: reallocation
//! relocates bytes, and the container on top decides which of those bytes
//! are live values. Every `unsafe` block in this module carries a
//! `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use crate::error::ContainerError;
use crate::growth::GrowthPolicy;
use crate::stats::GrowthStats;

/// Size and alignment of one element slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementLayout {
    size: usize,
    align: usize,
}

impl ElementLayout {
    /// Layout of one `T`.
    pub fn of<T>() -> Self {
        Self {
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
        }
    }

    /// Layout of an opaque `size`-byte record with byte alignment.
    ///
    /// A size of zero is coerced to one byte.
    pub fn bytes(size: usize) -> Self {
        Self {
            size: size.max(1),
            align: 1,
        }
    }

    /// Size of one slot in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alignment of one slot in bytes.
    pub fn align(&self) -> usize {
        self.align
    }

    /// Layout of `count` contiguous slots, or `None` if the byte size
    /// overflows or exceeds `isize::MAX`.
    pub fn array(&self, count: usize) -> Option<Layout> {
        let bytes = self.size.checked_mul(count)?;
        Layout::from_size_align(bytes, self.align).ok()
    }

    fn dangling(&self) -> NonNull<u8> {
        NonNull::new(ptr::without_provenance_mut(self.align)).unwrap_or(NonNull::dangling())
    }
}

/// An owning, exactly-sized allocation of `capacity` element slots.
///
/// Invariant: `capacity == 0` if and only if no heap block is held (for
/// zero-sized slots no heap block is ever held and `capacity` is purely
/// logical). While empty, the pointer is dangling but correctly aligned, so
/// zero-length slices over it are valid.
pub struct RawBuf {
    ptr: NonNull<u8>,
    capacity: usize,
    layout: ElementLayout,
    stats: GrowthStats,
}

impl RawBuf {
    /// Create an empty buffer. Does not allocate.
    pub fn new(layout: ElementLayout) -> Self {
        Self {
            ptr: layout.dangling(),
            capacity: 0,
            layout,
            stats: GrowthStats::default(),
        }
    }

    /// Layout of one slot.
    pub fn layout(&self) -> ElementLayout {
        self.layout
    }

    /// Number of slots the current allocation holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of the current allocation in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.capacity * self.layout.size
    }

    /// Whether a heap block is currently held.
    pub fn is_allocated(&self) -> bool {
        self.capacity != 0 && self.layout.size != 0
    }

    /// Pointer to the first slot. Dangling (but aligned) when unallocated.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Allocation counters for this buffer.
    pub fn stats(&self) -> &GrowthStats {
        &self.stats
    }

    /// Grow so that at least `requested` slots fit, following `policy`.
    ///
    /// A no-op when `requested <= capacity`. On failure nothing changes.
    pub fn try_grow(
        &mut self,
        policy: &GrowthPolicy,
        requested: usize,
    ) -> Result<(), ContainerError> {
        match policy.target_capacity(self.capacity, requested) {
            Some(target) => self.try_set_capacity(target),
            None => Ok(()),
        }
    }

    /// Reallocate to exactly `new_capacity` slots.
    ///
    /// The first `min(capacity, new_capacity)` slots are relocated bytewise;
    /// anything beyond `new_capacity` is discarded without being dropped, so
    /// callers must drop or free those slots first. `new_capacity == 0`
    /// releases the allocation.
    ///
    /// On failure the buffer (pointer, capacity and contents) is unchanged.
    pub fn try_set_capacity(&mut self, new_capacity: usize) -> Result<(), ContainerError> {
        if new_capacity == self.capacity {
            return Ok(());
        }
        if new_capacity == 0 {
            self.release();
            return Ok(());
        }

        let new_layout = self
            .layout
            .array(new_capacity)
            .ok_or_else(|| self.alloc_failed(new_capacity))?;

        if new_layout.size() == 0 {
            // Zero-sized slots: capacity is bookkeeping only.
            self.capacity = new_capacity;
            return Ok(());
        }

        let raw = if self.is_allocated() {
            let old_layout = self.current_layout();
            // SAFETY: `self.ptr` was allocated by this buffer with
            // `old_layout`, and `new_layout` was validated above, so the new
            // size is non-zero and does not overflow `isize` when rounded up
            // to the (unchanged) alignment.
            unsafe { alloc::realloc(self.ptr.as_ptr(), old_layout, new_layout.size()) }
        } else {
            // SAFETY: `new_layout` has a non-zero size.
            unsafe { alloc::alloc(new_layout) }
        };

        // A null return leaves the old block untouched and still owned.
        let ptr = NonNull::new(raw).ok_or_else(|| self.alloc_failed(new_capacity))?;
        self.ptr = ptr;
        self.capacity = new_capacity;
        self.stats.record_realloc(new_capacity);
        Ok(())
    }

    /// Switch to slots of `layout`, sized for `requested` slots by `policy`.
    ///
    /// The new block is allocated before the old one is released, so on
    /// failure nothing changes. Old slot contents are discarded without being
    /// dropped. Counters carry over: the release of the old block and the
    /// allocation of the new one are both recorded.
    pub fn try_relayout(
        &mut self,
        layout: ElementLayout,
        policy: &GrowthPolicy,
        requested: usize,
    ) -> Result<(), ContainerError> {
        let mut fresh = RawBuf::new(layout);
        fresh.try_grow(policy, requested)?;
        self.release();
        let mut stats = self.stats.clone();
        stats.absorb(&fresh.stats);
        fresh.stats = stats;
        *self = fresh;
        Ok(())
    }

    /// Release the allocation and return to the empty state.
    ///
    /// Slot contents are not dropped. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.is_allocated() {
            let layout = self.current_layout();
            // SAFETY: the block is live and was allocated with `layout`.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
            self.stats.record_release();
        }
        self.ptr = self.layout.dangling();
        self.capacity = 0;
    }

    fn current_layout(&self) -> Layout {
        // SAFETY: this exact size/align pair passed `Layout::from_size_align`
        // when the current block was allocated.
        unsafe {
            Layout::from_size_align_unchecked(self.capacity * self.layout.size, self.layout.align)
        }
    }

    fn alloc_failed(&self, elements: usize) -> ContainerError {
        ContainerError::AllocationFailed {
            elements,
            element_size: self.layout.size,
        }
    }
}

impl Drop for RawBuf {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for RawBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBuf")
            .field("capacity", &self.capacity)
            .field("layout", &self.layout)
            .field("allocated", &self.is_allocated())
            .finish()
    }
}
