//! Per-buffer allocation counters.
//!
//! [`GrowthStats`] is updated by [`RawBuf`](crate::RawBuf) on every
//! successful reallocation or release, so callers can observe how often a
//! container actually touched the allocator.

/// Allocation activity recorded by a single buffer over its lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrowthStats {
    /// Number of successful allocations or reallocations (growth and fit).
    pub reallocations: u64,
    /// Number of times the backing allocation was released entirely.
    pub releases: u64,
    /// Largest capacity, in elements of the layout current at the time, the
    /// buffer has ever held.
    pub peak_capacity: usize,
}

impl GrowthStats {
    pub(crate) fn record_realloc(&mut self, new_capacity: usize) {
        self.reallocations += 1;
        self.peak_capacity = self.peak_capacity.max(new_capacity);
    }

    pub(crate) fn record_release(&mut self) {
        self.releases += 1;
    }

    pub(crate) fn absorb(&mut self, other: &GrowthStats) {
        self.reallocations += other.reallocations;
        self.releases += other.releases;
        self.peak_capacity = self.peak_capacity.max(other.peak_capacity);
    }
}
