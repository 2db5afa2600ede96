//! Growth policy: how much to allocate when a request outgrows capacity.

use crate::error::ContainerError;

/// Decides the new capacity when a request no longer fits.
///
/// A request for `n` slots against a smaller capacity allocates
/// `max(n, floor) * factor` slots. The floor guarantees forward progress from
/// an empty buffer; a factor of at least 2 makes the total relocation work
/// across `N` appends a geometric series bounded by `O(N)`.
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    factor: usize,
    floor: usize,
}

impl GrowthPolicy {
    /// Default growth factor: doubling.
    pub const DEFAULT_FACTOR: usize = 2;

    /// Default minimum request size used when computing growth.
    pub const DEFAULT_FLOOR: usize = 1;

    /// The default doubling policy.
    pub const DOUBLING: Self = Self {
        factor: Self::DEFAULT_FACTOR,
        floor: Self::DEFAULT_FLOOR,
    };

    /// Create a policy with a custom factor and floor.
    ///
    /// Returns [`ContainerError::InvalidGrowthPolicy`] if `factor < 2` (growth
    /// would no longer be amortized O(1)) or `floor == 0`.
    pub fn new(factor: usize, floor: usize) -> Result<Self, ContainerError> {
        if factor < 2 || floor == 0 {
            return Err(ContainerError::InvalidGrowthPolicy { factor, floor });
        }
        Ok(Self { factor, floor })
    }

    /// The multiplier applied to a request that outgrows capacity.
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// The minimum request size growth is computed from.
    pub fn floor(&self) -> usize {
        self.floor
    }

    /// Capacity to allocate for `requested` slots given `capacity` slots.
    ///
    /// Returns `None` when the current capacity already suffices. When the
    /// multiplication would overflow, falls back to exactly `requested` so
    /// that the allocator, not the policy, decides whether it can be served.
    pub fn target_capacity(&self, capacity: usize, requested: usize) -> Option<usize> {
        if requested <= capacity {
            return None;
        }
        let base = requested.max(self.floor);
        Some(base.checked_mul(self.factor).unwrap_or(requested))
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::DOUBLING
    }
}
