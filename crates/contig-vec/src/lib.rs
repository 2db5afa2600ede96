//! Typed growable contiguous array.
//!
//! [`DynArray<T>`] is a value-semantic container over a single owning
//! allocation:
//!
//! - **Growth:** `reserve(n)` allocates `max(n, 1) * 2` slots when `n`
//!   exceeds capacity, giving amortized O(1) `push_back`.
//! - **Copy:** `Clone` deep-copies into a tightly-fitted allocation.
//! - **Move:** Rust moves and [`DynArray::take`] transfer the allocation in
//!   O(1); the source is left empty with no allocation.
//! - **Failure:** checked accessors and `pop_back` return
//!   [`ContainerError`] rather than a sentinel value.
//!
//! ```
//! use contig_vec::DynArray;
//!
//! let mut a = DynArray::new();
//! a.push_back('h');
//! a.push_back('i');
//! let b = &a + &a;
//! assert_eq!(b.len(), 4);
//! assert_eq!(a.pop_back(), Ok('i'));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod array;
mod ops;

pub use array::DynArray;
pub use contig_core::{ContainerError, GrowthPolicy, GrowthStats};
