//! Shared building blocks for the contig containers.
//!
//! This is the leaf crate with zero internal dependencies. It owns the
//! pieces both container variants are built from:
//!
//! ```text
//! DynArray<T> ─┐
//!              ├── RawBuf (one owning allocation, exact reallocation)
//! ErasedArray ─┘     ├── ElementLayout (size + align of one slot)
//!                    ├── GrowthPolicy  (how far ahead to allocate)
//!                    └── GrowthStats   (reallocation counters)
//! ```
//!
//! The raw buffer knows nothing about which slots are live; the containers
//! track their own length and are responsible for dropping or freeing
//! elements before shrinking the buffer underneath them.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod growth;
pub mod raw;
pub mod stats;

pub use error::{ContainerError, HookKind};
pub use growth::GrowthPolicy;
pub use raw::{ElementLayout, RawBuf};
pub use stats::GrowthStats;
