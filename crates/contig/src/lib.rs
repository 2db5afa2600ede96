//! Contig: growable contiguous arrays with explicit growth and ownership.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the contig sub-crates. For most users, adding `contig` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::rc::Rc;
//! use contig::prelude::*;
//!
//! // Typed: value semantics, checked access.
//! let mut words: DynArray<&str> = ["alpha", "beta"].into_iter().collect();
//! words.push_back("gamma");
//! assert_eq!(words.at(2), Ok(&"gamma"));
//! assert!(words.at(3).is_err());
//!
//! // Type-erased: fixed-size records with pluggable hooks.
//! let mut records = ErasedArray::new(4).with_hooks(Rc::new(RawHooks));
//! records.push_back(&7u32.to_le_bytes()).unwrap();
//! let copy = records.try_clone().unwrap();
//! assert_eq!(copy.as_bytes(), records.as_bytes());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`base`] | `contig-core` | Growth policy, raw buffer, statistics, errors |
//! | [`vec`] | `contig-vec` | The typed `DynArray<T>` |
//! | [`erased`] | `contig-erased` | The type-erased `ErasedArray` and its hooks |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Growth policy, raw owning buffer and shared errors (`contig-core`).
///
/// Most users only need [`base::GrowthPolicy`] and [`base::ContainerError`],
/// which are also in the [`prelude`].
pub use contig_core as base;

/// The typed growable array (`contig-vec`).
pub use contig_vec as vec;

/// The type-erased record array and element hooks (`contig-erased`).
///
/// Implement [`erased::ElementHooks`] for records that own resources, or
/// build one from closures with [`erased::FnHooks`].
pub use contig_erased as erased;

/// Common imports for typical contig usage.
///
/// ```rust
/// use contig::prelude::*;
/// ```
pub mod prelude {
    // Shared
    pub use contig_core::{ContainerError, GrowthPolicy, GrowthStats, HookKind};

    // Typed
    pub use contig_vec::DynArray;

    // Type-erased
    pub use contig_erased::{ElementHooks, ErasedArray, FnHooks, RawHooks};
}
