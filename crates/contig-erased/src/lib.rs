//! Type-erased growable array of fixed-size records.
//!
//! [`ErasedArray`] knows its elements only by byte size. Records that own
//! external resources get correct copy and teardown through an
//! [`ElementHooks`] implementation installed per instance; the default
//! [`RawHooks`] copies bytes and frees nothing.
//!
//! Every operation that can allocate returns `Result`: allocator
//! exhaustion is a recoverable [`ContainerError::AllocationFailed`] that
//! leaves the array unchanged.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod erased;
pub mod hooks;

pub use contig_core::{ContainerError, GrowthPolicy, GrowthStats, HookKind};
pub use erased::ErasedArray;
pub use hooks::{ElementHooks, FnHooks, RawHooks};
