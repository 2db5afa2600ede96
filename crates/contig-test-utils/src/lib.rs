//! Test fixtures for contig development.
//!
//! Provides [`Tracked`] values whose clones and drops are counted by a
//! shared [`DropLedger`], instrumented [`CountingHooks`], and a
//! [`SlotHeap`] with [`HeapHooks`] for exercising type-erased records that
//! own external resources.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{CountingHooks, DropLedger, HeapHooks, SlotHeap, Tracked, HANDLE_SIZE};

/// A 128-character sentence used by the push/pop scenario tests.
pub const SAMPLE_SENTENCE: &str = "Hello, World! This is one heck of a long string for testing purposes. If it gets all of this correct then that would be great!!!";
