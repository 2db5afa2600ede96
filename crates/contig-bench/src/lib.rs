//! Benchmark inputs for the contig container crates.
//!
//! Inputs are generated deterministically so runs are comparable:
//!
//! - [`input_values`]: `n` pseudo-random `u64` values derived from a seed
//! - [`filled_array`]: a typed array built by repeated `push_back`
//! - [`filled_records`]: a type-erased array of fixed-size records

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use contig_erased::ErasedArray;
use contig_vec::DynArray;

/// Element counts every benchmark is run at.
pub const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// `n` deterministic values: a linear congruential walk from `seed`.
pub fn input_values(n: usize, seed: u64) -> Vec<u64> {
    (0..n as u64)
        .map(|i| {
            seed.wrapping_mul(6364136223846793005)
                .wrapping_add(i.wrapping_mul(1442695040888963407))
        })
        .collect()
}

/// A typed array holding [`input_values`]`(n, seed)`, pushed one at a time.
pub fn filled_array(n: usize, seed: u64) -> DynArray<u64> {
    let mut arr = DynArray::new();
    for v in input_values(n, seed) {
        arr.push_back(v);
    }
    arr
}

/// A type-erased array of `n` little-endian `u64` records.
///
/// # Panics
///
/// Panics if the allocation fails.
pub fn filled_records(n: usize, seed: u64) -> ErasedArray {
    let mut arr = ErasedArray::new(std::mem::size_of::<u64>());
    for v in input_values(n, seed) {
        if let Err(e) = arr.push_back(&v.to_le_bytes()) {
            panic!("benchmark input allocation failed: {e}");
        }
    }
    arr
}
