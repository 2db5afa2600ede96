//! Integration test: character-by-character push/pop of a sample sentence.
//!
//! Pushes each character of a 128-character sentence one at a time,
//! checking the length advances by exactly one each time, exercises copy,
//! fit and equality on the result, then pops everything and checks the
//! reversed output reproduces the sentence.

use contig_test_utils::SAMPLE_SENTENCE;
use contig_vec::DynArray;

fn pushed_sentence() -> DynArray<char> {
    let mut chars = DynArray::new();
    for (i, c) in SAMPLE_SENTENCE.chars().enumerate() {
        assert_eq!(chars.len(), i);
        chars.push_back(c);
        assert_eq!(chars.len(), i + 1);
    }
    chars
}

#[test]
fn push_then_pop_reverses_sentence() {
    let mut chars = pushed_sentence();
    assert_eq!(chars.len(), 128);

    let mut popped = String::new();
    while !chars.is_empty() {
        popped.push(chars.pop_back().unwrap());
    }
    let restored: String = popped.chars().rev().collect();
    assert_eq!(restored, SAMPLE_SENTENCE);
    assert!(chars.pop_back().is_err());
}

#[test]
fn terminator_round_trip_after_fit() {
    let mut chars = pushed_sentence();
    chars.push_back('\0');
    let copy = chars.clone();
    assert_eq!(copy, chars);

    chars.fit();
    assert_eq!(chars.capacity(), chars.len());
    assert_eq!(chars.pop_back(), Ok('\0'));
    assert_eq!(chars.len(), 128);
    assert_eq!(copy.len(), 129);
}

#[test]
fn copies_fit_to_the_same_shape() {
    let mut chars = pushed_sentence();
    let mut dest = chars.clone();
    assert_eq!(dest.len(), chars.len());
    assert_ne!(dest.as_ptr(), chars.as_ptr());

    chars.fit();
    dest.fit();
    assert_eq!(dest.capacity(), chars.capacity());
    assert_eq!(dest.capacity(), dest.len());
    assert_eq!(dest, chars);

    let mut empty = DynArray::new();
    assert_eq!(&empty + &chars, dest);
    empty += &chars;
    assert_eq!(empty, chars);
}

#[test]
fn iteration_matches_source_positions() {
    let chars = pushed_sentence();
    for (index, (c, expected)) in chars.iter().zip(SAMPLE_SENTENCE.chars()).enumerate() {
        assert_eq!(*c, expected, "mismatch at {index}");
    }
}

#[test]
fn halves_concatenate_to_whole() {
    let chars = pushed_sentence();
    let mid = chars.len() / 2;
    let mut first = DynArray::new();
    let mut second = DynArray::new();
    for i in 0..mid {
        first.push_back(chars[i]);
    }
    for i in mid..chars.len() {
        second.push_back(chars[i]);
    }
    assert_eq!(&first + &second, chars);
}

#[test]
fn growth_is_amortized() {
    let chars = pushed_sentence();
    // Request-doubling from one element: capacities 2, 6, 14, 30, 62, 126, 254.
    assert_eq!(chars.stats().reallocations, 7);
    assert_eq!(chars.capacity(), 254);
}
