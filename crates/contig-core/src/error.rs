//! Error taxonomy shared by both container variants.

use std::error::Error;
use std::fmt;

/// Which caller-supplied element hook reported a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// The per-element deep-copy hook.
    Copy,
    /// The per-element deep-free hook.
    Free,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => write!(f, "deep-copy"),
            Self::Free => write!(f, "deep-free"),
        }
    }
}

/// Errors reported by container operations.
///
/// `Empty` and `IndexOutOfRange` are contract violations on the checked
/// API surface. `AllocationFailed` always leaves the container exactly as it
/// was before the call. `HookFailed` leaves the documented partial-progress
/// state of the batch operation that raised it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerError {
    /// The operation needs at least one live element.
    Empty {
        /// Name of the operation that was attempted.
        op: &'static str,
    },
    /// Checked access past the last live element.
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of live elements at the time of the call.
        len: usize,
    },
    /// The allocator could not satisfy a growth or fit request, or the
    /// requested byte size is not representable.
    AllocationFailed {
        /// Number of element slots requested.
        elements: usize,
        /// Size of one element slot in bytes.
        element_size: usize,
    },
    /// A caller-supplied element hook reported failure.
    HookFailed {
        /// Which hook failed.
        hook: HookKind,
        /// Index of the element the hook was invoked on.
        index: usize,
    },
    /// A raw element record did not match the container's element size.
    ElementSizeMismatch {
        /// The container's element size in bytes.
        expected: usize,
        /// Length of the slice that was supplied.
        actual: usize,
    },
    /// A growth policy was configured with unusable parameters.
    InvalidGrowthPolicy {
        /// The rejected growth factor.
        factor: usize,
        /// The rejected minimum request.
        floor: usize,
    },
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { op } => write!(f, "{op} called on an empty container"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::AllocationFailed {
                elements,
                element_size,
            } => {
                write!(
                    f,
                    "allocation failed: {elements} elements of {element_size} bytes"
                )
            }
            Self::HookFailed { hook, index } => {
                write!(f, "{hook} hook failed at element {index}")
            }
            Self::ElementSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "element size mismatch: expected {expected} bytes, got {actual}"
                )
            }
            Self::InvalidGrowthPolicy { factor, floor } => {
                write!(
                    f,
                    "invalid growth policy: factor {factor} (must be >= 2), floor {floor} (must be >= 1)"
                )
            }
        }
    }
}

impl Error for ContainerError {}
