//! Status type shared by every fallible operation.
//!
//! Only backend failures are reported here. Contract violations (ids out of
//! range, mismatched array lengths) panic, and logical non-events such as
//! inserting an edge that already exists are ordinary successful results.

use core::fmt;

/// A backend failure reported by a scan, conversion, or batch operation.
///
/// Errors are never retried or recovered internally; they bubble up unchanged
/// from the scan primitive through the dynamic graph and format conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Scratch, slab, or export storage could not be reserved.
    Allocation {
        /// Size of the request that failed, in bytes.
        bytes: usize,
    },
    /// The execution backend could not run the submitted work.
    Execution(String),
}

impl GraphError {
    /// Builds an allocation failure for `len` elements of `T`.
    pub(crate) fn allocation<T>(len: usize) -> Self {
        Self::Allocation {
            bytes: len.saturating_mul(core::mem::size_of::<T>()),
        }
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { bytes } => write!(f, "failed to allocate {bytes} bytes"),
            Self::Execution(reason) => write!(f, "execution backend failure: {reason}"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Result alias used throughout the crate.
pub type GraphResult<T> = Result<T, GraphError>;
