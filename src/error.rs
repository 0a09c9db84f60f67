//! Error types for row buffer access.

use thiserror::Error;

/// Errors reported by [`PixelRow`](crate::PixelRow) construction and loads.
///
/// The vector primitives themselves never fail; these cover caller-supplied
/// row geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RowError {
    /// The logical length is larger than the buffer.
    #[error("Logical length {logical} exceeds physical length {physical}")]
    LogicalExceedsPhysical {
        /// Requested logical length.
        logical: usize,
        /// Length of the backing buffer.
        physical: usize,
    },

    /// A fixed-width access would leave the physical buffer.
    #[error("Access of {width} bytes at offset {offset} exceeds physical length {physical}")]
    OutOfBounds {
        /// Start of the access.
        offset: usize,
        /// Number of bytes the access reads.
        width: usize,
        /// Length of the backing buffer.
        physical: usize,
    },

    /// An aligned access at an address that is not a multiple of 16.
    #[error("Aligned access at offset {offset} is not 16-byte aligned")]
    Misaligned {
        /// Offset into the row.
        offset: usize,
    },
}
