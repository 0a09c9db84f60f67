//! Partial-lane byte masks.
//!
//! A sliding 16-byte window over a 32-byte table: 16 zero bytes followed by
//! 16 `0xFF` bytes. The window starting at offset `16 - n` holds `n` zeros
//! then `16 - n` ones, which is the mask boundary-blend code needs to keep
//! only the tail of a vector.

use crate::dispatch::simd_dispatch;
use crate::vector::V128;

/// Backing table for [`mask_high_bytes`]. Every window start in `0..=16`
/// is in bounds.
pub static HIGH_BYTES_MASK_TABLE: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// The window of [`HIGH_BYTES_MASK_TABLE`] with `n` leading zero bytes.
#[inline(always)]
pub(crate) fn mask_window(n: usize) -> &'static [u8; 16] {
    debug_assert!(n <= 16, "mask zero count {n} outside 0..=16");
    let start = 16 - n;
    // The slice is exactly 16 bytes, so the conversion cannot fail.
    <&[u8; 16]>::try_from(&HIGH_BYTES_MASK_TABLE[start..start + 16]).unwrap()
}

/// Mask with the first `n` bytes `0x00` and the remaining `16 - n` bytes `0xFF`.
///
/// `n` must be in `0..=16`.
#[inline]
pub fn mask_high_bytes(n: usize) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(token, simd::mask_high_bytes(token, n));
        mask_high_bytes_scalar(n))
}

/// Scalar [`mask_high_bytes`].
#[inline]
pub fn mask_high_bytes_scalar(n: usize) -> V128 {
    V128::from_bytes(*mask_window(n))
}
