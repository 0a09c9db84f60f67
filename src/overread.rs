//! Overread masking and sanitizer-safe loads.
//!
//! Kernels read whole vectors even when fewer bytes of a row are meaningful.
//! The bytes past the logical end are never consumed, but MemorySanitizer
//! still reports them as uninitialized reads. With the `msan` feature every
//! `*_msan` load zeroes those bytes; without it masking is the identity and
//! compiles to nothing.
//!
//! The policy is a type ([`OverreadPolicy`]) rather than a `cfg` inside each
//! function, so both behaviors are available to tests in every build.
//! [`ActiveOverread`] is the one the feature selects.

use crate::dispatch::simd_dispatch;
use crate::mask::mask_high_bytes_scalar;
use crate::memory::{
    load_aligned16_scalar, load_hi8_scalar, load_lo8_scalar, load_unaligned16_scalar,
};
use crate::vector::V128;

/// How bytes read past a buffer's logical end are treated.
pub trait OverreadPolicy {
    /// Whether overread bytes are zeroed.
    const ZEROES_OVERREAD: bool;

    /// Apply the policy to `v`, whose last `over_read` bytes are overread.
    ///
    /// `over_read <= 0` is always the identity; values above 16 clamp to 16.
    #[inline]
    fn mask(v: V128, over_read: isize) -> V128 {
        if !Self::ZEROES_OVERREAD || over_read <= 0 {
            return v;
        }
        let keep = 16 - over_read.min(16) as usize;
        mask_high_bytes_scalar(keep).and_not(v)
    }
}

/// Zero overread bytes. Selected by the `msan` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroOverread;

impl OverreadPolicy for ZeroOverread {
    const ZEROES_OVERREAD: bool = true;
}

/// Leave overread bytes as loaded. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOverread;

impl OverreadPolicy for KeepOverread {
    const ZEROES_OVERREAD: bool = false;
}

/// The policy this build uses.
#[cfg(feature = "msan")]
pub type ActiveOverread = ZeroOverread;

/// The policy this build uses.
#[cfg(not(feature = "msan"))]
pub type ActiveOverread = KeepOverread;

/// Whether the `*_msan` loads mask anything in this build.
pub const MASKING_ENABLED: bool = <ActiveOverread as OverreadPolicy>::ZEROES_OVERREAD;

/// Zero the last `over_read` bytes of `v` under policy `P`.
#[inline]
pub fn mask_overreads_with<P: OverreadPolicy>(v: V128, over_read: isize) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::mask_overreads_with::<P>(token, simd::from_v128(token, v), over_read),
        );
        mask_overreads_with_scalar::<P>(v, over_read))
}

/// Zero the last `over_read` bytes of `v` when the `msan` feature is on.
#[inline]
pub fn mask_overreads(v: V128, over_read: isize) -> V128 {
    mask_overreads_with::<ActiveOverread>(v, over_read)
}

/// Load 8 bytes into the low half, masking overread bytes under `P`.
///
/// The high half never holds data and always counts as overread, so the
/// mask covers `over_read + 8` bytes. `over_read` counts back from the end
/// of the 8 loaded bytes.
#[inline]
pub fn load_lo8_msan_with<P: OverreadPolicy>(src: &[u8; 8], over_read: isize) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::load_lo8_msan_with::<P>(token, src, over_read),
        );
        load_lo8_msan_with_scalar::<P>(src, over_read))
}

/// Load 8 bytes into the high half of `v`, masking the last `over_read`
/// bytes of the result under `P`.
#[inline]
pub fn load_hi8_msan_with<P: OverreadPolicy>(v: V128, src: &[u8; 8], over_read: isize) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::load_hi8_msan_with::<P>(token, simd::from_v128(token, v), src, over_read),
        );
        load_hi8_msan_with_scalar::<P>(v, src, over_read))
}

/// Aligned 16-byte load with the last `over_read` bytes masked under `P`.
#[inline]
pub fn load_aligned16_msan_with<P: OverreadPolicy>(src: &[u8; 16], over_read: isize) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::load_aligned16_msan_with::<P>(token, src, over_read),
        );
        load_aligned16_msan_with_scalar::<P>(src, over_read))
}

/// Unaligned 16-byte load with the last `over_read` bytes masked under `P`.
#[inline]
pub fn load_unaligned16_msan_with<P: OverreadPolicy>(src: &[u8; 16], over_read: isize) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::load_unaligned16_msan_with::<P>(token, src, over_read),
        );
        load_unaligned16_msan_with_scalar::<P>(src, over_read))
}

/// [`load_lo8_msan_with`] under [`ActiveOverread`].
#[inline]
pub fn load_lo8_msan(src: &[u8; 8], over_read: isize) -> V128 {
    load_lo8_msan_with::<ActiveOverread>(src, over_read)
}

/// [`load_hi8_msan_with`] under [`ActiveOverread`].
#[inline]
pub fn load_hi8_msan(v: V128, src: &[u8; 8], over_read: isize) -> V128 {
    load_hi8_msan_with::<ActiveOverread>(v, src, over_read)
}

/// [`load_aligned16_msan_with`] under [`ActiveOverread`].
#[inline]
pub fn load_aligned16_msan(src: &[u8; 16], over_read: isize) -> V128 {
    load_aligned16_msan_with::<ActiveOverread>(src, over_read)
}

/// [`load_unaligned16_msan_with`] under [`ActiveOverread`].
#[inline]
pub fn load_unaligned16_msan(src: &[u8; 16], over_read: isize) -> V128 {
    load_unaligned16_msan_with::<ActiveOverread>(src, over_read)
}

// =============================================================================
// Scalar fallbacks
// =============================================================================

/// Scalar [`mask_overreads_with`].
#[inline]
pub fn mask_overreads_with_scalar<P: OverreadPolicy>(v: V128, over_read: isize) -> V128 {
    P::mask(v, over_read)
}

/// Scalar [`load_lo8_msan_with`].
#[inline]
pub fn load_lo8_msan_with_scalar<P: OverreadPolicy>(src: &[u8; 8], over_read: isize) -> V128 {
    P::mask(load_lo8_scalar(src), over_read + 8)
}

/// Scalar [`load_hi8_msan_with`].
#[inline]
pub fn load_hi8_msan_with_scalar<P: OverreadPolicy>(
    v: V128,
    src: &[u8; 8],
    over_read: isize,
) -> V128 {
    P::mask(load_hi8_scalar(v, src), over_read)
}

/// Scalar [`load_aligned16_msan_with`].
#[inline]
pub fn load_aligned16_msan_with_scalar<P: OverreadPolicy>(
    src: &[u8; 16],
    over_read: isize,
) -> V128 {
    P::mask(load_aligned16_scalar(src), over_read)
}

/// Scalar [`load_unaligned16_msan_with`].
#[inline]
pub fn load_unaligned16_msan_with_scalar<P: OverreadPolicy>(
    src: &[u8; 16],
    over_read: isize,
) -> V128 {
    P::mask(load_unaligned16_scalar(src), over_read)
}

/// Scalar [`load_lo8_msan`].
#[inline]
pub fn load_lo8_msan_scalar(src: &[u8; 8], over_read: isize) -> V128 {
    load_lo8_msan_with_scalar::<ActiveOverread>(src, over_read)
}

/// Scalar [`load_hi8_msan`].
#[inline]
pub fn load_hi8_msan_scalar(v: V128, src: &[u8; 8], over_read: isize) -> V128 {
    load_hi8_msan_with_scalar::<ActiveOverread>(v, src, over_read)
}

/// Scalar [`load_aligned16_msan`].
#[inline]
pub fn load_aligned16_msan_scalar(src: &[u8; 16], over_read: isize) -> V128 {
    load_aligned16_msan_with_scalar::<ActiveOverread>(src, over_read)
}

/// Scalar [`load_unaligned16_msan`].
#[inline]
pub fn load_unaligned16_msan_scalar(src: &[u8; 16], over_read: isize) -> V128 {
    load_unaligned16_msan_with_scalar::<ActiveOverread>(src, over_read)
}
