//! Vector memory access: 2, 4, 8 and 16-byte loads and stores.
//!
//! Loaded bytes land in the low-order bytes of the vector, lane 0 upward.
//! Loads narrower than 16 bytes zero the rest of the vector, except where a
//! function merges into an existing vector ([`load2_lane`], [`load_hi8`]).
//! Stores write exactly the low `N` bytes and leave the rest of memory alone.
//!
//! Source and destination are fixed-size array references, so the byte
//! count of every access is part of its type. Callers slice rows with
//! `row[x..][..N].try_into()` as the kernels do.

use crate::dispatch::simd_dispatch;
use crate::vector::V128;

/// Load 2 bytes into the low 16-bit lane.
#[inline]
pub fn load2(src: &[u8; 2]) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(token, simd::load2(token, src));
        load2_scalar(src))
}

/// Load 2 bytes from each of two rows into 16-bit lanes 0 and 1.
#[inline]
pub fn load2x2(src1: &[u8; 2], src2: &[u8; 2]) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(token, simd::load2x2(token, src1, src2));
        load2x2_scalar(src1, src2))
}

/// Overwrite 16-bit lane `LANE` (in `0..8`) of `v` with 2 bytes from `src`.
///
/// All other lanes are returned unchanged.
#[inline]
pub fn load2_lane<const LANE: i32>(v: V128, src: &[u8; 2]) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::load2_lane::<LANE>(token, simd::from_v128(token, v), src),
        );
        load2_lane_scalar::<LANE>(v, src))
}

/// Load 4 bytes into the low 32-bit lane.
#[inline]
pub fn load4(src: &[u8; 4]) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(token, simd::load4(token, src));
        load4_scalar(src))
}

/// Load 4 bytes from each of two rows into 32-bit lanes 0 and 1.
#[inline]
pub fn load4x2(src1: &[u8; 4], src2: &[u8; 4]) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(token, simd::load4x2(token, src1, src2));
        load4x2_scalar(src1, src2))
}

/// Load 8 bytes into the low half.
#[inline]
pub fn load_lo8(src: &[u8; 8]) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(token, simd::load_lo8(token, src));
        load_lo8_scalar(src))
}

/// Load 8 bytes into the high half of `v`; the low half of `v` is kept.
#[inline]
pub fn load_hi8(v: V128, src: &[u8; 8]) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::load_hi8(token, simd::from_v128(token, v), src),
        );
        load_hi8_scalar(v, src))
}

/// Load 16 bytes from any address.
#[inline]
pub fn load_unaligned16(src: &[u8; 16]) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(token, simd::load_unaligned16(token, src));
        load_unaligned16_scalar(src))
}

/// Load 16 bytes from a 16-byte aligned address.
///
/// Alignment is checked in debug builds only.
#[inline]
pub fn load_aligned16(src: &[u8; 16]) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(token, simd::load_aligned16(token, src));
        load_aligned16_scalar(src))
}

/// Store the low 2 bytes of `v`.
#[inline]
pub fn store2(dst: &mut [u8; 2], v: V128) {
    simd_dispatch!(token, simd => simd::store2(token, dst, simd::from_v128(token, v));
        store2_scalar(dst, v))
}

/// Store the low 4 bytes of `v`.
#[inline]
pub fn store4(dst: &mut [u8; 4], v: V128) {
    simd_dispatch!(token, simd => simd::store4(token, dst, simd::from_v128(token, v));
        store4_scalar(dst, v))
}

/// Store the low 8 bytes of `v`.
#[inline]
pub fn store_lo8(dst: &mut [u8; 8], v: V128) {
    simd_dispatch!(token, simd => simd::store_lo8(token, dst, simd::from_v128(token, v));
        store_lo8_scalar(dst, v))
}

/// Store the high 8 bytes of `v`.
#[inline]
pub fn store_hi8(dst: &mut [u8; 8], v: V128) {
    simd_dispatch!(token, simd => simd::store_hi8(token, dst, simd::from_v128(token, v));
        store_hi8_scalar(dst, v))
}

/// Store all 16 bytes of `v` to any address.
#[inline]
pub fn store_unaligned16(dst: &mut [u8; 16], v: V128) {
    simd_dispatch!(token, simd => simd::store_unaligned16(token, dst, simd::from_v128(token, v));
        store_unaligned16_scalar(dst, v))
}

/// Store all 16 bytes of `v` to a 16-byte aligned address.
///
/// Alignment is checked in debug builds only.
#[inline]
pub fn store_aligned16(dst: &mut [u8; 16], v: V128) {
    simd_dispatch!(token, simd => simd::store_aligned16(token, dst, simd::from_v128(token, v));
        store_aligned16_scalar(dst, v))
}

// =============================================================================
// Scalar fallbacks
// =============================================================================

#[inline(always)]
fn assert_aligned16(ptr: *const u8, what: &str) {
    debug_assert!(ptr.addr() % 16 == 0, "{what}: {ptr:p} is not 16-byte aligned");
}

/// Scalar [`load2`].
#[inline]
pub fn load2_scalar(src: &[u8; 2]) -> V128 {
    let mut out = V128::ZERO;
    out.as_bytes_mut()[..2].copy_from_slice(src);
    out
}

/// Scalar [`load2x2`].
#[inline]
pub fn load2x2_scalar(src1: &[u8; 2], src2: &[u8; 2]) -> V128 {
    let mut out = V128::ZERO;
    let bytes = out.as_bytes_mut();
    bytes[..2].copy_from_slice(src1);
    bytes[2..4].copy_from_slice(src2);
    out
}

/// Scalar [`load2_lane`].
#[inline]
pub fn load2_lane_scalar<const LANE: i32>(v: V128, src: &[u8; 2]) -> V128 {
    const { assert!(LANE >= 0 && LANE < 8, "16-bit lane index out of range") };
    let mut out = v;
    let at = LANE as usize * 2;
    out.as_bytes_mut()[at..at + 2].copy_from_slice(src);
    out
}

/// Scalar [`load4`].
#[inline]
pub fn load4_scalar(src: &[u8; 4]) -> V128 {
    let mut out = V128::ZERO;
    out.as_bytes_mut()[..4].copy_from_slice(src);
    out
}

/// Scalar [`load4x2`].
#[inline]
pub fn load4x2_scalar(src1: &[u8; 4], src2: &[u8; 4]) -> V128 {
    let mut out = V128::ZERO;
    let bytes = out.as_bytes_mut();
    bytes[..4].copy_from_slice(src1);
    bytes[4..8].copy_from_slice(src2);
    out
}

/// Scalar [`load_lo8`].
#[inline]
pub fn load_lo8_scalar(src: &[u8; 8]) -> V128 {
    let mut out = V128::ZERO;
    out.as_bytes_mut()[..8].copy_from_slice(src);
    out
}

/// Scalar [`load_hi8`].
#[inline]
pub fn load_hi8_scalar(v: V128, src: &[u8; 8]) -> V128 {
    let mut out = v;
    out.as_bytes_mut()[8..].copy_from_slice(src);
    out
}

/// Scalar [`load_unaligned16`].
#[inline]
pub fn load_unaligned16_scalar(src: &[u8; 16]) -> V128 {
    V128::from_bytes(*src)
}

/// Scalar [`load_aligned16`].
#[inline]
pub fn load_aligned16_scalar(src: &[u8; 16]) -> V128 {
    assert_aligned16(src.as_ptr(), "load_aligned16");
    V128::from_bytes(*src)
}

/// Scalar [`store2`].
#[inline]
pub fn store2_scalar(dst: &mut [u8; 2], v: V128) {
    dst.copy_from_slice(&v.as_bytes()[..2]);
}

/// Scalar [`store4`].
#[inline]
pub fn store4_scalar(dst: &mut [u8; 4], v: V128) {
    dst.copy_from_slice(&v.as_bytes()[..4]);
}

/// Scalar [`store_lo8`].
#[inline]
pub fn store_lo8_scalar(dst: &mut [u8; 8], v: V128) {
    *dst = v.lo_half();
}

/// Scalar [`store_hi8`].
#[inline]
pub fn store_hi8_scalar(dst: &mut [u8; 8], v: V128) {
    *dst = v.hi_half();
}

/// Scalar [`store_unaligned16`].
#[inline]
pub fn store_unaligned16_scalar(dst: &mut [u8; 16], v: V128) {
    *dst = v.to_bytes();
}

/// Scalar [`store_aligned16`].
#[inline]
pub fn store_aligned16_scalar(dst: &mut [u8; 16], v: V128) {
    assert_aligned16(dst.as_ptr(), "store_aligned16");
    *dst = v.to_bytes();
}
