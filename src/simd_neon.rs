//! AArch64 NEON backend over raw `uint8x16_t` registers.
//!
//! Function names and argument order match the SSE backend so the
//! dispatching layer can call either through one expression. Wider lanes are
//! reinterpreted in place; every function takes and returns `uint8x16_t`.

use archmage::{NeonToken, arcane};
use core::arch::aarch64::*;
use safe_unaligned_simd::aarch64 as simd_mem;

use crate::mask::mask_window;
use crate::overread::{ActiveOverread, OverreadPolicy};
use crate::vector::V128;

// =============================================================================
// V128 bridge
// =============================================================================

/// Spill a register into a [`V128`].
#[arcane]
#[inline(always)]
pub fn to_v128(_token: NeonToken, v: uint8x16_t) -> V128 {
    let mut out = V128::ZERO;
    simd_mem::vst1q_u8(out.as_bytes_mut(), v);
    out
}

/// Load a [`V128`] into a register.
#[arcane]
#[inline(always)]
pub fn from_v128(_token: NeonToken, v: V128) -> uint8x16_t {
    simd_mem::vld1q_u8(v.as_bytes())
}

// =============================================================================
// Loads
// =============================================================================

/// Load 2 bytes into lane 0, zero-extended.
#[arcane]
#[inline(always)]
pub fn load2(_token: NeonToken, src: &[u8; 2]) -> uint8x16_t {
    let v = vsetq_lane_u16::<0>(u16::from_le_bytes(*src), vdupq_n_u16(0));
    vreinterpretq_u8_u16(v)
}

/// Load 2 bytes from each of two rows into 16-bit lanes 0 and 1.
#[arcane]
#[inline(always)]
pub fn load2x2(_token: NeonToken, src1: &[u8; 2], src2: &[u8; 2]) -> uint8x16_t {
    let v = vsetq_lane_u16::<0>(u16::from_le_bytes(*src1), vdupq_n_u16(0));
    let v = vsetq_lane_u16::<1>(u16::from_le_bytes(*src2), v);
    vreinterpretq_u8_u16(v)
}

/// Overwrite 16-bit lane `LANE` of `v` with 2 bytes from `src`.
#[arcane]
#[inline(always)]
pub fn load2_lane<const LANE: i32>(_token: NeonToken, v: uint8x16_t, src: &[u8; 2]) -> uint8x16_t {
    const { assert!(LANE >= 0 && LANE < 8, "16-bit lane index out of range") };
    let v = vsetq_lane_u16::<LANE>(u16::from_le_bytes(*src), vreinterpretq_u16_u8(v));
    vreinterpretq_u8_u16(v)
}

/// Load 4 bytes into lane 0, zero-extended.
#[arcane]
#[inline(always)]
pub fn load4(_token: NeonToken, src: &[u8; 4]) -> uint8x16_t {
    let v = vsetq_lane_u32::<0>(u32::from_le_bytes(*src), vdupq_n_u32(0));
    vreinterpretq_u8_u32(v)
}

/// Load 4 bytes from each of two rows into 32-bit lanes 0 and 1.
#[arcane]
#[inline(always)]
pub fn load4x2(_token: NeonToken, src1: &[u8; 4], src2: &[u8; 4]) -> uint8x16_t {
    let v = vsetq_lane_u32::<0>(u32::from_le_bytes(*src1), vdupq_n_u32(0));
    let v = vsetq_lane_u32::<1>(u32::from_le_bytes(*src2), v);
    vreinterpretq_u8_u32(v)
}

/// Load 8 bytes into the low half, zeroing the high half.
#[arcane]
#[inline(always)]
pub fn load_lo8(_token: NeonToken, src: &[u8; 8]) -> uint8x16_t {
    vcombine_u8(simd_mem::vld1_u8(src), vdup_n_u8(0))
}

/// Load 8 bytes into the high half of `v`, keeping its low half.
#[arcane]
#[inline(always)]
pub fn load_hi8(_token: NeonToken, v: uint8x16_t, src: &[u8; 8]) -> uint8x16_t {
    vcombine_u8(vget_low_u8(v), simd_mem::vld1_u8(src))
}

/// Load 16 bytes from any address.
#[arcane]
#[inline(always)]
pub fn load_unaligned16(_token: NeonToken, src: &[u8; 16]) -> uint8x16_t {
    simd_mem::vld1q_u8(src)
}

/// Load 16 bytes from a 16-byte aligned address.
#[arcane]
#[inline(always)]
pub fn load_aligned16(_token: NeonToken, src: &[u8; 16]) -> uint8x16_t {
    debug_assert!(
        src.as_ptr().addr() % 16 == 0,
        "load_aligned16: {:p} is not 16-byte aligned",
        src.as_ptr()
    );
    simd_mem::vld1q_u8(src)
}

// =============================================================================
// Stores
// =============================================================================

/// Store the low 2 bytes.
#[arcane]
#[inline(always)]
pub fn store2(_token: NeonToken, dst: &mut [u8; 2], v: uint8x16_t) {
    *dst = vgetq_lane_u16::<0>(vreinterpretq_u16_u8(v)).to_le_bytes();
}

/// Store the low 4 bytes.
#[arcane]
#[inline(always)]
pub fn store4(_token: NeonToken, dst: &mut [u8; 4], v: uint8x16_t) {
    *dst = vgetq_lane_u32::<0>(vreinterpretq_u32_u8(v)).to_le_bytes();
}

/// Store the low 8 bytes.
#[arcane]
#[inline(always)]
pub fn store_lo8(_token: NeonToken, dst: &mut [u8; 8], v: uint8x16_t) {
    simd_mem::vst1_u8(dst, vget_low_u8(v));
}

/// Store the high 8 bytes.
#[arcane]
#[inline(always)]
pub fn store_hi8(_token: NeonToken, dst: &mut [u8; 8], v: uint8x16_t) {
    simd_mem::vst1_u8(dst, vget_high_u8(v));
}

/// Store 16 bytes to any address.
#[arcane]
#[inline(always)]
pub fn store_unaligned16(_token: NeonToken, dst: &mut [u8; 16], v: uint8x16_t) {
    simd_mem::vst1q_u8(dst, v);
}

/// Store 16 bytes to a 16-byte aligned address.
#[arcane]
#[inline(always)]
pub fn store_aligned16(_token: NeonToken, dst: &mut [u8; 16], v: uint8x16_t) {
    debug_assert!(
        dst.as_ptr().addr() % 16 == 0,
        "store_aligned16: {:p} is not 16-byte aligned",
        dst.as_ptr()
    );
    simd_mem::vst1q_u8(dst, v);
}

// =============================================================================
// Masks and overread handling
// =============================================================================

/// First `n` bytes zero, remaining `16 - n` bytes `0xFF`.
#[arcane]
#[inline(always)]
pub fn mask_high_bytes(_token: NeonToken, n: usize) -> uint8x16_t {
    simd_mem::vld1q_u8(mask_window(n))
}

/// Zero the last `over_read` bytes of `v` if `P` masks overreads.
#[arcane]
#[inline(always)]
pub fn mask_overreads_with<P: OverreadPolicy>(
    token: NeonToken,
    v: uint8x16_t,
    over_read: isize,
) -> uint8x16_t {
    if !P::ZEROES_OVERREAD || over_read <= 0 {
        return v;
    }
    let keep = 16 - over_read.min(16) as usize;
    // bic(v, mask) = v & !mask
    vbicq_u8(v, mask_high_bytes(token, keep))
}

/// [`mask_overreads_with`] under the build's overread policy.
#[arcane]
#[inline(always)]
pub fn mask_overreads(token: NeonToken, v: uint8x16_t, over_read: isize) -> uint8x16_t {
    mask_overreads_with::<ActiveOverread>(token, v, over_read)
}

/// [`load_lo8`] whose high half, plus `over_read` trailing bytes of the low
/// half, count as overread under `P`.
#[arcane]
#[inline(always)]
pub fn load_lo8_msan_with<P: OverreadPolicy>(
    token: NeonToken,
    src: &[u8; 8],
    over_read: isize,
) -> uint8x16_t {
    mask_overreads_with::<P>(token, load_lo8(token, src), over_read + 8)
}

/// [`load_hi8`] with the last `over_read` bytes masked under `P`.
#[arcane]
#[inline(always)]
pub fn load_hi8_msan_with<P: OverreadPolicy>(
    token: NeonToken,
    v: uint8x16_t,
    src: &[u8; 8],
    over_read: isize,
) -> uint8x16_t {
    mask_overreads_with::<P>(token, load_hi8(token, v, src), over_read)
}

/// [`load_aligned16`] with the last `over_read` bytes masked under `P`.
#[arcane]
#[inline(always)]
pub fn load_aligned16_msan_with<P: OverreadPolicy>(
    token: NeonToken,
    src: &[u8; 16],
    over_read: isize,
) -> uint8x16_t {
    mask_overreads_with::<P>(token, load_aligned16(token, src), over_read)
}

/// [`load_unaligned16`] with the last `over_read` bytes masked under `P`.
#[arcane]
#[inline(always)]
pub fn load_unaligned16_msan_with<P: OverreadPolicy>(
    token: NeonToken,
    src: &[u8; 16],
    over_read: isize,
) -> uint8x16_t {
    mask_overreads_with::<P>(token, load_unaligned16(token, src), over_read)
}

/// [`load_lo8_msan_with`] under the build's overread policy.
#[arcane]
#[inline(always)]
pub fn load_lo8_msan(token: NeonToken, src: &[u8; 8], over_read: isize) -> uint8x16_t {
    load_lo8_msan_with::<ActiveOverread>(token, src, over_read)
}

/// [`load_hi8_msan_with`] under the build's overread policy.
#[arcane]
#[inline(always)]
pub fn load_hi8_msan(
    token: NeonToken,
    v: uint8x16_t,
    src: &[u8; 8],
    over_read: isize,
) -> uint8x16_t {
    load_hi8_msan_with::<ActiveOverread>(token, v, src, over_read)
}

/// [`load_aligned16_msan_with`] under the build's overread policy.
#[arcane]
#[inline(always)]
pub fn load_aligned16_msan(token: NeonToken, src: &[u8; 16], over_read: isize) -> uint8x16_t {
    load_aligned16_msan_with::<ActiveOverread>(token, src, over_read)
}

/// [`load_unaligned16_msan_with`] under the build's overread policy.
#[arcane]
#[inline(always)]
pub fn load_unaligned16_msan(token: NeonToken, src: &[u8; 16], over_read: isize) -> uint8x16_t {
    load_unaligned16_msan_with::<ActiveOverread>(token, src, over_read)
}

// =============================================================================
// Rounding shifts
// =============================================================================
//
// The rounding shift instructions (urshr/srshr/srshl) add the rounding bit in
// a wider internal precision, so none of these overflow at the lane maximum.

/// Unsigned 16-bit lanes, `BITS` in `1..=16`.
#[arcane]
#[inline(always)]
pub fn right_shift_with_rounding_u16<const BITS: i32>(
    _token: NeonToken,
    v: uint8x16_t,
) -> uint8x16_t {
    const { assert!(BITS >= 1 && BITS <= 16, "u16 rounding shift out of range") };
    vreinterpretq_u8_u16(vrshrq_n_u16::<BITS>(vreinterpretq_u16_u8(v)))
}

/// Signed 16-bit lanes, `BITS` in `1..=15`.
#[arcane]
#[inline(always)]
pub fn right_shift_with_rounding_s16<const BITS: i32>(
    _token: NeonToken,
    v: uint8x16_t,
) -> uint8x16_t {
    const { assert!(BITS >= 1 && BITS < 16, "s16 rounding shift out of range") };
    vreinterpretq_u8_s16(vrshrq_n_s16::<BITS>(vreinterpretq_s16_u8(v)))
}

/// Unsigned 32-bit lanes, `BITS` in `1..=32`.
#[arcane]
#[inline(always)]
pub fn right_shift_with_rounding_u32<const BITS: i32>(
    _token: NeonToken,
    v: uint8x16_t,
) -> uint8x16_t {
    const { assert!(BITS >= 1 && BITS <= 32, "u32 rounding shift out of range") };
    vreinterpretq_u8_u32(vrshrq_n_u32::<BITS>(vreinterpretq_u32_u8(v)))
}

/// Signed 32-bit lanes, `BITS` in `1..=31`.
#[arcane]
#[inline(always)]
pub fn right_shift_with_rounding_s32<const BITS: i32>(
    _token: NeonToken,
    v: uint8x16_t,
) -> uint8x16_t {
    const { assert!(BITS >= 1 && BITS < 32, "s32 rounding shift out of range") };
    vreinterpretq_u8_s32(vrshrq_n_s32::<BITS>(vreinterpretq_s32_u8(v)))
}

/// Signed 32-bit lanes with a runtime shift, `bits` in `1..=31`.
///
/// A negative left-shift count in a vector register is a rounding right shift.
#[arcane]
#[inline(always)]
pub fn variable_right_shift_with_rounding_s32(
    _token: NeonToken,
    v: uint8x16_t,
    bits: i32,
) -> uint8x16_t {
    debug_assert!((1..32).contains(&bits), "s32 rounding shift {bits} out of range");
    let shifted = vrshlq_s32(vreinterpretq_s32_u8(v), vdupq_n_s32(-bits));
    vreinterpretq_u8_s32(shifted)
}
