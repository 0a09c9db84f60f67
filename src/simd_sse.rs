//! x86-64 SSE backend over raw `__m128i` registers.
//!
//! Every function takes the pre-summoned [`X64V3Token`] so kernels can keep
//! values in registers across calls; the dispatching API in the parent
//! modules converts to and from [`V128`] around single operations.
//!
//! Only SSE2 operations are used. The token is the x86-64-v3 tier so these
//! calls inline into AVX2 kernels. Memory access goes through
//! `safe_unaligned_simd`, which sizes every load and store from the array
//! type: a 2-byte load never touches a third byte.
//!
//! Uses archmage for safe SIMD intrinsics with token-based CPU feature verification.

#![allow(clippy::cast_possible_truncation)]

use archmage::{X64V3Token, arcane};
use core::arch::x86_64::*;
use safe_unaligned_simd::x86_64 as simd_mem;

use crate::mask::mask_window;
use crate::overread::{ActiveOverread, OverreadPolicy};
use crate::vector::V128;

// =============================================================================
// V128 bridge
// =============================================================================

/// Spill a register into a [`V128`].
#[arcane]
#[inline(always)]
pub fn to_v128(_token: X64V3Token, v: __m128i) -> V128 {
    let mut out = V128::ZERO;
    simd_mem::_mm_storeu_si128(out.as_bytes_mut(), v);
    out
}

/// Load a [`V128`] into a register.
#[arcane]
#[inline(always)]
pub fn from_v128(_token: X64V3Token, v: V128) -> __m128i {
    simd_mem::_mm_loadu_si128(v.as_bytes())
}

// =============================================================================
// Loads
// =============================================================================

/// Load 2 bytes into lane 0, zero-extended.
#[arcane]
#[inline(always)]
pub fn load2(_token: X64V3Token, src: &[u8; 2]) -> __m128i {
    _mm_cvtsi32_si128(i32::from(u16::from_le_bytes(*src)))
}

/// Load 2 bytes from each of two rows into 16-bit lanes 0 and 1.
#[arcane]
#[inline(always)]
pub fn load2x2(_token: X64V3Token, src1: &[u8; 2], src2: &[u8; 2]) -> __m128i {
    let lo = u32::from(u16::from_le_bytes(*src1));
    let hi = u32::from(u16::from_le_bytes(*src2));
    _mm_cvtsi32_si128((lo | (hi << 16)) as i32)
}

/// Overwrite 16-bit lane `LANE` of `v` with 2 bytes from `src`.
#[arcane]
#[inline(always)]
pub fn load2_lane<const LANE: i32>(_token: X64V3Token, v: __m128i, src: &[u8; 2]) -> __m128i {
    const { assert!(LANE >= 0 && LANE < 8, "16-bit lane index out of range") };
    _mm_insert_epi16::<LANE>(v, i32::from(u16::from_le_bytes(*src)))
}

/// Load 4 bytes into lane 0, zero-extended.
#[arcane]
#[inline(always)]
pub fn load4(_token: X64V3Token, src: &[u8; 4]) -> __m128i {
    simd_mem::_mm_loadu_si32(src)
}

/// Load 4 bytes from each of two rows into 32-bit lanes 0 and 1.
#[arcane]
#[inline(always)]
pub fn load4x2(_token: X64V3Token, src1: &[u8; 4], src2: &[u8; 4]) -> __m128i {
    let lo = simd_mem::_mm_loadu_si32(src1);
    let hi = simd_mem::_mm_loadu_si32(src2);
    _mm_unpacklo_epi32(lo, hi)
}

/// Load 8 bytes into the low half, zeroing the high half.
#[arcane]
#[inline(always)]
pub fn load_lo8(_token: X64V3Token, src: &[u8; 8]) -> __m128i {
    simd_mem::_mm_loadu_si64(src)
}

/// Load 8 bytes into the high half of `v`, keeping its low half.
#[arcane]
#[inline(always)]
pub fn load_hi8(_token: X64V3Token, v: __m128i, src: &[u8; 8]) -> __m128i {
    _mm_unpacklo_epi64(v, simd_mem::_mm_loadu_si64(src))
}

/// Load 16 bytes from any address.
#[arcane]
#[inline(always)]
pub fn load_unaligned16(_token: X64V3Token, src: &[u8; 16]) -> __m128i {
    simd_mem::_mm_loadu_si128(src)
}

/// Load 16 bytes from a 16-byte aligned address.
#[arcane]
#[inline(always)]
pub fn load_aligned16(_token: X64V3Token, src: &[u8; 16]) -> __m128i {
    debug_assert!(
        src.as_ptr().addr() % 16 == 0,
        "load_aligned16: {:p} is not 16-byte aligned",
        src.as_ptr()
    );
    simd_mem::_mm_loadu_si128(src)
}

// =============================================================================
// Stores
// =============================================================================

/// Store the low 2 bytes.
#[arcane]
#[inline(always)]
pub fn store2(_token: X64V3Token, dst: &mut [u8; 2], v: __m128i) {
    simd_mem::_mm_storeu_si16(dst, v);
}

/// Store the low 4 bytes.
#[arcane]
#[inline(always)]
pub fn store4(_token: X64V3Token, dst: &mut [u8; 4], v: __m128i) {
    simd_mem::_mm_storeu_si32(dst, v);
}

/// Store the low 8 bytes.
#[arcane]
#[inline(always)]
pub fn store_lo8(_token: X64V3Token, dst: &mut [u8; 8], v: __m128i) {
    simd_mem::_mm_storeu_si64(dst, v);
}

/// Store the high 8 bytes.
#[arcane]
#[inline(always)]
pub fn store_hi8(_token: X64V3Token, dst: &mut [u8; 8], v: __m128i) {
    simd_mem::_mm_storeu_si64(dst, _mm_unpackhi_epi64(v, v));
}

/// Store 16 bytes to any address.
#[arcane]
#[inline(always)]
pub fn store_unaligned16(_token: X64V3Token, dst: &mut [u8; 16], v: __m128i) {
    simd_mem::_mm_storeu_si128(dst, v);
}

/// Store 16 bytes to a 16-byte aligned address.
#[arcane]
#[inline(always)]
pub fn store_aligned16(_token: X64V3Token, dst: &mut [u8; 16], v: __m128i) {
    debug_assert!(
        dst.as_ptr().addr() % 16 == 0,
        "store_aligned16: {:p} is not 16-byte aligned",
        dst.as_ptr()
    );
    simd_mem::_mm_storeu_si128(dst, v);
}

// =============================================================================
// Masks and overread handling
// =============================================================================

/// First `n` bytes zero, remaining `16 - n` bytes `0xFF`.
#[arcane]
#[inline(always)]
pub fn mask_high_bytes(_token: X64V3Token, n: usize) -> __m128i {
    simd_mem::_mm_loadu_si128(mask_window(n))
}

/// Zero the last `over_read` bytes of `v` if `P` masks overreads.
#[arcane]
#[inline(always)]
pub fn mask_overreads_with<P: OverreadPolicy>(
    token: X64V3Token,
    v: __m128i,
    over_read: isize,
) -> __m128i {
    if !P::ZEROES_OVERREAD || over_read <= 0 {
        return v;
    }
    let keep = 16 - over_read.min(16) as usize;
    // andnot(mask, v): keeps the bytes where the mask is zero
    _mm_andnot_si128(mask_high_bytes(token, keep), v)
}

/// [`mask_overreads_with`] under the build's overread policy.
#[arcane]
#[inline(always)]
pub fn mask_overreads(token: X64V3Token, v: __m128i, over_read: isize) -> __m128i {
    mask_overreads_with::<ActiveOverread>(token, v, over_read)
}

/// [`load_lo8`] whose high half, plus `over_read` trailing bytes of the low
/// half, count as overread under `P`.
#[arcane]
#[inline(always)]
pub fn load_lo8_msan_with<P: OverreadPolicy>(
    token: X64V3Token,
    src: &[u8; 8],
    over_read: isize,
) -> __m128i {
    mask_overreads_with::<P>(token, load_lo8(token, src), over_read + 8)
}

/// [`load_hi8`] with the last `over_read` bytes masked under `P`.
#[arcane]
#[inline(always)]
pub fn load_hi8_msan_with<P: OverreadPolicy>(
    token: X64V3Token,
    v: __m128i,
    src: &[u8; 8],
    over_read: isize,
) -> __m128i {
    mask_overreads_with::<P>(token, load_hi8(token, v, src), over_read)
}

/// [`load_aligned16`] with the last `over_read` bytes masked under `P`.
#[arcane]
#[inline(always)]
pub fn load_aligned16_msan_with<P: OverreadPolicy>(
    token: X64V3Token,
    src: &[u8; 16],
    over_read: isize,
) -> __m128i {
    mask_overreads_with::<P>(token, load_aligned16(token, src), over_read)
}

/// [`load_unaligned16`] with the last `over_read` bytes masked under `P`.
#[arcane]
#[inline(always)]
pub fn load_unaligned16_msan_with<P: OverreadPolicy>(
    token: X64V3Token,
    src: &[u8; 16],
    over_read: isize,
) -> __m128i {
    mask_overreads_with::<P>(token, load_unaligned16(token, src), over_read)
}

/// [`load_lo8_msan_with`] under the build's overread policy.
#[arcane]
#[inline(always)]
pub fn load_lo8_msan(token: X64V3Token, src: &[u8; 8], over_read: isize) -> __m128i {
    load_lo8_msan_with::<ActiveOverread>(token, src, over_read)
}

/// [`load_hi8_msan_with`] under the build's overread policy.
#[arcane]
#[inline(always)]
pub fn load_hi8_msan(token: X64V3Token, v: __m128i, src: &[u8; 8], over_read: isize) -> __m128i {
    load_hi8_msan_with::<ActiveOverread>(token, v, src, over_read)
}

/// [`load_aligned16_msan_with`] under the build's overread policy.
#[arcane]
#[inline(always)]
pub fn load_aligned16_msan(token: X64V3Token, src: &[u8; 16], over_read: isize) -> __m128i {
    load_aligned16_msan_with::<ActiveOverread>(token, src, over_read)
}

/// [`load_unaligned16_msan_with`] under the build's overread policy.
#[arcane]
#[inline(always)]
pub fn load_unaligned16_msan(token: X64V3Token, src: &[u8; 16], over_read: isize) -> __m128i {
    load_unaligned16_msan_with::<ActiveOverread>(token, src, over_read)
}

// =============================================================================
// Rounding shifts
// =============================================================================
//
// All variants compute floor(x / 2^bits) + bit(bits - 1) of x, which equals
// (x + 2^(bits-1)) >> bits without the intermediate sum ever overflowing.

/// Unsigned 16-bit lanes: `(x + 2^(BITS-1)) >> BITS`, `BITS` in `1..=16`.
#[arcane]
#[inline(always)]
pub fn right_shift_with_rounding_u16<const BITS: i32>(_token: X64V3Token, v: __m128i) -> __m128i {
    const { assert!(BITS >= 1 && BITS <= 16, "u16 rounding shift out of range") };
    // Shift out all but the last bit
    let tmp = _mm_srl_epi16(v, _mm_cvtsi32_si128(BITS - 1));
    // avg with zero shifts by one more and rounds up
    _mm_avg_epu16(tmp, _mm_setzero_si128())
}

/// Signed 16-bit lanes: `(x + 2^(BITS-1)) >> BITS`, `BITS` in `1..=15`.
#[arcane]
#[inline(always)]
pub fn right_shift_with_rounding_s16<const BITS: i32>(_token: X64V3Token, v: __m128i) -> __m128i {
    const { assert!(BITS >= 1 && BITS < 16, "s16 rounding shift out of range") };
    let floor = _mm_srai_epi16::<BITS>(v);
    let round = _mm_and_si128(_mm_sra_epi16(v, _mm_cvtsi32_si128(BITS - 1)), _mm_set1_epi16(1));
    _mm_add_epi16(floor, round)
}

/// Unsigned 32-bit lanes: `(x + 2^(BITS-1)) >> BITS`, `BITS` in `1..=32`.
#[arcane]
#[inline(always)]
pub fn right_shift_with_rounding_u32<const BITS: i32>(_token: X64V3Token, v: __m128i) -> __m128i {
    const { assert!(BITS >= 1 && BITS <= 32, "u32 rounding shift out of range") };
    // srli by 32 yields zero, which is the floor part for BITS == 32
    let floor = _mm_srli_epi32::<BITS>(v);
    let round = _mm_and_si128(_mm_srl_epi32(v, _mm_cvtsi32_si128(BITS - 1)), _mm_set1_epi32(1));
    _mm_add_epi32(floor, round)
}

/// Signed 32-bit lanes: `(x + 2^(BITS-1)) >> BITS`, `BITS` in `1..=31`.
#[arcane]
#[inline(always)]
pub fn right_shift_with_rounding_s32<const BITS: i32>(_token: X64V3Token, v: __m128i) -> __m128i {
    const { assert!(BITS >= 1 && BITS < 32, "s32 rounding shift out of range") };
    let floor = _mm_srai_epi32::<BITS>(v);
    let round = _mm_and_si128(_mm_sra_epi32(v, _mm_cvtsi32_si128(BITS - 1)), _mm_set1_epi32(1));
    _mm_add_epi32(floor, round)
}

/// Signed 32-bit lanes with a runtime shift, `bits` in `1..=31`.
///
/// The shift count travels in the low quadword of a register (`psrad xmm`).
#[arcane]
#[inline(always)]
pub fn variable_right_shift_with_rounding_s32(
    _token: X64V3Token,
    v: __m128i,
    bits: i32,
) -> __m128i {
    debug_assert!((1..32).contains(&bits), "s32 rounding shift {bits} out of range");
    let floor = _mm_sra_epi32(v, _mm_cvtsi32_si128(bits));
    let round = _mm_and_si128(_mm_sra_epi32(v, _mm_cvtsi32_si128(bits - 1)), _mm_set1_epi32(1));
    _mm_add_epi32(floor, round)
}
