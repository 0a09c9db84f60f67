//! Bit-exact rounding right shifts over packed 16- and 32-bit lanes.
//!
//! Every variant computes `(x + 2^(bits-1)) >> bits` (round half up, with an
//! arithmetic shift for signed lanes). The sum is never formed: the result is
//! `(x >> bits) + ((x >> (bits - 1)) & 1)`, which gives the same value and
//! cannot overflow at the lane maximum. Decoders rely on this being exactly
//! reproducible, so the vector paths are tested against these scalar forms.

use crate::dispatch::simd_dispatch;
use crate::vector::V128;

// =============================================================================
// Scalar references
// =============================================================================

/// `round_half_up(x / 2^bits)` for `bits` in `1..=16`.
#[inline(always)]
pub fn right_shift_with_rounding_u16(x: u16, bits: u32) -> u16 {
    debug_assert!((1..=16).contains(&bits), "u16 rounding shift {bits} out of range");
    x.checked_shr(bits).unwrap_or(0) + ((x >> (bits - 1)) & 1)
}

/// `(x + 2^(bits-1)) >> bits` for `bits` in `1..=15`.
#[inline(always)]
pub fn right_shift_with_rounding_i16(x: i16, bits: u32) -> i16 {
    debug_assert!((1..16).contains(&bits), "i16 rounding shift {bits} out of range");
    (x >> bits) + ((x >> (bits - 1)) & 1)
}

/// `round_half_up(x / 2^bits)` for `bits` in `1..=32`.
#[inline(always)]
pub fn right_shift_with_rounding_u32(x: u32, bits: u32) -> u32 {
    debug_assert!((1..=32).contains(&bits), "u32 rounding shift {bits} out of range");
    x.checked_shr(bits).unwrap_or(0) + ((x >> (bits - 1)) & 1)
}

/// `(x + 2^(bits-1)) >> bits` for `bits` in `1..=31`.
#[inline(always)]
pub fn right_shift_with_rounding_i32(x: i32, bits: u32) -> i32 {
    debug_assert!((1..32).contains(&bits), "i32 rounding shift {bits} out of range");
    (x >> bits) + ((x >> (bits - 1)) & 1)
}

// =============================================================================
// Vector operations
// =============================================================================

/// Rounding shift of eight unsigned 16-bit lanes, `BITS` in `1..=16`.
#[inline]
pub fn right_shift_with_rounding_u16x8<const BITS: i32>(v: V128) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::right_shift_with_rounding_u16::<BITS>(token, simd::from_v128(token, v)),
        );
        right_shift_with_rounding_u16x8_scalar::<BITS>(v))
}

/// Rounding shift of eight signed 16-bit lanes, `BITS` in `1..=15`.
#[inline]
pub fn right_shift_with_rounding_i16x8<const BITS: i32>(v: V128) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::right_shift_with_rounding_s16::<BITS>(token, simd::from_v128(token, v)),
        );
        right_shift_with_rounding_i16x8_scalar::<BITS>(v))
}

/// Rounding shift of four unsigned 32-bit lanes, `BITS` in `1..=32`.
#[inline]
pub fn right_shift_with_rounding_u32x4<const BITS: i32>(v: V128) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::right_shift_with_rounding_u32::<BITS>(token, simd::from_v128(token, v)),
        );
        right_shift_with_rounding_u32x4_scalar::<BITS>(v))
}

/// Rounding shift of four signed 32-bit lanes, `BITS` in `1..=31`.
#[inline]
pub fn right_shift_with_rounding_i32x4<const BITS: i32>(v: V128) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::right_shift_with_rounding_s32::<BITS>(token, simd::from_v128(token, v)),
        );
        right_shift_with_rounding_i32x4_scalar::<BITS>(v))
}

/// Rounding shift of four signed 32-bit lanes by a runtime `bits` in `1..=31`.
#[inline]
pub fn variable_right_shift_with_rounding_i32x4(v: V128, bits: i32) -> V128 {
    simd_dispatch!(token, simd => simd::to_v128(
            token,
            simd::variable_right_shift_with_rounding_s32(token, simd::from_v128(token, v), bits),
        );
        variable_right_shift_with_rounding_i32x4_scalar(v, bits))
}

/// Scalar [`right_shift_with_rounding_u16x8`].
#[inline]
pub fn right_shift_with_rounding_u16x8_scalar<const BITS: i32>(v: V128) -> V128 {
    const { assert!(BITS >= 1 && BITS <= 16, "u16 rounding shift out of range") };
    V128::from_u16_lanes(v.u16_lanes().map(|x| right_shift_with_rounding_u16(x, BITS as u32)))
}

/// Scalar [`right_shift_with_rounding_i16x8`].
#[inline]
pub fn right_shift_with_rounding_i16x8_scalar<const BITS: i32>(v: V128) -> V128 {
    const { assert!(BITS >= 1 && BITS < 16, "s16 rounding shift out of range") };
    V128::from_i16_lanes(v.i16_lanes().map(|x| right_shift_with_rounding_i16(x, BITS as u32)))
}

/// Scalar [`right_shift_with_rounding_u32x4`].
#[inline]
pub fn right_shift_with_rounding_u32x4_scalar<const BITS: i32>(v: V128) -> V128 {
    const { assert!(BITS >= 1 && BITS <= 32, "u32 rounding shift out of range") };
    V128::from_u32_lanes(v.u32_lanes().map(|x| right_shift_with_rounding_u32(x, BITS as u32)))
}

/// Scalar [`right_shift_with_rounding_i32x4`].
#[inline]
pub fn right_shift_with_rounding_i32x4_scalar<const BITS: i32>(v: V128) -> V128 {
    const { assert!(BITS >= 1 && BITS < 32, "s32 rounding shift out of range") };
    V128::from_i32_lanes(v.i32_lanes().map(|x| right_shift_with_rounding_i32(x, BITS as u32)))
}

/// Scalar [`variable_right_shift_with_rounding_i32x4`].
#[inline]
pub fn variable_right_shift_with_rounding_i32x4_scalar(v: V128, bits: i32) -> V128 {
    V128::from_i32_lanes(v.i32_lanes().map(|x| right_shift_with_rounding_i32(x, bits as u32)))
}
