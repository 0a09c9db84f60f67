//! Fixed-width vector memory access and rounding arithmetic for pixel kernels
//!
//! Filter and convolution kernels in a video decoder move small, irregular
//! byte counts between pixel rows and 128-bit registers, read past the
//! meaningful end of a row, and need rounding that is bit-exact across
//! platforms. This crate provides those building blocks:
//!
//! - [`memory`]: 2, 4, 8 and 16-byte loads and stores, lane inserts and
//!   half-vector loads.
//! - [`overread`]: zeroing of bytes read past a row's logical end, and the
//!   sanitizer-safe loads built on it.
//! - [`rounding`]: rounding right shifts over 16- and 32-bit lanes.
//! - [`mask`]: the partial-lane byte mask.
//! - [`PixelRow`]: a padded row that computes overread extents and
//!   bounds-checks loads.
//!
//! # Features
//!
//! - `std` (default): Enable standard library support.
//! - `simd` (default): SSE (x86-64) and NEON (AArch64) backends. Without it,
//!   or on other targets, every operation runs its scalar fallback, which
//!   produces identical bytes.
//! - `msan`: Zero bytes read past a row's logical end. Enable for
//!   MemorySanitizer builds; otherwise masking is the identity.
//!
//! # Example
//!
//! ```rust
//! use zenvec::{load4, right_shift_with_rounding_i32x4};
//!
//! let v = load4(&[0x01, 0x02, 0x03, 0x04]);
//! let r = right_shift_with_rounding_i32x4::<2>(v);
//! assert_eq!(r.i32_lanes()[0], 16826496);
//! ```
//!
//! Kernels that chain many operations can skip the per-call dispatch and
//! work on native registers through the backend modules (`simd_sse`,
//! `simd_neon`), summoning the token once with [`simd_token`].
//!
//! # Safety
//!
//! This crate uses `#![forbid(unsafe_code)]`. SIMD intrinsics are reached
//! through [`archmage`] tokens and `safe_unaligned_simd`'s array-typed
//! loads and stores; the `#[arcane]` macro generates the target-feature
//! wrappers. Without the `simd` feature the crate contains no unsafe code.
//!
//! [`archmage`]: https://docs.rs/archmage

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

extern crate alloc;

mod dispatch;
mod error;
pub mod mask;
pub mod memory;
pub mod overread;
pub mod rounding;
mod row;
mod vector;

/// x86-64 SSE backend over `__m128i`.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub mod simd_sse;

/// AArch64 NEON backend over `uint8x16_t`.
#[cfg(all(feature = "simd", target_arch = "aarch64"))]
pub mod simd_neon;

pub use dispatch::{SimdBackend, SimdTokenType, simd_token};
pub use error::RowError;
pub use mask::{HIGH_BYTES_MASK_TABLE, mask_high_bytes};
pub use memory::{
    load_aligned16, load_hi8, load_lo8, load_unaligned16, load2, load2_lane, load2x2, load4,
    load4x2, store_aligned16, store_hi8, store_lo8, store_unaligned16, store2, store4,
};
pub use overread::{
    ActiveOverread, KeepOverread, MASKING_ENABLED, OverreadPolicy, ZeroOverread,
    load_aligned16_msan, load_aligned16_msan_with, load_hi8_msan, load_hi8_msan_with,
    load_lo8_msan, load_lo8_msan_with, load_unaligned16_msan, load_unaligned16_msan_with,
    mask_overreads, mask_overreads_with,
};
pub use rounding::{
    right_shift_with_rounding_i16x8, right_shift_with_rounding_i32x4,
    right_shift_with_rounding_u16x8, right_shift_with_rounding_u32x4,
    variable_right_shift_with_rounding_i32x4,
};
pub use row::PixelRow;
pub use vector::V128;
