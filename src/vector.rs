//! Portable 128-bit vector value.
//!
//! [`V128`] is what the dispatching API passes around: sixteen bytes with no
//! lane width attached. Each operation decides whether the bytes are read as
//! `u8x16`, `u16x8`/`i16x8` or `u32x4`/`i32x4`. Lanes are little-endian,
//! matching both SSE2 and NEON register layout, so a `V128` can be moved in
//! and out of a native register with a plain 16-byte load/store.

use core::fmt;

/// An opaque 128-bit vector value.
///
/// Plain `Copy` data, aligned to 16 bytes so it can be handed to an aligned
/// store without copying.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C, align(16))]
pub struct V128([u8; 16]);

impl V128 {
    /// All sixteen bytes zero.
    pub const ZERO: Self = Self([0; 16]);

    /// All sixteen bytes `0xFF`.
    pub const ONES: Self = Self([0xFF; 16]);

    /// Wrap sixteen bytes, lane 0 first.
    #[inline(always)]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The sixteen bytes, lane 0 first.
    #[inline(always)]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Borrow the bytes.
    #[inline(always)]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Mutably borrow the bytes.
    #[inline(always)]
    pub fn as_bytes_mut(&mut self) -> &mut [u8; 16] {
        &mut self.0
    }

    /// Low eight bytes.
    #[inline(always)]
    pub fn lo_half(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out.copy_from_slice(&self.0[..8]);
        out
    }

    /// High eight bytes.
    #[inline(always)]
    pub fn hi_half(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out.copy_from_slice(&self.0[8..]);
        out
    }

    /// Build from eight unsigned 16-bit lanes.
    pub fn from_u16_lanes(lanes: [u16; 8]) -> Self {
        let mut bytes = [0u8; 16];
        for (chunk, lane) in bytes.chunks_exact_mut(2).zip(lanes) {
            chunk.copy_from_slice(&lane.to_le_bytes());
        }
        Self(bytes)
    }

    /// Build from eight signed 16-bit lanes.
    pub fn from_i16_lanes(lanes: [i16; 8]) -> Self {
        Self::from_u16_lanes(lanes.map(|l| l as u16))
    }

    /// Build from four unsigned 32-bit lanes.
    pub fn from_u32_lanes(lanes: [u32; 4]) -> Self {
        let mut bytes = [0u8; 16];
        for (chunk, lane) in bytes.chunks_exact_mut(4).zip(lanes) {
            chunk.copy_from_slice(&lane.to_le_bytes());
        }
        Self(bytes)
    }

    /// Build from four signed 32-bit lanes.
    pub fn from_i32_lanes(lanes: [i32; 4]) -> Self {
        Self::from_u32_lanes(lanes.map(|l| l as u32))
    }

    /// View as eight unsigned 16-bit lanes.
    pub fn u16_lanes(self) -> [u16; 8] {
        let mut out = [0u16; 8];
        for (lane, chunk) in out.iter_mut().zip(self.0.chunks_exact(2)) {
            *lane = u16::from_le_bytes([chunk[0], chunk[1]]);
        }
        out
    }

    /// View as eight signed 16-bit lanes.
    pub fn i16_lanes(self) -> [i16; 8] {
        self.u16_lanes().map(|l| l as i16)
    }

    /// View as four unsigned 32-bit lanes.
    pub fn u32_lanes(self) -> [u32; 4] {
        let mut out = [0u32; 4];
        for (lane, chunk) in out.iter_mut().zip(self.0.chunks_exact(4)) {
            *lane = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        out
    }

    /// View as four signed 32-bit lanes.
    pub fn i32_lanes(self) -> [i32; 4] {
        self.u32_lanes().map(|l| l as i32)
    }

    /// Bitwise AND.
    #[inline]
    pub fn and(self, other: Self) -> Self {
        let mut out = self.0;
        for (o, b) in out.iter_mut().zip(other.0) {
            *o &= b;
        }
        Self(out)
    }

    /// `!self & other`, the SSE `andnot` operand order.
    #[inline]
    pub fn and_not(self, other: Self) -> Self {
        let mut out = self.0;
        for (o, b) in out.iter_mut().zip(other.0) {
            *o = !*o & b;
        }
        Self(out)
    }
}

impl From<[u8; 16]> for V128 {
    #[inline(always)]
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl From<V128> for [u8; 16] {
    #[inline(always)]
    fn from(v: V128) -> Self {
        v.0
    }
}

impl fmt::Debug for V128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V128(")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(if i % 4 == 0 { " | " } else { " " })?;
            }
            write!(f, "{b:02x}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_views_are_little_endian() {
        let v = V128::from_bytes([
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
            0x0f, 0x10,
        ]);
        assert_eq!(v.u16_lanes()[0], 0x0201);
        assert_eq!(v.u32_lanes()[0], 0x0403_0201);
        assert_eq!(v.u32_lanes()[3], 0x100f_0e0d);
        assert_eq!(v.lo_half(), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(v.hi_half(), [9, 10, 11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn test_signed_lanes_keep_bit_pattern() {
        let lanes = [i16::MIN, -1, 0, 1, i16::MAX, -300, 300, 7];
        assert_eq!(V128::from_i16_lanes(lanes).i16_lanes(), lanes);

        let lanes = [i32::MIN, -1, i32::MAX, 12345];
        assert_eq!(V128::from_i32_lanes(lanes).i32_lanes(), lanes);
    }

    #[test]
    fn test_and_not_operand_order() {
        let a = V128::from_bytes([0xF0; 16]);
        let b = V128::from_bytes([0xFF; 16]);
        assert_eq!(a.and_not(b), V128::from_bytes([0x0F; 16]));
        assert_eq!(a.and(b), a);
    }

    #[test]
    fn test_debug_groups_dwords() {
        let s = alloc::format!("{:?}", V128::ZERO);
        assert!(s.starts_with("V128(00 00 00 00 | 00"));
    }
}
