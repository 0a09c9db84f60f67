//! Pixel rows with an overread margin.
//!
//! Frame buffers are allocated with padding after each row so that kernels
//! can always read a whole vector. [`PixelRow`] pairs the padded slice (the
//! physical length) with the number of meaningful bytes (the logical length)
//! and turns a fixed-width read position into the overread extent the
//! `*_msan` loads expect.

use crate::error::RowError;
use crate::overread::{self, ActiveOverread, OverreadPolicy};
use crate::vector::V128;

/// A row of pixel bytes whose tail past `logical_len` is padding.
#[derive(Debug, Clone, Copy)]
pub struct PixelRow<'a> {
    data: &'a [u8],
    logical_len: usize,
}

impl<'a> PixelRow<'a> {
    /// Wrap `data`, of which the first `logical_len` bytes are meaningful.
    pub fn new(data: &'a [u8], logical_len: usize) -> Result<Self, RowError> {
        if logical_len > data.len() {
            return Err(RowError::LogicalExceedsPhysical {
                logical: logical_len,
                physical: data.len(),
            });
        }
        Ok(Self { data, logical_len })
    }

    /// Wrap `data` with no padding.
    pub fn unpadded(data: &'a [u8]) -> Self {
        Self {
            data,
            logical_len: data.len(),
        }
    }

    /// The whole buffer, padding included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Number of meaningful bytes.
    pub fn logical_len(&self) -> usize {
        self.logical_len
    }

    /// Number of addressable bytes.
    pub fn physical_len(&self) -> usize {
        self.data.len()
    }

    /// Bytes of padding after the logical end.
    pub fn overread_margin(&self) -> usize {
        self.data.len() - self.logical_len
    }

    /// How many bytes a `width`-byte read at `offset` extends past the
    /// logical end. Zero or negative when the read stays inside.
    ///
    /// Saturates at `isize::MAX` for reads ending beyond the address space.
    pub fn overread_extent(&self, offset: usize, width: usize) -> isize {
        let end = isize::try_from(offset.saturating_add(width)).unwrap_or(isize::MAX);
        // Slices never exceed isize::MAX bytes, so the logical length fits.
        end - self.logical_len as isize
    }

    /// The `N` bytes at `offset`, checked against the physical length.
    pub fn window<const N: usize>(&self, offset: usize) -> Result<&'a [u8; N], RowError> {
        self.data
            .get(offset..)
            .and_then(|tail| tail.get(..N))
            .and_then(|w| <&[u8; N]>::try_from(w).ok())
            .ok_or(RowError::OutOfBounds {
                offset,
                width: N,
                physical: self.data.len(),
            })
    }

    fn aligned_window(&self, offset: usize) -> Result<&'a [u8; 16], RowError> {
        let w = self.window::<16>(offset)?;
        if w.as_ptr().addr() % 16 != 0 {
            return Err(RowError::Misaligned { offset });
        }
        Ok(w)
    }

    /// Load 8 bytes at `offset` into the low half, masking bytes past the
    /// logical end under `P`.
    pub fn load_lo8_msan_with<P: OverreadPolicy>(&self, offset: usize) -> Result<V128, RowError> {
        let src = self.window::<8>(offset)?;
        Ok(overread::load_lo8_msan_with::<P>(src, self.overread_extent(offset, 8)))
    }

    /// Load 8 bytes at `offset` into the high half of `v`, masking bytes past
    /// the logical end under `P`.
    pub fn load_hi8_msan_with<P: OverreadPolicy>(
        &self,
        v: V128,
        offset: usize,
    ) -> Result<V128, RowError> {
        let src = self.window::<8>(offset)?;
        Ok(overread::load_hi8_msan_with::<P>(v, src, self.overread_extent(offset, 8)))
    }

    /// Load 16 bytes at `offset`, masking bytes past the logical end under `P`.
    pub fn load_unaligned16_msan_with<P: OverreadPolicy>(
        &self,
        offset: usize,
    ) -> Result<V128, RowError> {
        let src = self.window::<16>(offset)?;
        Ok(overread::load_unaligned16_msan_with::<P>(src, self.overread_extent(offset, 16)))
    }

    /// Load 16 bytes from a 16-byte aligned position, masking bytes past the
    /// logical end under `P`.
    pub fn load_aligned16_msan_with<P: OverreadPolicy>(
        &self,
        offset: usize,
    ) -> Result<V128, RowError> {
        let src = self.aligned_window(offset)?;
        Ok(overread::load_aligned16_msan_with::<P>(src, self.overread_extent(offset, 16)))
    }

    /// [`load_lo8_msan_with`](Self::load_lo8_msan_with) under [`ActiveOverread`].
    pub fn load_lo8_msan(&self, offset: usize) -> Result<V128, RowError> {
        self.load_lo8_msan_with::<ActiveOverread>(offset)
    }

    /// [`load_hi8_msan_with`](Self::load_hi8_msan_with) under [`ActiveOverread`].
    pub fn load_hi8_msan(&self, v: V128, offset: usize) -> Result<V128, RowError> {
        self.load_hi8_msan_with::<ActiveOverread>(v, offset)
    }

    /// [`load_unaligned16_msan_with`](Self::load_unaligned16_msan_with) under
    /// [`ActiveOverread`].
    pub fn load_unaligned16_msan(&self, offset: usize) -> Result<V128, RowError> {
        self.load_unaligned16_msan_with::<ActiveOverread>(offset)
    }

    /// [`load_aligned16_msan_with`](Self::load_aligned16_msan_with) under
    /// [`ActiveOverread`].
    pub fn load_aligned16_msan(&self, offset: usize) -> Result<V128, RowError> {
        self.load_aligned16_msan_with::<ActiveOverread>(offset)
    }
}
