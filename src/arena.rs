// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The scratch arena: every buffer the four-scale pipeline touches,
//! sized once at construction and reused, unchanged in shape, for every
//! `extract` call.
//!
//! The reference implementation carves all of this out of one raw
//! aligned allocation with pointer arithmetic. This crate instead hands
//! out typed, non-overlapping `Vec`-backed regions up front: the arena
//! owns the storage, and `extract` borrows slices from it for the
//! duration of one call. Row stride is still padded the way the
//! original pads it (`align_up(width * 4)` bytes, expressed here as
//! elements), since that alignment is what keeps every scale's
//! intermediate rows byte-aligned for a future SIMD backend; the
//! backing allocations themselves are ordinary (non-SIMD-aligned) heap
//! buffers, since this core has no vectorized path to exploit it.

use fallible_collections::TryVec;

use crate::error::Result;

/// Row byte alignment applied to the arena's row stride. Kept small
/// and even rather than matching any particular SIMD register width,
/// since this core never vectorizes; it only needs to keep the stride
/// a round number of `u32` elements.
const ROW_ALIGN_BYTES: usize = 32;

fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) / align * align
}

pub(crate) struct ScratchArena {
    row_stride: usize,
    height: usize,

    pub(crate) ref_plane: TryVec<u16>,
    pub(crate) dis_plane: TryVec<u16>,
    pub(crate) mu1: TryVec<u16>,
    pub(crate) mu2: TryVec<u16>,

    pub(crate) mu1_32: TryVec<u32>,
    pub(crate) mu2_32: TryVec<u32>,
    pub(crate) ref_sq: TryVec<u32>,
    pub(crate) dis_sq: TryVec<u32>,
    pub(crate) ref_dis: TryVec<u32>,

    pub(crate) tmp_mu1: TryVec<u16>,
    pub(crate) tmp_mu2: TryVec<u16>,
    pub(crate) tmp_ref: TryVec<u32>,
    pub(crate) tmp_dis: TryVec<u32>,
    pub(crate) tmp_ref_dis: TryVec<u32>,
    pub(crate) tmp_ref_convol: TryVec<u16>,
    pub(crate) tmp_dis_convol: TryVec<u16>,
}

impl ScratchArena {
    /// Allocates every buffer the pipeline will need for a `width x
    /// height` frame. Fails with `Error::OutOfMemory` rather than
    /// aborting, and leaves no partial state behind: any failed
    /// `try_with_capacity` short-circuits via `?` before the struct is
    /// assembled.
    pub(crate) fn new(width: usize, height: usize) -> Result<Self> {
        let row_stride = align_up(width * 4, ROW_ALIGN_BYTES) / 4;
        let full_len = row_stride * height;

        let mut half16 = || -> Result<TryVec<u16>> {
            let mut v = TryVec::with_capacity(full_len)?;
            v.resize_with(full_len, || 0u16)?;
            Ok(v)
        };
        let mut full32 = || -> Result<TryVec<u32>> {
            let mut v = TryVec::with_capacity(full_len)?;
            v.resize_with(full_len, || 0u32)?;
            Ok(v)
        };
        let mut row16 = || -> Result<TryVec<u16>> {
            let mut v = TryVec::with_capacity(row_stride)?;
            v.resize_with(row_stride, || 0u16)?;
            Ok(v)
        };
        let mut row32 = || -> Result<TryVec<u32>> {
            let mut v = TryVec::with_capacity(row_stride)?;
            v.resize_with(row_stride, || 0u32)?;
            Ok(v)
        };

        Ok(Self {
            row_stride,
            height,
            ref_plane: half16()?,
            dis_plane: half16()?,
            mu1: half16()?,
            mu2: half16()?,
            mu1_32: full32()?,
            mu2_32: full32()?,
            ref_sq: full32()?,
            dis_sq: full32()?,
            ref_dis: full32()?,
            tmp_mu1: row16()?,
            tmp_mu2: row16()?,
            tmp_ref: row32()?,
            tmp_dis: row32()?,
            tmp_ref_dis: row32()?,
            tmp_ref_convol: row16()?,
            tmp_dis_convol: row16()?,
        })
    }

    pub(crate) fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::ScratchArena;

    #[test]
    fn row_stride_is_aligned_and_covers_width() {
        let arena = ScratchArena::new(17, 9).unwrap();
        assert!(arena.row_stride() >= 17);
        assert_eq!((arena.row_stride() * 4) % 32, 0);
    }

    #[test]
    fn buffers_are_sized_for_full_frame() {
        let (w, h) = (64, 32);
        let arena = ScratchArena::new(w, h).unwrap();
        let full = arena.row_stride() * h;
        assert_eq!(arena.ref_plane.len(), full);
        assert_eq!(arena.mu1_32.len(), full);
        assert_eq!(arena.tmp_mu1.len(), arena.row_stride());
    }
}
