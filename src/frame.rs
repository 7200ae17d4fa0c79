// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The picture view the core reads samples from.
//!
//! A real deployment presents this crate with a `Picture`/`Frame`
//! abstraction from a larger host; `Frame` is the minimal concrete shape
//! of that collaborator, holding only what the VIF pipeline reads: one
//! luma plane, its stride, and its bit depth.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// An immutable view over one luma plane.
///
/// Samples are 8-bit unsigned when `bit_depth == 8`. For any other bit
/// depth in `9..=16`, `data` holds little-endian `u16` samples with valid
/// range `[0, 2^bit_depth - 1]`; the core never validates that samples
/// stay within that range, since doing so on every pixel would defeat
/// the point of an integer fast path. A sample outside that range is
/// the caller's bug, not this crate's.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    width: usize,
    height: usize,
    bit_depth: u8,
    stride_bytes: usize,
    data: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Builds a frame view, validating only that `data` is large enough
    /// for the declared geometry.
    pub fn new(width: usize, height: usize, bit_depth: u8, stride_bytes: usize, data: &'a [u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidFrame("zero width or height"));
        }
        if !(8..=16).contains(&bit_depth) {
            return Err(Error::InvalidFrame("bit depth out of range"));
        }
        let bytes_per_sample = if bit_depth == 8 { 1 } else { 2 };
        let min_stride = width
            .checked_mul(bytes_per_sample)
            .ok_or(Error::InvalidFrame("width overflow"))?;
        if stride_bytes < min_stride {
            warn!("frame stride {stride_bytes} too small for width {width} at {bit_depth}bpc");
            return Err(Error::InvalidFrame("stride smaller than width requires"));
        }
        let required = stride_bytes
            .checked_mul(height)
            .ok_or(Error::InvalidFrame("frame size overflow"))?;
        if data.len() < required {
            warn!("frame data of {} bytes too short for {required} required", data.len());
            return Err(Error::InvalidFrame("data shorter than stride * height"));
        }
        Ok(Self { width, height, bit_depth, stride_bytes, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    /// Reads the sample at `(x, y)` widened to `u16`, decoding a
    /// little-endian `u16` when `bit_depth() != 8`.
    #[inline]
    pub(crate) fn sample(&self, x: usize, y: usize) -> u16 {
        let row = &self.data[y * self.stride_bytes..];
        if self.bit_depth == 8 {
            row[x] as u16
        } else {
            LittleEndian::read_u16(&row[x * 2..x * 2 + 2])
        }
    }
}
