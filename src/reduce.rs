// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Separable Gaussian blur + decimation-by-2, used to step from scale
//! `s` to scale `s + 1`.

use crate::mirror::mirror;
use crate::plane::PixelSource;

/// Vertical-pass shift/rounding for the reduce filter. `source_scale`
/// is the pyramid level being read *from*: `0` means the source is the
/// caller's original frame (so the shift tracks the frame's bit
/// depth), anything else means the source is an already-16-bit
/// intermediate plane in the arena (fixed Q16 shift).
pub(crate) struct ReduceShift {
    pub shift: u32,
    pub round: i64,
}

impl ReduceShift {
    pub(crate) fn for_source_scale(source_scale: usize, bit_depth: u8) -> Self {
        if source_scale == 0 {
            Self { shift: bit_depth as u32, round: 1i64 << (bit_depth as u32 - 1) }
        } else {
            Self { shift: 16, round: 32768 }
        }
    }
}

const HORIZONTAL_SHIFT: u32 = 16;
const HORIZONTAL_ROUND: i64 = 32768;

/// Blurs `reference`/`distorted` by `kernel` and writes the full-resolution
/// result into `out_mu1`/`out_mu2` (both row-strided by `out_row_stride`,
/// which must match the arena's shared row stride). Does not decimate;
/// call [`decimate`] on the result to produce the next scale's ref/dis
/// planes.
pub(crate) fn reduce(
    reference: &dyn PixelSource,
    distorted: &dyn PixelSource,
    kernel: &[u16],
    shift: &ReduceShift,
    tmp_ref_convol: &mut [u16],
    tmp_dis_convol: &mut [u16],
    out_mu1: &mut [u16],
    out_mu2: &mut [u16],
    out_row_stride: usize,
) {
    let w = reference.width();
    let h = reference.height();
    let half = kernel.len() / 2;

    for y in 0..h {
        // Vertical pass.
        for x in 0..w {
            let mut accum_ref: i64 = 0;
            let mut accum_dis: i64 = 0;
            for (k, &coeff) in kernel.iter().enumerate() {
                let src_y = mirror(y as isize - half as isize + k as isize, h);
                let coeff = coeff as i64;
                accum_ref += coeff * reference.sample(x, src_y) as i64;
                accum_dis += coeff * distorted.sample(x, src_y) as i64;
            }
            tmp_ref_convol[x] = ((accum_ref + shift.round) >> shift.shift) as u16;
            tmp_dis_convol[x] = ((accum_dis + shift.round) >> shift.shift) as u16;
        }

        // Horizontal pass.
        for x in 0..w {
            let mut accum_ref: i64 = 0;
            let mut accum_dis: i64 = 0;
            for (k, &coeff) in kernel.iter().enumerate() {
                let src_x = mirror(x as isize - half as isize + k as isize, w);
                let coeff = coeff as i64;
                accum_ref += coeff * tmp_ref_convol[src_x] as i64;
                accum_dis += coeff * tmp_dis_convol[src_x] as i64;
            }
            out_mu1[y * out_row_stride + x] = ((accum_ref + HORIZONTAL_ROUND) >> HORIZONTAL_SHIFT) as u16;
            out_mu2[y * out_row_stride + x] = ((accum_dis + HORIZONTAL_ROUND) >> HORIZONTAL_SHIFT) as u16;
        }
    }
}

/// Keeps every other sample of a blurred plane, relying on the prior
/// blur to have already low-passed the signal; deliberately no
/// block-averaging.
pub(crate) fn decimate(
    src: &[u16],
    src_row_stride: usize,
    valid_w: usize,
    valid_h: usize,
    dst: &mut [u16],
    dst_row_stride: usize,
) {
    for i in 0..valid_h / 2 {
        for j in 0..valid_w / 2 {
            dst[i * dst_row_stride + j] = src[(2 * i) * src_row_stride + 2 * j];
        }
    }
}
