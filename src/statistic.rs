// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The combined mean/squared/cross-term separable filter run once per
//! scale, feeding `VifStatistic`.
//!
//! The mean accumulators (`mu1`/`mu2`) intentionally overflow: the
//! reference extractor keeps them in a 32-bit accumulator through both
//! the vertical and horizontal pass and lets the top bits fall off, so
//! `mu1_32`/`mu2_32` are a *wrapped* Q32 composite value rather than a
//! saturating one — `VifStatistic` squares that wrapped value with
//! 64-bit arithmetic and only the low 32 bits of the square product
//! matter there too. This module reproduces the wraparound with
//! `u32::wrapping_*` rather than widening it away, since widening would
//! silently change every downstream score. The squared/cross-term
//! accumulators do not share that quirk except in one case: at scale 0
//! with 8-bit input, the reference extractor's specialized fast path
//! keeps those in 32-bit accumulators too (`narrow_vertical_sq` below);
//! everywhere else they're accumulated in 64 bits without wrapping.

use crate::mirror::mirror;
use crate::plane::PixelSource;

pub(crate) struct StatisticShift {
    pub shift_vp: u32,
    pub round_vp: i64,
    pub shift_vp_sq: u32,
    pub round_vp_sq: i64,
    pub narrow_vertical_sq: bool,
}

const SHIFT_HP: u32 = 16;
const ROUND_HP: i64 = 32768;

impl StatisticShift {
    pub(crate) fn for_scale(scale: usize, bit_depth: u8) -> Self {
        if scale == 0 {
            let shift_vp_sq = 2 * (bit_depth as u32 - 8);
            let round_vp_sq = if bit_depth == 8 { 0 } else { 1i64 << (shift_vp_sq - 1) };
            Self {
                shift_vp: bit_depth as u32,
                round_vp: 1i64 << (bit_depth as u32 - 1),
                shift_vp_sq,
                round_vp_sq,
                narrow_vertical_sq: bit_depth == 8,
            }
        } else {
            Self { shift_vp: 16, round_vp: 32768, shift_vp_sq: 16, round_vp_sq: 32768, narrow_vertical_sq: false }
        }
    }
}

/// Output of one scale's statistic filter: five full-width/height
/// planes, all sharing `row_stride`.
pub(crate) struct StatisticOutputs<'a> {
    pub mu1_32: &'a mut [u32],
    pub mu2_32: &'a mut [u32],
    pub ref_sq: &'a mut [u32],
    pub dis_sq: &'a mut [u32],
    pub ref_dis: &'a mut [u32],
    pub row_stride: usize,
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn statistic(
    reference: &dyn PixelSource,
    distorted: &dyn PixelSource,
    kernel: &[u16],
    shift: &StatisticShift,
    tmp_mu1: &mut [u16],
    tmp_mu2: &mut [u16],
    tmp_ref: &mut [u32],
    tmp_dis: &mut [u32],
    tmp_ref_dis: &mut [u32],
    out: &mut StatisticOutputs<'_>,
) {
    let w = reference.width();
    let h = reference.height();
    let half = kernel.len() / 2;

    for y in 0..h {
        // Vertical pass.
        for x in 0..w {
            let mut accum_mu1: u32 = 0;
            let mut accum_mu2: u32 = 0;
            let mut accum_ref_narrow: u32 = 0;
            let mut accum_dis_narrow: u32 = 0;
            let mut accum_rd_narrow: u32 = 0;
            let mut accum_ref_wide: i64 = 0;
            let mut accum_dis_wide: i64 = 0;
            let mut accum_rd_wide: i64 = 0;

            for (k, &coeff) in kernel.iter().enumerate() {
                let src_y = mirror(y as isize - half as isize + k as isize, h);
                let ref_s = reference.sample(x, src_y);
                let dis_s = distorted.sample(x, src_y);
                let coeff32 = coeff as u32;
                let img_ref = coeff32.wrapping_mul(ref_s);
                let img_dis = coeff32.wrapping_mul(dis_s);

                accum_mu1 = accum_mu1.wrapping_add(img_ref);
                accum_mu2 = accum_mu2.wrapping_add(img_dis);

                if shift.narrow_vertical_sq {
                    accum_ref_narrow = accum_ref_narrow.wrapping_add(img_ref.wrapping_mul(ref_s));
                    accum_dis_narrow = accum_dis_narrow.wrapping_add(img_dis.wrapping_mul(dis_s));
                    accum_rd_narrow = accum_rd_narrow.wrapping_add(img_ref.wrapping_mul(dis_s));
                } else {
                    accum_ref_wide += img_ref as i64 * ref_s as i64;
                    accum_dis_wide += img_dis as i64 * dis_s as i64;
                    accum_rd_wide += img_ref as i64 * dis_s as i64;
                }
            }

            tmp_mu1[x] = (accum_mu1.wrapping_add(shift.round_vp as u32) >> shift.shift_vp) as u16;
            tmp_mu2[x] = (accum_mu2.wrapping_add(shift.round_vp as u32) >> shift.shift_vp) as u16;

            if shift.narrow_vertical_sq {
                tmp_ref[x] = accum_ref_narrow.wrapping_add(shift.round_vp_sq as u32) >> shift.shift_vp_sq;
                tmp_dis[x] = accum_dis_narrow.wrapping_add(shift.round_vp_sq as u32) >> shift.shift_vp_sq;
                tmp_ref_dis[x] = accum_rd_narrow.wrapping_add(shift.round_vp_sq as u32) >> shift.shift_vp_sq;
            } else {
                tmp_ref[x] = ((accum_ref_wide + shift.round_vp_sq) >> shift.shift_vp_sq) as u32;
                tmp_dis[x] = ((accum_dis_wide + shift.round_vp_sq) >> shift.shift_vp_sq) as u32;
                tmp_ref_dis[x] = ((accum_rd_wide + shift.round_vp_sq) >> shift.shift_vp_sq) as u32;
            }
        }

        // Horizontal pass: mu1/mu2 stay in wrapping 32-bit arithmetic,
        // the three quadratic terms always widen to 64 bits.
        for x in 0..w {
            let mut accum_mu1: u32 = 0;
            let mut accum_mu2: u32 = 0;
            let mut accum_ref: i64 = 0;
            let mut accum_dis: i64 = 0;
            let mut accum_rd: i64 = 0;

            for (k, &coeff) in kernel.iter().enumerate() {
                let src_x = mirror(x as isize - half as isize + k as isize, w);
                let coeff32 = coeff as u32;
                accum_mu1 = accum_mu1.wrapping_add(coeff32.wrapping_mul(tmp_mu1[src_x] as u32));
                accum_mu2 = accum_mu2.wrapping_add(coeff32.wrapping_mul(tmp_mu2[src_x] as u32));
                accum_ref += coeff as i64 * tmp_ref[src_x] as i64;
                accum_dis += coeff as i64 * tmp_dis[src_x] as i64;
                accum_rd += coeff as i64 * tmp_ref_dis[src_x] as i64;
            }

            let idx = y * out.row_stride + x;
            out.mu1_32[idx] = accum_mu1;
            out.mu2_32[idx] = accum_mu2;
            out.ref_sq[idx] = ((accum_ref + ROUND_HP) >> SHIFT_HP) as u32;
            out.dis_sq[idx] = ((accum_dis + ROUND_HP) >> SHIFT_HP) as u32;
            out.ref_dis[idx] = ((accum_rd + ROUND_HP) >> SHIFT_HP) as u32;
        }
    }
}
