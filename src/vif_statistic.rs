// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reduces one scale's five Q32/Q16 planes down to a single
//! `(num, den)` pair using the shared [`crate::log_table::LogTable`].

use crate::log_table::LogTable;

/// A fixed noise-variance floor separating the low-variance fallback
/// from the log-domain computation: `2.0` in float, `2 << 16` here.
const SIGMA_NSQ: i64 = 131_072;

/// One scale's accumulated numerator/denominator, still in the raw
/// units `VifExtractor` divides to get a score.
pub(crate) struct ScorePair {
    pub num: f64,
    pub den: f64,
}

/// Normalizes a nonzero `u32` to a 16-bit mantissa in `[2^15, 2^16)`,
/// returning the mantissa and the exponent adjustment needed to
/// reconstruct the original value (`mantissa << -x == v` for the `x`
/// this returns, since `x` is always negative here).
///
/// Only ever called with `v >= sigma_nsq` in this module, which keeps
/// the shift amount `k` in `[2, 16]`; callers outside that domain
/// would need to special-case `v < 2^16`.
#[inline]
fn norm32(v: u32) -> (u16, i64) {
    debug_assert_ne!(v, 0);
    let k = 16 - v.leading_zeros() as i64;
    ((v >> k) as u16, -k)
}

/// Normalizes a nonzero `u64` to a 16-bit mantissa, returning the
/// mantissa and the exponent adjustment (`mantissa << -x == v` when `x`
/// is negative, `mantissa >> x == v` when `x` is positive).
#[inline]
fn norm64(v: u64) -> (u16, i64) {
    let c = v.leading_zeros() as i64;
    if c > 48 {
        let k = c - 48;
        ((v << k) as u16, k)
    } else if c < 47 {
        let k = 48 - c;
        ((v >> k) as u16, -k)
    } else if v >> 16 != 0 {
        ((v >> 1) as u16, -1)
    } else {
        (v as u16, 0)
    }
}

/// Folds one scale's `mu1_32`/`mu2_32`/`ref_sq`/`dis_sq`/`ref_dis`
/// planes into a numerator/denominator pair.
///
/// Pixels with `sigma1_sq < sigma_nsq` (including the numerically
/// degenerate case where the log-domain denominator would be
/// non-positive) fall back to a non-log accumulator; everything else
/// goes through the log table. The exponent bookkeeping
/// (`accum_x`/`num_accum_x`) for a high-variance pixel is recorded
/// before the degenerate check, and is *not* rolled back when that
/// pixel ultimately falls back to the non-log accumulator — this
/// matches the reference extractor's accumulation order exactly and is
/// required for the final reduction formula below to balance.
///
/// `width == 0 || height == 0` returns a `(1.0, 1.0)` pair directly,
/// since a decimated-away scale (a 1x1 input's scales 1-3) has no
/// pixels to fold and should read as a perfect match rather than 0/0.
#[allow(clippy::too_many_arguments)]
pub(crate) fn vif_statistic(
    mu1_32: &[u32],
    mu2_32: &[u32],
    ref_sq: &[u32],
    dis_sq: &[u32],
    ref_dis: &[u32],
    row_stride: usize,
    width: usize,
    height: usize,
    log_table: &LogTable,
) -> ScorePair {
    if width == 0 || height == 0 {
        // A scale decimated down to a zero-sized plane (e.g. scale 1+ of
        // a 1x1 frame) has no pixels to compare; treat it as a perfect
        // match rather than dividing zero by zero.
        return ScorePair { num: 1.0, den: 1.0 };
    }

    let mut accum_x: i64 = 0;
    let mut accum_x2: i64 = 0;
    let mut num_accum_x: i64 = 0;
    let mut accum_num_log: i64 = 0;
    let mut accum_den_log: i64 = 0;
    let mut accum_num_non_log: i64 = 0;
    let mut accum_den_non_log: i64 = 0;

    for y in 0..height {
        for x in 0..width {
            let idx = y * row_stride + x;

            let mu1_val = mu1_32[idx] as u64;
            let mu2_val = mu2_32[idx] as u64;
            let mu1_sq = ((mu1_val * mu1_val + (1u64 << 31)) >> 32) as u32;
            let mu2_sq = ((mu2_val * mu2_val + (1u64 << 31)) >> 32) as u32;
            let mu1_mu2 = ((mu1_val * mu2_val + (1u64 << 31)) >> 32) as u32;

            let sigma1_sq = ref_sq[idx].wrapping_sub(mu1_sq) as i32 as i64;
            let sigma2_sq = dis_sq[idx].wrapping_sub(mu2_sq) as i32 as i64;

            if sigma1_sq >= SIGMA_NSQ {
                let log_den_stage1 = (SIGMA_NSQ + sigma1_sq) as u32;
                let (mantissa, x_exp) = norm32(log_den_stage1);
                num_accum_x += 1;
                accum_x += x_exp;
                let den_val = log_table.lookup(mantissa);

                let sigma12 = ref_dis[idx].wrapping_sub(mu1_mu2) as i32 as i64;
                if sigma12 >= 0 {
                    // Reference keeps `numer1` as `int32_t`, so this sum
                    // wraps at 32 bits before widening back to i64 below.
                    let numer1 = (sigma2_sq as i32).wrapping_add(SIGMA_NSQ as i32) as i64;
                    let sigma12_sq = sigma12 * sigma12;
                    let numer1_tmp = numer1 * sigma1_sq;
                    let (numlog, x1) = norm64(numer1_tmp as u64);
                    let denom = numer1_tmp - sigma12_sq;
                    if denom > 0 {
                        let (denlog, x2) = norm64(denom as u64);
                        accum_x2 += x2 - x1;
                        let num_val = log_table.lookup(numlog) - log_table.lookup(denlog);
                        accum_num_log += num_val;
                        accum_den_log += den_val;
                    } else {
                        accum_num_non_log += sigma2_sq;
                        accum_den_non_log += 1;
                    }
                } else {
                    accum_den_log += den_val;
                }
            } else {
                accum_num_non_log += sigma2_sq;
                accum_den_non_log += 1;
            }
        }
    }

    let num = accum_num_log as f64 / 2048.0
        + accum_x2 as f64
        + (accum_den_non_log as f64 - (accum_num_non_log as f64 / 16384.0) / 65025.0);
    let den = accum_den_log as f64 / 2048.0 - (accum_x as f64 + num_accum_x as f64 * 17.0) + accum_den_non_log as f64;

    ScorePair { num, den }
}
