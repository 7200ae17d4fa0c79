// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The orchestrator: owns the scratch arena and log table for one
//! extractor instance and drives the four-scale pipeline per frame.

use crate::arena::ScratchArena;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::kernel::FilterBank;
use crate::log_table::LogTable;
use crate::plane::ArenaPlane;
use crate::reduce::{decimate, reduce, ReduceShift};
use crate::sink::FeatureSink;
use crate::statistic::{statistic, StatisticOutputs, StatisticShift};
use crate::vif_statistic::vif_statistic;

const FEATURE_NAMES: [&str; 4] = [
    "'VMAF_feature_vif_scale0_integer_score'",
    "'VMAF_feature_vif_scale1_integer_score'",
    "'VMAF_feature_vif_scale2_integer_score'",
    "'VMAF_feature_vif_scale3_integer_score'",
];

/// Owns the per-instance scratch arena and log table and drives the
/// four-scale VIF pipeline over one reference/distorted frame pair at
/// a time.
///
/// Construction allocates everything `extract` will ever need; a given
/// instance only ever processes frames of the width/height it was
/// built for.
pub struct VifExtractor {
    width: usize,
    height: usize,
    filters: FilterBank,
    log_table: LogTable,
    arena: ScratchArena,
}

impl VifExtractor {
    /// Allocates the scratch arena and log table for `width x height`
    /// frames. Fails with `Error::OutOfMemory` if either allocation
    /// fails; no partial state is left behind.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let arena = ScratchArena::new(width, height)?;
        let log_table = LogTable::new()?;
        debug!("vif extractor allocated for {width}x{height}");
        Ok(Self { width, height, filters: FilterBank::new(), log_table, arena })
    }

    /// Runs the four-scale pipeline on one reference/distorted pair and
    /// appends one feature value per scale to `sink`, in scale order.
    ///
    /// All four appends are attempted even if an earlier one fails;
    /// the first failure is returned once every scale has been
    /// emitted.
    pub fn extract(
        &mut self,
        reference: &Frame<'_>,
        distorted: &Frame<'_>,
        frame_index: u64,
        sink: &mut impl FeatureSink,
    ) -> Result<()> {
        if reference.width() != self.width || reference.height() != self.height {
            return Err(Error::InvalidFrame("reference frame geometry doesn't match extractor"));
        }
        if distorted.width() != self.width || distorted.height() != self.height {
            return Err(Error::InvalidFrame("distorted frame geometry doesn't match extractor"));
        }
        if reference.bit_depth() != distorted.bit_depth() {
            return Err(Error::InvalidFrame("reference and distorted bit depths differ"));
        }
        let bit_depth = reference.bit_depth();

        let row_stride = self.arena.row_stride();
        let mut cur_w = self.width;
        let mut cur_h = self.height;
        let mut first_err: Option<Error> = None;

        for s in 0..4usize {
            if s > 0 {
                let shift = ReduceShift::for_source_scale(s - 1, bit_depth);
                let kernel = self.filters.kernel(s);
                if s == 1 {
                    reduce(
                        reference,
                        distorted,
                        kernel,
                        &shift,
                        &mut self.arena.tmp_ref_convol[..],
                        &mut self.arena.tmp_dis_convol[..],
                        &mut self.arena.mu1[..],
                        &mut self.arena.mu2[..],
                        row_stride,
                    );
                } else {
                    let src_ref = ArenaPlane::new(&self.arena.ref_plane, row_stride, cur_w, cur_h);
                    let src_dis = ArenaPlane::new(&self.arena.dis_plane, row_stride, cur_w, cur_h);
                    reduce(
                        &src_ref,
                        &src_dis,
                        kernel,
                        &shift,
                        &mut self.arena.tmp_ref_convol[..],
                        &mut self.arena.tmp_dis_convol[..],
                        &mut self.arena.mu1[..],
                        &mut self.arena.mu2[..],
                        row_stride,
                    );
                }
                decimate(&self.arena.mu1, row_stride, cur_w, cur_h, &mut self.arena.ref_plane, row_stride);
                decimate(&self.arena.mu2, row_stride, cur_w, cur_h, &mut self.arena.dis_plane, row_stride);
                cur_w /= 2;
                cur_h /= 2;
            }

            let stat_shift = StatisticShift::for_scale(s, bit_depth);
            let kernel = self.filters.kernel(s);
            let mut outputs = StatisticOutputs {
                mu1_32: &mut self.arena.mu1_32[..],
                mu2_32: &mut self.arena.mu2_32[..],
                ref_sq: &mut self.arena.ref_sq[..],
                dis_sq: &mut self.arena.dis_sq[..],
                ref_dis: &mut self.arena.ref_dis[..],
                row_stride,
            };
            if s == 0 {
                statistic(
                    reference,
                    distorted,
                    kernel,
                    &stat_shift,
                    &mut self.arena.tmp_mu1[..],
                    &mut self.arena.tmp_mu2[..],
                    &mut self.arena.tmp_ref[..],
                    &mut self.arena.tmp_dis[..],
                    &mut self.arena.tmp_ref_dis[..],
                    &mut outputs,
                );
            } else {
                let src_ref = ArenaPlane::new(&self.arena.ref_plane, row_stride, cur_w, cur_h);
                let src_dis = ArenaPlane::new(&self.arena.dis_plane, row_stride, cur_w, cur_h);
                statistic(
                    &src_ref,
                    &src_dis,
                    kernel,
                    &stat_shift,
                    &mut self.arena.tmp_mu1[..],
                    &mut self.arena.tmp_mu2[..],
                    &mut self.arena.tmp_ref[..],
                    &mut self.arena.tmp_dis[..],
                    &mut self.arena.tmp_ref_dis[..],
                    &mut outputs,
                );
            }

            let pair = vif_statistic(
                &self.arena.mu1_32,
                &self.arena.mu2_32,
                &self.arena.ref_sq,
                &self.arena.dis_sq,
                &self.arena.ref_dis,
                row_stride,
                cur_w,
                cur_h,
                &self.log_table,
            );
            let score = pair.num / pair.den;
            if !score.is_finite() {
                debug!("vif scale {s} produced a non-finite score (den={})", pair.den);
            }
            if let Err(e) = sink.append(FEATURE_NAMES[s], frame_index, score) {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::VifExtractor;
    use crate::frame::Frame;
    use crate::sink::VecSink;

    fn constant_frame_bytes(width: usize, height: usize, value: u8) -> Vec<u8> {
        vec![value; width * height]
    }

    #[test]
    fn identical_constant_frames_score_one() {
        let (w, h) = (32, 32);
        let data = constant_frame_bytes(w, h, 128);
        let reference = Frame::new(w, h, 8, w, &data).unwrap();
        let distorted = Frame::new(w, h, 8, w, &data).unwrap();

        let mut extractor = VifExtractor::new(w, h).unwrap();
        let mut sink = VecSink::new();
        extractor.extract(&reference, &distorted, 0, &mut sink).unwrap();

        for name in super::FEATURE_NAMES {
            let value = sink.value(name, 0).unwrap();
            assert!((value - 1.0).abs() < 1e-6, "{name} = {value}");
        }
    }

    #[test]
    fn mismatched_geometry_is_rejected() {
        let data8 = constant_frame_bytes(8, 8, 10);
        let data16 = constant_frame_bytes(16, 16, 10);
        let small = Frame::new(8, 8, 8, 8, &data8).unwrap();
        let big = Frame::new(16, 16, 8, 16, &data16).unwrap();

        let mut extractor = VifExtractor::new(8, 8).unwrap();
        let mut sink = VecSink::new();
        assert!(extractor.extract(&small, &big, 0, &mut sink).is_err());
    }
}
