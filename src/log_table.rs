// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The base-2 logarithm lookup table shared by all four scales'
//! `VifStatistic` accumulation.
//!
//! `log2f_approx` below is only ever called while building the table at
//! construction time; every per-pixel lookup at `extract` time is a
//! single array index. The polynomial coefficients and the IEEE-754
//! field extraction are bit-identical to the reference extractor so
//! that `LogTable` entries match its floating-point `log2` within a
//! tight tolerance.

use fallible_collections::TryVec;

use crate::error::Result;

const EXP_ZERO_CONST: u32 = 0x3F80_0000;
const EXP_EXPO_MASK: u32 = 0x7F80_0000;
const EXP_MANT_MASK: u32 = 0x007F_FFFF;

#[rustfmt::skip]
const LOG2_POLY: [f32; 9] = [
    -0.012671635276421, 0.064841182402670,
    -0.157048836463065, 0.257167726303123,
    -0.353800560300520, 0.480131410397451,
    -0.721314327952201, 1.442694803896991, 0.0,
];

fn horner(x: f32) -> f32 {
    LOG2_POLY.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// A minimax-polynomial approximation of `log2(x)`, accurate enough for
/// the `LogTable` tolerance invariant but far cheaper than a transcendental
/// call. `x` is decomposed into an IEEE-754 exponent and mantissa via safe
/// bit reinterpretation rather than the reference implementation's
/// `memcpy`-based type punning.
fn log2f_approx(x: f32) -> f32 {
    if x == 0.0 {
        return f32::NEG_INFINITY;
    }
    if x < 0.0 {
        return f32::NAN;
    }

    let bits = x.to_bits();
    let exponent = (bits & EXP_EXPO_MASK) >> 23;
    let mantissa = bits & EXP_MANT_MASK;
    let remain = f32::from_bits(mantissa | EXP_ZERO_CONST);

    let log_base = exponent as i32 - 127;
    let log_remain = horner(remain - 1.0);

    log_base as f32 + log_remain
}

/// A 65536-entry table of `round(log2(i) * 2048)`, populated for
/// `i in 32767..=65535`. Entries below that are never looked up (every
/// caller normalizes its mantissa into `[2^15, 2^16)` before indexing)
/// and are left at zero.
pub(crate) struct LogTable {
    values: TryVec<u16>,
}

impl LogTable {
    pub(crate) fn new() -> Result<Self> {
        let mut values = TryVec::with_capacity(65536)?;
        values.resize_with(65536, || 0u16)?;
        for i in 32767..65536u32 {
            values[i as usize] = (log2f_approx(i as f32) * 2048.0).round() as u16;
        }
        Ok(Self { values })
    }

    #[inline]
    pub(crate) fn lookup(&self, mantissa: u16) -> i64 {
        self.values[mantissa as usize] as i64
    }
}

#[cfg(test)]
mod tests {
    use super::LogTable;

    #[test]
    fn matches_log2_within_tolerance() {
        let table = LogTable::new().unwrap();
        for i in 32767..65536u32 {
            let approx = table.lookup(i as u16) as f64 / 2048.0;
            let exact = (i as f64).log2();
            assert!(
                (approx - exact).abs() <= 1e-3,
                "i={i} approx={approx} exact={exact}"
            );
        }
    }

    #[test]
    fn output_range_is_within_documented_bounds() {
        let table = LogTable::new().unwrap();
        for i in 32767..65536u32 {
            let v = table.lookup(i as u16);
            assert!((14 * 2048..=16 * 2048).contains(&v), "i={i} v={v}");
        }
    }
}
