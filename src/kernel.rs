// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The four fixed 1-D Gaussian kernels shared by `ReduceFilter` and
//! `StatisticFilter`.
//!
//! Coefficients are Q16 unsigned (each kernel sums to `65536`) and are
//! bit-identical to the reference extractor's lookup table; changing any
//! one of them changes every downstream score.

use arrayvec::ArrayVec;

/// Max kernel width, used to size the fixed-capacity coefficient storage.
pub(crate) const MAX_KERNEL_WIDTH: usize = 17;

const KERNEL_0: [u16; 17] = [
    489, 935, 1640, 2640, 3896, 5274, 6547, 7455, 7784, 7455, 6547, 5274, 3896, 2640, 1640, 935, 489,
];
const KERNEL_1: [u16; 9] = [1244, 3663, 7925, 12590, 14692, 12590, 7925, 3663, 1244];
const KERNEL_2: [u16; 5] = [3571, 16004, 26386, 16004, 3571];
const KERNEL_3: [u16; 3] = [10904, 43728, 10904];

/// The four immutable symmetric kernels, one per pyramid scale.
pub(crate) struct FilterBank {
    kernels: [ArrayVec<u16, MAX_KERNEL_WIDTH>; 4],
}

impl FilterBank {
    pub(crate) fn new() -> Self {
        let mut kernels: [ArrayVec<u16, MAX_KERNEL_WIDTH>; 4] = Default::default();
        kernels[0].extend(KERNEL_0);
        kernels[1].extend(KERNEL_1);
        kernels[2].extend(KERNEL_2);
        kernels[3].extend(KERNEL_3);
        for k in &kernels {
            debug_assert_eq!(k.iter().map(|&c| c as u32).sum::<u32>(), 1 << 16);
        }
        Self { kernels }
    }

    /// The kernel used at pyramid scale `s` (0..=3), for both the
    /// reduce pass producing scale `s` and the statistic pass run at
    /// scale `s`.
    #[inline]
    pub(crate) fn kernel(&self, scale: usize) -> &[u16] {
        &self.kernels[scale]
    }
}

#[cfg(test)]
mod tests {
    use super::FilterBank;

    #[test]
    fn kernels_sum_to_q16_unity() {
        let bank = FilterBank::new();
        for scale in 0..4 {
            let sum: u32 = bank.kernel(scale).iter().map(|&c| c as u32).sum();
            assert_eq!(sum, 1 << 16, "scale {scale} kernel must sum to 65536");
        }
    }

    #[test]
    fn kernels_are_symmetric() {
        let bank = FilterBank::new();
        for scale in 0..4 {
            let k = bank.kernel(scale);
            for i in 0..k.len() {
                assert_eq!(k[i], k[k.len() - 1 - i]);
            }
        }
    }

    #[test]
    fn widths_match_spec() {
        let bank = FilterBank::new();
        assert_eq!(bank.kernel(0).len(), 17);
        assert_eq!(bank.kernel(1).len(), 9);
        assert_eq!(bank.kernel(2).len(), 5);
        assert_eq!(bank.kernel(3).len(), 3);
    }
}
