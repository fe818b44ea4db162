// SPDX-License-Identifier: LGPL-3.0-or-later

//! Forward FFT of real signals on top of `rustfft`.
//!
//! Sizes are powers of two given by their `rank` (`n = 2^rank`). A plan is
//! built once per [`FftState`] and reused together with its scratch buffer.

use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Largest supported rank (2^20 points).
pub const MAX_RANK: usize = 20;

/// Planned forward transform of one size.
///
/// # Examples
/// ```
/// use wavfilt_dsp_lib::fft::FftState;
///
/// let mut state = FftState::new(10);
/// let mut mag = vec![0.0; state.len() / 2 + 1];
/// state.real_magnitude(&mut mag, &[1.0, 0.5, 0.25]);
/// assert!(mag.iter().all(|m| *m > 0.0));
/// ```
#[derive(Clone)]
pub struct FftState {
    rank: usize,
    plan: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl std::fmt::Debug for FftState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftState")
            .field("rank", &self.rank)
            .finish_non_exhaustive()
    }
}

impl FftState {
    /// Plan a transform of `2^rank` points. `rank` is capped at [`MAX_RANK`].
    pub fn new(rank: usize) -> Self {
        let rank = rank.min(MAX_RANK);
        let n = 1usize << rank;
        let plan = FftPlanner::new().plan_fft_forward(n);
        Self {
            rank,
            plan,
            scratch: vec![Complex64::default(); n],
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Transform length.
    pub fn len(&self) -> usize {
        self.scratch.len()
    }

    /// Always `false`; the smallest transform has one point.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// In-place forward transform of exactly [`len`](Self::len) points.
    pub fn forward(&mut self, buf: &mut [Complex64]) {
        assert_eq!(buf.len(), self.len(), "buffer does not match transform length");
        self.plan.process(buf);
    }

    /// Magnitudes of bins `0..=n/2` (DC through Nyquist) of a real signal.
    ///
    /// `src` shorter than the transform is zero-padded; extra samples are
    /// ignored.
    pub fn real_magnitude(&mut self, dst: &mut [f64], src: &[f64]) {
        let bins = self.len() / 2 + 1;
        assert!(dst.len() >= bins);

        let padded = src.iter().copied().chain(std::iter::repeat(0.0));
        for (slot, x) in self.scratch.iter_mut().zip(padded) {
            *slot = Complex64::new(x, 0.0);
        }
        self.plan.process(&mut self.scratch);

        for (d, c) in dst[..bins].iter_mut().zip(&self.scratch) {
            *d = c.norm();
        }
    }
}

/// Smallest rank whose transform holds `len` samples, capped at [`MAX_RANK`].
pub fn rank_for_len(len: usize) -> usize {
    len.max(1)
        .checked_next_power_of_two()
        .map_or(MAX_RANK, |n| (n.trailing_zeros() as usize).min(MAX_RANK))
}
