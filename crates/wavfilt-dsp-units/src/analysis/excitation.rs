// SPDX-License-Identifier: LGPL-3.0-or-later

//! Inputs that drive a filter to produce a response curve.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::consts::{LOG_GRID_START_HZ, MAX_IMPULSE_LEN, MIN_IMPULSE_LEN};
use crate::error::{FilterError, Result};
use crate::signal::SignalBuffer;
use crate::units::nyquist;

/// Placement of frequency-response points between DC and Nyquist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    /// `k · nyquist / points` for `k = 0..points` (Nyquist excluded).
    #[default]
    Linear,
    /// Geometric from `min(20 Hz, nyquist / 100)` towards Nyquist
    /// (Nyquist excluded).
    Logarithmic,
}

/// Set of frequencies a sweep evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyGrid {
    pub points: usize,
    pub spacing: Spacing,
}

impl FrequencyGrid {
    pub fn linear(points: usize) -> Self {
        Self {
            points,
            spacing: Spacing::Linear,
        }
    }

    pub fn logarithmic(points: usize) -> Self {
        Self {
            points,
            spacing: Spacing::Logarithmic,
        }
    }

    /// Frequencies in Hz for a sample rate, strictly ascending and below
    /// Nyquist.
    pub fn frequencies(&self, sample_rate: u32) -> Result<Vec<f64>> {
        if self.points == 0 {
            return Err(FilterError::invalid("points", "frequency grid needs at least one point"));
        }
        if sample_rate == 0 {
            return Err(FilterError::invalid("sample_rate", "must be positive"));
        }
        let nyq = nyquist(f64::from(sample_rate));
        let n = self.points as f64;
        let freqs = match self.spacing {
            Spacing::Linear => (0..self.points).map(|k| k as f64 * nyq / n).collect(),
            Spacing::Logarithmic => {
                let start = LOG_GRID_START_HZ.min(nyq / 100.0);
                let ratio = nyq / start;
                (0..self.points)
                    .map(|k| start * ratio.powf(k as f64 / n))
                    .collect()
            }
        };
        Ok(freqs)
    }
}

/// How long an impulse response runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpulseLength {
    /// A fixed number of samples.
    Fixed(usize),
    /// A multiple of the filter's dominant time constant, clamped to
    /// `MIN_IMPULSE_LEN..=MAX_IMPULSE_LEN`.
    TimeConstants(f64),
}

impl ImpulseLength {
    /// Resolve to a sample count given a dominant time constant in samples.
    pub fn resolve(&self, time_constant: f64) -> Result<usize> {
        match *self {
            ImpulseLength::Fixed(0) => Err(FilterError::invalid(
                "impulse_len",
                "impulse response needs at least one sample",
            )),
            ImpulseLength::Fixed(n) => Ok(n),
            ImpulseLength::TimeConstants(m) => {
                if !(m.is_finite() && m > 0.0) {
                    return Err(FilterError::invalid(
                        "impulse_len",
                        format!("time-constant multiple {m} must be positive"),
                    ));
                }
                let want = (m * time_constant).ceil();
                let len = if want.is_finite() {
                    (want as usize).clamp(MIN_IMPULSE_LEN, MAX_IMPULSE_LEN)
                } else {
                    MAX_IMPULSE_LEN
                };
                Ok(len)
            }
        }
    }
}

/// The single input abstraction behind every response curve.
#[derive(Debug, Clone)]
pub enum Excitation {
    /// Evaluate the transfer function at the grid frequencies.
    Sweep(FrequencyGrid),
    /// Drive the cascade with a unit impulse of `len` samples.
    Impulse { len: usize },
    /// Drive the cascade with one channel of a real signal. The channel is
    /// always filtered from its first sample; `window` selects the part of
    /// the output that is returned.
    Signal {
        buffer: SignalBuffer,
        channel: usize,
        window: Option<Range<usize>>,
    },
}

/// Clip a requested sample window to a signal of `frames` samples.
///
/// `None` selects everything. An empty or out-of-range window is an error.
pub fn resolve_window(window: Option<&Range<usize>>, frames: usize) -> Result<Range<usize>> {
    let Some(w) = window else {
        return Ok(0..frames);
    };
    let end = w.end.min(frames);
    if w.start >= end {
        return Err(FilterError::invalid(
            "window",
            format!("window {}..{} selects no samples of {frames}", w.start, w.end),
        ));
    }
    Ok(w.start..end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_linear_grid_matches_freqz_layout() {
        let f = FrequencyGrid::linear(512).frequencies(44100).unwrap();
        assert_eq!(f.len(), 512);
        assert_eq!(f[0], 0.0);
        assert_approx_eq!(f64, f[1], 22050.0 / 512.0, ulps = 2);
        assert!(f[511] < 22050.0);
        assert!(f.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_log_grid() {
        let f = FrequencyGrid::logarithmic(100).frequencies(44100).unwrap();
        assert_eq!(f.len(), 100);
        assert_approx_eq!(f64, f[0], 20.0, ulps = 2);
        assert!(f[99] < 22050.0);
        assert!(f.windows(2).all(|w| w[0] < w[1]));
        // constant ratio between neighbours
        let r0 = f[1] / f[0];
        let r1 = f[99] / f[98];
        assert_approx_eq!(f64, r0, r1, epsilon = 1e-9);
    }

    #[test]
    fn test_log_grid_low_sample_rate_starts_lower() {
        let f = FrequencyGrid::logarithmic(10).frequencies(1000).unwrap();
        assert_approx_eq!(f64, f[0], 5.0, ulps = 2);
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(FrequencyGrid::linear(0).frequencies(44100).is_err());
    }

    #[test]
    fn test_impulse_length() {
        assert_eq!(ImpulseLength::Fixed(300).resolve(10.0).unwrap(), 300);
        assert!(ImpulseLength::Fixed(0).resolve(10.0).is_err());
        assert_eq!(ImpulseLength::TimeConstants(5.0).resolve(100.0).unwrap(), 500);
        assert_eq!(
            ImpulseLength::TimeConstants(5.0).resolve(1.0).unwrap(),
            MIN_IMPULSE_LEN
        );
        assert_eq!(
            ImpulseLength::TimeConstants(5.0).resolve(f64::INFINITY).unwrap(),
            MAX_IMPULSE_LEN
        );
        assert_eq!(
            ImpulseLength::TimeConstants(5.0).resolve(1e9).unwrap(),
            MAX_IMPULSE_LEN
        );
        assert!(ImpulseLength::TimeConstants(-1.0).resolve(10.0).is_err());
    }

    #[test]
    fn test_resolve_window() {
        assert_eq!(resolve_window(None, 10).unwrap(), 0..10);
        assert_eq!(resolve_window(Some(&(2..5)), 10).unwrap(), 2..5);
        assert_eq!(resolve_window(Some(&(2..50)), 10).unwrap(), 2..10);
        assert!(resolve_window(Some(&(10..12)), 10).is_err());
        assert!(resolve_window(Some(&(4..4)), 10).is_err());
    }
}
