// SPDX-License-Identifier: LGPL-3.0-or-later

//! Unit conversion functions.
//!
//! Time, frequency and gain conversions shared by the designer and the
//! analyzer.

use std::f64::consts::PI;

pub use wavfilt_dsp_lib::float::{db_to_gain, gain_to_db};

/// Convert sample index to seconds.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `samples` - Number of samples
#[inline]
pub fn samples_to_seconds(sr: f64, samples: f64) -> f64 {
    samples / sr
}

/// Nyquist frequency for a sample rate.
#[inline]
pub fn nyquist(sr: f64) -> f64 {
    sr * 0.5
}

/// Convert frequency in Hz to normalized angular frequency (radians/sample).
#[inline]
pub fn hz_to_omega(sr: f64, freq: f64) -> f64 {
    2.0 * PI * freq / sr
}

/// Pre-warp a digital frequency to the analog frequency that the bilinear
/// transform maps back onto it.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `freq` - Digital frequency in Hz (`0 < freq < sr / 2`)
///
/// # Returns
/// Analog angular frequency `2·sr·tan(π·freq/sr)` in rad/s
#[inline]
pub fn prewarp(sr: f64, freq: f64) -> f64 {
    2.0 * sr * (PI * freq / sr).tan()
}

/// Time constant in samples of a pole with radius `r` (`0 < r < 1`):
/// the number of samples for its envelope to decay by `1/e`.
///
/// Returns `0.0` for `r <= 0` and `f64::INFINITY` for `r >= 1`.
#[inline]
pub fn pole_time_constant(r: f64) -> f64 {
    if r <= 0.0 {
        0.0
    } else if r >= 1.0 {
        f64::INFINITY
    } else {
        -1.0 / r.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_time_conversions() {
        assert_approx_eq!(f64, samples_to_seconds(44100.0, 44100.0), 1.0, ulps = 1);
        assert_approx_eq!(f64, samples_to_seconds(8000.0, 4.0), 0.0005, ulps = 2);
    }

    #[test]
    fn test_frequency_conversions() {
        assert_approx_eq!(f64, nyquist(44100.0), 22050.0, ulps = 1);
        assert_approx_eq!(f64, hz_to_omega(48000.0, 24000.0), PI, ulps = 2);
        assert_approx_eq!(f64, hz_to_omega(48000.0, 0.0), 0.0, ulps = 1);
    }

    #[test]
    fn test_prewarp_low_frequency_is_nearly_linear() {
        // For f << fs, tan(x) ~ x, so the warped value approaches 2πf.
        let w = prewarp(48000.0, 10.0);
        assert_approx_eq!(f64, w, 2.0 * PI * 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_prewarp_grows_near_nyquist() {
        let fs = 8000.0;
        assert!(prewarp(fs, 3900.0) > 2.0 * PI * 3900.0 * 5.0);
    }

    #[test]
    fn test_pole_time_constant() {
        assert_eq!(pole_time_constant(0.0), 0.0);
        assert!(pole_time_constant(1.0).is_infinite());
        // e^-1 radius decays by 1/e per sample
        assert_approx_eq!(f64, pole_time_constant((-1.0f64).exp()), 1.0, epsilon = 1e-12);
        assert!(pole_time_constant(0.999) > pole_time_constant(0.9));
    }

    #[test]
    fn test_gain_reexports() {
        assert_approx_eq!(f64, gain_to_db(db_to_gain(-12.0)), -12.0, epsilon = 1e-9);
    }
}
