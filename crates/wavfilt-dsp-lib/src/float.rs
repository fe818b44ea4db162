// SPDX-License-Identifier: LGPL-3.0-or-later

//! Floating-point checks and gain conversion helpers.

/// Magnitude floor used before taking a logarithm (-200 dB).
pub const GAIN_FLOOR: f64 = 1e-10;

/// Index of the first NaN or infinite value in `src`, if any.
pub fn first_non_finite(src: &[f64]) -> Option<usize> {
    src.iter().position(|x| !x.is_finite())
}

/// Convert a linear magnitude to decibels, flooring at [`GAIN_FLOOR`].
///
/// Zero and negative magnitudes map to -200 dB instead of `-inf`.
#[inline]
pub fn gain_to_db(mag: f64) -> f64 {
    20.0 * mag.max(GAIN_FLOOR).log10()
}

/// Convert decibels to a linear magnitude.
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    10.0f64.powf(db / 20.0)
}

/// Convert a buffer of linear magnitudes to floored decibels.
pub fn gain_to_db_buf(dst: &mut [f64], src: &[f64]) {
    assert!(dst.len() >= src.len(), "dst too small");
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d = gain_to_db(s);
    }
}
