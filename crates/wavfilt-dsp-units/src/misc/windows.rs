// SPDX-License-Identifier: LGPL-3.0-or-later

//! Tapering windows for spectrum analysis.
//!
//! All windows except the rectangular one are cosine sums
//! `w[i] = a0 - a1*cos(2πi/(N-1)) + a2*cos(4πi/(N-1))`, symmetric over the
//! destination length. Windows shorter than two samples are all ones.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Window applied before a spectrum FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    #[default]
    Hann,
    Hamming,
    /// Classic Blackman (`a0 = 0.42`).
    Blackman,
    /// No tapering.
    Rectangular,
}

impl WindowType {
    /// Cosine-sum coefficients `[a0, a1, a2]`.
    fn coefficients(self) -> [f64; 3] {
        match self {
            WindowType::Hann => [0.5, 0.5, 0.0],
            WindowType::Hamming => [0.54, 0.46, 0.0],
            WindowType::Blackman => [0.42, 0.5, 0.08],
            WindowType::Rectangular => [1.0, 0.0, 0.0],
        }
    }
}

/// Fill `dst` with the window of its length.
///
/// # Examples
/// ```
/// use wavfilt_dsp_units::misc::windows::{window, WindowType};
///
/// let mut taper = vec![0.0; 5];
/// window(&mut taper, WindowType::Hann);
/// assert_eq!(taper[2], 1.0);
/// ```
pub fn window(dst: &mut [f64], window_type: WindowType) {
    let [a0, a1, a2] = window_type.coefficients();
    let n = dst.len();
    if n < 2 || window_type == WindowType::Rectangular {
        dst.fill(1.0);
        return;
    }

    let step = 2.0 * PI / (n - 1) as f64;
    for (i, w) in dst.iter_mut().enumerate() {
        let phase = i as f64 * step;
        *w = a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn make(n: usize, t: WindowType) -> Vec<f64> {
        let mut w = vec![f64::NAN; n];
        window(&mut w, t);
        w
    }

    #[test]
    fn test_endpoints_and_centre() {
        // (type, endpoint value, centre value)
        let cases = [
            (WindowType::Hann, 0.0, 1.0),
            (WindowType::Hamming, 0.08, 1.0),
            (WindowType::Blackman, 0.0, 1.0),
            (WindowType::Rectangular, 1.0, 1.0),
        ];
        for (t, edge, centre) in cases {
            let w = make(129, t);
            assert_approx_eq!(f64, w[0], edge, epsilon = 1e-12);
            assert_approx_eq!(f64, w[128], edge, epsilon = 1e-12);
            assert_approx_eq!(f64, w[64], centre, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_symmetric() {
        for t in [WindowType::Hann, WindowType::Hamming, WindowType::Blackman] {
            let w = make(100, t);
            for i in 0..50 {
                assert_approx_eq!(f64, w[i], w[99 - i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_hann_sum() {
        // A symmetric Hann window of N samples sums to (N - 1) / 2.
        let w = make(1001, WindowType::Hann);
        assert_approx_eq!(f64, w.iter().sum::<f64>(), 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_short_windows_are_ones() {
        assert_eq!(make(1, WindowType::Blackman), vec![1.0]);
        assert!(make(0, WindowType::Hann).is_empty());
        let two = make(2, WindowType::Hamming);
        assert_approx_eq!(f64, two[1], 0.08, epsilon = 1e-12);
    }

    #[test]
    fn test_rectangular_ignores_length() {
        for n in [2, 3, 33] {
            assert!(make(n, WindowType::Rectangular).iter().all(|&x| x == 1.0));
        }
    }
}
