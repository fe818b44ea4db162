// SPDX-License-Identifier: LGPL-3.0-or-later

//! Windowed magnitude spectrum of a signal channel.
//!
//! The whole channel (up to 2^20 samples) is windowed, zero-padded to the
//! next power of two and transformed once. Magnitudes are scaled to the
//! amplitude of a full-scale sine and reported in dB with a -200 dB floor.

use wavfilt_dsp_lib::fft::{FftState, MAX_RANK, rank_for_len};
use wavfilt_dsp_lib::float::gain_to_db;

use crate::analysis::curve::{CurveKind, ResponseCurve};
use crate::error::Result;
use crate::misc::windows::{self, WindowType};
use crate::signal::SignalBuffer;

/// Magnitude spectrum of channel `channel` of `signal`.
///
/// # Examples
/// ```
/// use wavfilt_dsp_units::analysis::spectrum::signal_spectrum;
/// use wavfilt_dsp_units::misc::windows::WindowType;
/// use wavfilt_dsp_units::signal::SignalBuffer;
///
/// let sig = SignalBuffer::mono(8000, vec![0.0; 1000]).unwrap();
/// let spectrum = signal_spectrum(&sig, 0, WindowType::Hann).unwrap();
/// assert_eq!(spectrum.len(), 513); // 1024-point FFT, DC..Nyquist
/// ```
pub fn signal_spectrum(
    signal: &SignalBuffer,
    channel: usize,
    window_type: WindowType,
) -> Result<ResponseCurve> {
    let samples = signal.try_channel(channel)?;
    let len = samples.len().min(1 << MAX_RANK);
    let samples = &samples[..len];

    let mut window = vec![0.0; len];
    windows::window(&mut window, window_type);
    let norm: f64 = window.iter().sum();
    let windowed: Vec<f64> = samples.iter().zip(window.iter()).map(|(x, w)| x * w).collect();

    let rank = rank_for_len(len);
    let mut state = FftState::new(rank);
    let n = state.len();
    let bins = n / 2 + 1;
    let mut mag = vec![0.0; bins];
    state.real_magnitude(&mut mag, &windowed);

    let scale = if norm > 0.0 { 2.0 / norm } else { 0.0 };
    let series: Vec<f64> = mag.iter().map(|&m| gain_to_db(m * scale)).collect();
    let fs = f64::from(signal.sample_rate());
    let labels: Vec<f64> = (0..bins).map(|k| k as f64 * fs / n as f64).collect();

    ResponseCurve::new(CurveKind::Spectrum, "Spectral Content", labels, series)
}
