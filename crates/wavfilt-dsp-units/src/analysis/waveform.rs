// SPDX-License-Identifier: LGPL-3.0-or-later

//! Peak-normalized waveform of a signal channel.

use wavfilt_dsp_lib::search::imin_max;

use crate::analysis::curve::{CurveKind, ResponseCurve};
use crate::error::Result;
use crate::signal::SignalBuffer;
use crate::units::samples_to_seconds;

/// Channel `channel` of `signal` divided by its peak absolute value,
/// against time in seconds. A silent channel stays all zeros.
///
/// # Examples
/// ```
/// use wavfilt_dsp_units::analysis::waveform::normalized_waveform;
/// use wavfilt_dsp_units::signal::SignalBuffer;
///
/// let sig = SignalBuffer::mono(4, vec![0.0, 0.25, -0.5, 0.1]).unwrap();
/// let wave = normalized_waveform(&sig, 0).unwrap();
/// assert_eq!(wave.series(), &[0.0, 0.5, -1.0, 0.2]);
/// assert_eq!(wave.labels()[2], 0.5);
/// ```
pub fn normalized_waveform(signal: &SignalBuffer, channel: usize) -> Result<ResponseCurve> {
    let samples = signal.try_channel(channel)?;
    let (imn, imx) = imin_max(samples);
    let peak = samples[imn].abs().max(samples[imx].abs());

    let series: Vec<f64> = if peak > 0.0 {
        samples.iter().map(|&x| x / peak).collect()
    } else {
        vec![0.0; samples.len()]
    };
    let sr = f64::from(signal.sample_rate());
    let labels = (0..samples.len())
        .map(|i| samples_to_seconds(sr, i as f64))
        .collect();

    ResponseCurve::new(
        CurveKind::Waveform,
        CurveKind::Waveform.heading(),
        labels,
        series,
    )
}
