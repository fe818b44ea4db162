// SPDX-License-Identifier: LGPL-3.0-or-later

//! Apply a designed filter to audio.
//!
//! Every channel runs through its own processor with zeroed state, so
//! channels never share delay memory and repeated calls are bit-identical.

use log::error;
use wavfilt_dsp_lib::float::first_non_finite;

use crate::error::{FilterError, Result};
use crate::filters::designed::DesignedFilter;
use crate::signal::SignalBuffer;

/// Curve name reported when the filtered output contains NaN or infinity.
pub const FILTERED_SIGNAL: &str = "filtered signal";

/// Filter one channel from zeroed state.
///
/// This is the single path every sample-domain result goes through: the
/// filtered buffer, the impulse response and the time-domain response.
pub fn apply_channel(filter: &DesignedFilter, samples: &[f64]) -> Result<Vec<f64>> {
    if samples.is_empty() {
        return Err(FilterError::EmptySignal);
    }
    if let Some(index) = first_non_finite(samples) {
        return Err(FilterError::InvalidSample { channel: 0, index });
    }

    let mut out = vec![0.0; samples.len()];
    filter.processor().process(&mut out, samples);

    if let Some(index) = first_non_finite(&out) {
        error!(
            "apply: non-finite output at sample {index} for {}",
            filter.spec().fingerprint()
        );
        return Err(FilterError::ResponseComputation {
            curve: FILTERED_SIGNAL,
            index,
        });
    }
    Ok(out)
}

/// Filter every channel of `signal`, producing a new buffer with the same
/// sample rate, channel count and length.
///
/// The filter must have been designed for the signal's sample rate.
pub fn apply(filter: &DesignedFilter, signal: &SignalBuffer) -> Result<SignalBuffer> {
    if filter.sample_rate() != signal.sample_rate() {
        return Err(FilterError::invalid(
            "sample_rate",
            format!(
                "filter designed for {} Hz applied to a {} Hz signal",
                filter.sample_rate(),
                signal.sample_rate()
            ),
        ));
    }

    let channels = signal
        .channels()
        .enumerate()
        .map(|(ch, samples)| {
            apply_channel(filter, samples).map_err(|e| match e {
                FilterError::InvalidSample { index, .. } => {
                    FilterError::InvalidSample { channel: ch, index }
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    SignalBuffer::new(signal.sample_rate(), channels)
}
