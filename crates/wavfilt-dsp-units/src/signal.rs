// SPDX-License-Identifier: LGPL-3.0-or-later

//! Decoded, normalized audio held in memory.
//!
//! A [`SignalBuffer`] is validated once at construction and never mutated
//! afterwards. Clones share the sample storage, so handing a buffer to
//! several concurrent requests costs a reference-count bump.

use std::sync::Arc;

use wavfilt_dsp_lib::float::first_non_finite;

use crate::error::{FilterError, Result};

/// Multi-channel audio at a fixed sample rate.
///
/// Invariants: at least one channel, every channel has the same non-zero
/// length, every sample is finite, `sample_rate > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBuffer {
    sample_rate: u32,
    channels: Arc<[Vec<f64>]>,
}

impl SignalBuffer {
    /// Build a buffer from per-channel sample vectors.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f64>>) -> Result<Self> {
        if channels.is_empty() {
            return Err(FilterError::EmptySignal);
        }
        if sample_rate == 0 {
            return Err(FilterError::invalid("sample_rate", "must be positive"));
        }
        let frames = channels[0].len();
        if let Some(ch) = channels.iter().position(|c| c.len() != frames) {
            return Err(FilterError::invalid(
                "channels",
                format!(
                    "channel {ch} has {} samples, expected {frames}",
                    channels[ch].len()
                ),
            ));
        }
        if frames == 0 {
            return Err(FilterError::EmptySignal);
        }
        for (channel, samples) in channels.iter().enumerate() {
            if let Some(index) = first_non_finite(samples) {
                return Err(FilterError::InvalidSample { channel, index });
            }
        }
        Ok(Self {
            sample_rate,
            channels: channels.into(),
        })
    }

    /// Build a single-channel buffer.
    pub fn mono(sample_rate: u32, samples: Vec<f64>) -> Result<Self> {
        Self::new(sample_rate, vec![samples])
    }

    /// Build a buffer from interleaved frames (`L R L R ...`).
    pub fn from_interleaved(sample_rate: u32, channel_count: usize, data: &[f64]) -> Result<Self> {
        if channel_count == 0 {
            return Err(FilterError::invalid("channels", "channel count must be positive"));
        }
        if data.len() % channel_count != 0 {
            return Err(FilterError::invalid(
                "channels",
                format!(
                    "{} samples do not divide into {channel_count} channels",
                    data.len()
                ),
            ));
        }
        let frames = data.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in data.chunks_exact(channel_count) {
            for (ch, &s) in channels.iter_mut().zip(frame.iter()) {
                ch.push(s);
            }
        }
        Self::new(sample_rate, channels)
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (always at least one).
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel (always at least one).
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    /// Samples of channel `index`, or `None` if out of range.
    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Samples of channel `index`, or `InvalidSpecification` on `channel`.
    pub fn try_channel(&self, index: usize) -> Result<&[f64]> {
        self.channel(index).ok_or_else(|| {
            FilterError::invalid(
                "channel",
                format!(
                    "channel {index} out of range for {} channels",
                    self.channel_count()
                ),
            )
        })
    }

    /// Iterate over all channels in order.
    pub fn channels(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Export as interleaved frames.
    pub fn to_interleaved(&self) -> Vec<f64> {
        let count = self.channel_count();
        let mut out = Vec::with_capacity(self.frames() * count);
        for i in 0..self.frames() {
            out.extend(self.channels.iter().map(|c| c[i]));
        }
        out
    }
}
