// SPDX-License-Identifier: LGPL-3.0-or-later

//! Response analysis of designed filters.
//!
//! Every curve comes out of one primitive, [`ResponseAnalyzer::respond`],
//! driven by an [`Excitation`]:
//!
//! - a frequency sweep evaluates the transfer function of the exact cascade
//!   the applicator runs;
//! - an impulse and a real signal both go through
//!   [`apply_channel`](crate::filters::apply_channel), the same path that
//!   produces the filtered audio.
//!
//! Because of that, the time-domain curve of a request is bit-identical to
//! the filtered buffer persisted for download.

pub mod curve;
pub mod excitation;
pub mod spectrum;
pub mod waveform;

use std::ops::Range;

use log::{debug, error};
use wavfilt_dsp_lib::complex::{cascade_response_batch, complex_arg, complex_mag};
use wavfilt_dsp_lib::float::gain_to_db_buf;

use crate::consts::{DFL_FREQ_POINTS, DFL_IMPULSE_LEN};
use crate::error::{FilterError, Result};
use crate::filters::{DesignedFilter, FilterSpec, apply, apply_channel, design};
use crate::signal::SignalBuffer;
use crate::units::{hz_to_omega, samples_to_seconds};

pub use curve::{CurveKind, ResponseCurve};
pub use excitation::{Excitation, FrequencyGrid, ImpulseLength, Spacing};

use excitation::resolve_window;

/// The three curves the dashboard plots for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResponses {
    pub frequency: ResponseCurve,
    pub impulse: ResponseCurve,
    pub time_domain: ResponseCurve,
}

/// Everything one filter request produces.
#[derive(Debug, Clone)]
pub struct FilterRun {
    pub filter: DesignedFilter,
    pub filtered: SignalBuffer,
    pub responses: FilterResponses,
}

/// Configurable response analyzer.
///
/// # Examples
/// ```
/// use wavfilt_dsp_units::analysis::{ResponseAnalyzer, Spacing};
/// use wavfilt_dsp_units::filters::{FilterSpec, design};
///
/// let filter = design(&FilterSpec::lowpass(500.0, 2), 44100).unwrap();
/// let mut analyzer = ResponseAnalyzer::new();
/// analyzer.set_freq_points(256).set_spacing(Spacing::Logarithmic);
///
/// let curve = analyzer.frequency_response(&filter).unwrap();
/// assert_eq!(curve.len(), 256);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseAnalyzer {
    freq_points: usize,
    spacing: Spacing,
    impulse_len: ImpulseLength,
    channel: usize,
    window: Option<Range<usize>>,
}

impl Default for ResponseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseAnalyzer {
    /// Create an analyzer with default settings.
    ///
    /// Defaults: 512 linear frequency points, 512-sample impulse response,
    /// time-domain curve over the whole of channel 0.
    pub fn new() -> Self {
        Self {
            freq_points: DFL_FREQ_POINTS,
            spacing: Spacing::Linear,
            impulse_len: ImpulseLength::Fixed(DFL_IMPULSE_LEN),
            channel: 0,
            window: None,
        }
    }

    /// Set the number of frequency-response points.
    pub fn set_freq_points(&mut self, points: usize) -> &mut Self {
        self.freq_points = points;
        self
    }

    /// Set the frequency-point spacing.
    pub fn set_spacing(&mut self, spacing: Spacing) -> &mut Self {
        self.spacing = spacing;
        self
    }

    /// Set the impulse-response length policy.
    pub fn set_impulse_len(&mut self, len: ImpulseLength) -> &mut Self {
        self.impulse_len = len;
        self
    }

    /// Set the channel used for the time-domain curve.
    pub fn set_channel(&mut self, channel: usize) -> &mut Self {
        self.channel = channel;
        self
    }

    /// Restrict the time-domain curve to a sample window (`None` = all).
    pub fn set_window(&mut self, window: Option<Range<usize>>) -> &mut Self {
        self.window = window;
        self
    }

    /// Frequency grid this analyzer sweeps.
    pub fn grid(&self) -> FrequencyGrid {
        FrequencyGrid {
            points: self.freq_points,
            spacing: self.spacing,
        }
    }

    /// Compute one response curve of `filter` under `excitation`.
    ///
    /// Sweeps produce the magnitude response in dB; impulses and signals
    /// produce amplitude over time.
    pub fn respond(&self, filter: &DesignedFilter, excitation: &Excitation) -> Result<ResponseCurve> {
        let curve = match excitation {
            Excitation::Sweep(grid) => {
                let (freqs, mag, _) = sweep(filter, grid, true, false)?;
                ResponseCurve::new(
                    CurveKind::FrequencyResponse,
                    filter.title(CurveKind::FrequencyResponse.heading()),
                    freqs,
                    mag,
                )
            }
            Excitation::Impulse { len } => impulse(filter, *len),
            Excitation::Signal {
                buffer,
                channel,
                window,
            } => signal(filter, buffer, *channel, window.as_ref()),
        };
        curve.inspect_err(|e| log_defect(filter, e))
    }

    /// Magnitude response in dB over the configured grid.
    pub fn frequency_response(&self, filter: &DesignedFilter) -> Result<ResponseCurve> {
        self.respond(filter, &Excitation::Sweep(self.grid()))
    }

    /// Phase response in radians over the configured grid.
    pub fn phase_response(&self, filter: &DesignedFilter) -> Result<ResponseCurve> {
        let (freqs, _, phase) = sweep(filter, &self.grid(), false, true)?;
        ResponseCurve::new(
            CurveKind::PhaseResponse,
            filter.title(CurveKind::PhaseResponse.heading()),
            freqs,
            phase,
        )
        .inspect_err(|e| log_defect(filter, e))
    }

    /// Impulse response with the configured length policy.
    pub fn impulse_response(&self, filter: &DesignedFilter) -> Result<ResponseCurve> {
        let len = self.impulse_len.resolve(filter.dominant_time_constant())?;
        self.respond(filter, &Excitation::Impulse { len })
    }

    /// Time-domain curve read from an already filtered buffer.
    ///
    /// `filtered` must be the output of [`apply`] for `filter`; the curve
    /// holds exactly its samples for the configured channel and window.
    pub fn time_domain_response(
        &self,
        filter: &DesignedFilter,
        filtered: &SignalBuffer,
    ) -> Result<ResponseCurve> {
        let samples = filtered.try_channel(self.channel)?;
        let range = resolve_window(self.window.as_ref(), samples.len())?;
        time_curve(
            filter,
            CurveKind::TimeDomainResponse,
            filtered.sample_rate(),
            range.start,
            samples[range].to_vec(),
        )
    }

    /// Compute the three dashboard curves for a filter and the buffer
    /// the applicator produced with it.
    pub fn analyze(&self, filter: &DesignedFilter, filtered: &SignalBuffer) -> Result<FilterResponses> {
        Ok(FilterResponses {
            frequency: self.frequency_response(filter)?,
            impulse: self.impulse_response(filter)?,
            time_domain: self.time_domain_response(filter, filtered)?,
        })
    }

    /// Design, apply and analyze in one call.
    pub fn run(&self, spec: &FilterSpec, signal: &SignalBuffer) -> Result<FilterRun> {
        let filter = design(spec, signal.sample_rate())?;
        let filtered = apply(&filter, signal)?;
        let responses = self.analyze(&filter, &filtered)?;
        debug!(
            "analysis: {} over {} frames x {} channels done",
            spec.fingerprint(),
            signal.frames(),
            signal.channel_count()
        );
        Ok(FilterRun {
            filter,
            filtered,
            responses,
        })
    }
}

/// [`ResponseAnalyzer::run`] with default settings.
pub fn run(spec: &FilterSpec, signal: &SignalBuffer) -> Result<FilterRun> {
    ResponseAnalyzer::new().run(spec, signal)
}

fn log_defect(filter: &DesignedFilter, e: &FilterError) {
    if let FilterError::ResponseComputation { curve, index } = e {
        error!(
            "analysis: non-finite {curve} value at {index} for {}",
            filter.spec().fingerprint()
        );
    }
}

/// Evaluate the cascade over a grid; returns frequencies, magnitude in dB
/// and phase in radians (each only if requested, otherwise empty).
fn sweep(
    filter: &DesignedFilter,
    grid: &FrequencyGrid,
    want_mag: bool,
    want_phase: bool,
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let sr = filter.sample_rate();
    let freqs = grid.frequencies(sr)?;
    let omega: Vec<f64> = freqs.iter().map(|&f| hz_to_omega(f64::from(sr), f)).collect();

    let n = freqs.len();
    let mut re = vec![0.0; n];
    let mut im = vec![0.0; n];
    cascade_response_batch(&mut re, &mut im, filter.sections(), &omega);

    let mut mag_db = Vec::new();
    if want_mag {
        let mut mag = vec![0.0; n];
        complex_mag(&mut mag, &re, &im);
        mag_db = vec![0.0; n];
        gain_to_db_buf(&mut mag_db, &mag);
    }
    let mut phase = Vec::new();
    if want_phase {
        phase = vec![0.0; n];
        complex_arg(&mut phase, &re, &im);
    }
    Ok((freqs, mag_db, phase))
}

fn impulse(filter: &DesignedFilter, len: usize) -> Result<ResponseCurve> {
    if len == 0 {
        return Err(FilterError::invalid(
            "impulse_len",
            "impulse response needs at least one sample",
        ));
    }
    let mut unit = vec![0.0; len];
    unit[0] = 1.0;
    let response = apply_channel(filter, &unit).map_err(|e| rename_curve(e, CurveKind::ImpulseResponse))?;
    time_curve(filter, CurveKind::ImpulseResponse, filter.sample_rate(), 0, response)
}

fn signal(
    filter: &DesignedFilter,
    buffer: &SignalBuffer,
    channel: usize,
    window: Option<&Range<usize>>,
) -> Result<ResponseCurve> {
    let samples = buffer.try_channel(channel)?;
    let range = resolve_window(window, samples.len())?;
    // Filter from the first sample so the window sees the same state the
    // full-length application does.
    let mut out = apply_channel(filter, &samples[..range.end]).map_err(|e| match e {
        FilterError::InvalidSample { index, .. } => FilterError::InvalidSample { channel, index },
        other => rename_curve(other, CurveKind::TimeDomainResponse),
    })?;
    let tail = out.split_off(range.start);
    time_curve(
        filter,
        CurveKind::TimeDomainResponse,
        buffer.sample_rate(),
        range.start,
        tail,
    )
}

fn rename_curve(e: FilterError, kind: CurveKind) -> FilterError {
    match e {
        FilterError::ResponseComputation { index, .. } => FilterError::ResponseComputation {
            curve: kind.name(),
            index,
        },
        other => other,
    }
}

/// Amplitude-over-time curve whose first sample sits at `offset`.
fn time_curve(
    filter: &DesignedFilter,
    kind: CurveKind,
    sample_rate: u32,
    offset: usize,
    series: Vec<f64>,
) -> Result<ResponseCurve> {
    let sr = f64::from(sample_rate);
    let labels = (0..series.len())
        .map(|i| samples_to_seconds(sr, (offset + i) as f64))
        .collect();
    ResponseCurve::new(kind, filter.title(kind.heading()), labels, series)
}
