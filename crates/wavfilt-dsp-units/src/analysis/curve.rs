// SPDX-License-Identifier: LGPL-3.0-or-later

//! Read-only response curves.

use serde::{Deserialize, Serialize};
use wavfilt_dsp_lib::float::first_non_finite;
use wavfilt_dsp_lib::search::imin_max;

use crate::error::{FilterError, Result};

/// What a curve measures; fixes its axis labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    FrequencyResponse,
    PhaseResponse,
    ImpulseResponse,
    TimeDomainResponse,
    Spectrum,
    Waveform,
}

impl CurveKind {
    /// Lower-case name used in error reports and logs.
    pub fn name(self) -> &'static str {
        match self {
            CurveKind::FrequencyResponse => "frequency response",
            CurveKind::PhaseResponse => "phase response",
            CurveKind::ImpulseResponse => "impulse response",
            CurveKind::TimeDomainResponse => "time domain response",
            CurveKind::Spectrum => "spectrum",
            CurveKind::Waveform => "waveform",
        }
    }

    /// Title-case name used in plot titles.
    pub fn heading(self) -> &'static str {
        match self {
            CurveKind::FrequencyResponse => "Frequency Response",
            CurveKind::PhaseResponse => "Phase Response",
            CurveKind::ImpulseResponse => "Impulse Response",
            CurveKind::TimeDomainResponse => "Time Domain Response",
            CurveKind::Spectrum => "Spectrum",
            CurveKind::Waveform => "Normalized Waveform",
        }
    }

    pub fn x_label(self) -> &'static str {
        match self {
            CurveKind::FrequencyResponse | CurveKind::PhaseResponse | CurveKind::Spectrum => {
                "Frequency (Hz)"
            }
            CurveKind::ImpulseResponse | CurveKind::TimeDomainResponse | CurveKind::Waveform => {
                "Time (seconds)"
            }
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            CurveKind::FrequencyResponse | CurveKind::Spectrum => "Magnitude (dB)",
            CurveKind::PhaseResponse => "Phase (radians)",
            CurveKind::ImpulseResponse | CurveKind::TimeDomainResponse => "Amplitude",
            CurveKind::Waveform => "Amplitude (normalized)",
        }
    }
}

/// A labeled, finite data series.
///
/// `labels` and `series` always have equal length and contain only finite
/// values; both are checked when the curve is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
    kind: CurveKind,
    title: String,
    labels: Vec<f64>,
    series: Vec<f64>,
}

impl ResponseCurve {
    /// Build a curve, rejecting mismatched lengths and non-finite values.
    pub fn new(
        kind: CurveKind,
        title: impl Into<String>,
        labels: Vec<f64>,
        series: Vec<f64>,
    ) -> Result<Self> {
        if labels.len() != series.len() {
            return Err(FilterError::ResponseComputation {
                curve: kind.name(),
                index: labels.len().min(series.len()),
            });
        }
        let bad = first_non_finite(&series).or_else(|| first_non_finite(&labels));
        if let Some(index) = bad {
            return Err(FilterError::ResponseComputation {
                curve: kind.name(),
                index,
            });
        }
        Ok(Self {
            kind,
            title: title.into(),
            labels,
            series,
        })
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn series(&self) -> &[f64] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn x_label(&self) -> &'static str {
        self.kind.x_label()
    }

    pub fn y_label(&self) -> &'static str {
        self.kind.y_label()
    }

    /// Peak-preserving reduction to roughly `max_points` points.
    ///
    /// The curve is cut into at most `max_points / 2` equal buckets;
    /// each bucket contributes its minimum and maximum in index order, so
    /// every local extreme that a plot would show survives. A curve that
    /// already fits is returned unchanged. `max_points` below 2 is treated
    /// as 2.
    pub fn decimated(&self, max_points: usize) -> ResponseCurve {
        let max_points = max_points.max(2);
        if self.len() <= max_points {
            return self.clone();
        }

        let bucket = self.len().div_ceil(max_points / 2);
        let mut labels = Vec::with_capacity(max_points);
        let mut series = Vec::with_capacity(max_points);
        for (start, chunk) in (0..self.len())
            .step_by(bucket)
            .zip(self.series.chunks(bucket))
        {
            let (imn, imx) = imin_max(chunk);
            let (first, second) = if imn <= imx { (imn, imx) } else { (imx, imn) };
            labels.push(self.labels[start + first]);
            series.push(chunk[first]);
            if second != first {
                labels.push(self.labels[start + second]);
                series.push(chunk[second]);
            }
        }

        ResponseCurve {
            kind: self.kind,
            title: self.title.clone(),
            labels,
            series,
        }
    }
}
