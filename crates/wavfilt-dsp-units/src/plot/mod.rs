// SPDX-License-Identifier: LGPL-3.0-or-later

//! Chart-library-agnostic plot series.
//!
//! Serialization copies a curve's numbers unchanged and attaches only
//! presentation hints: dataset name, chart type, fill and colours. The
//! JSON layout (`labels` plus a `datasets` list with camel-case style keys)
//! is what common browser chart libraries consume directly.

use serde::{Deserialize, Serialize};

use crate::analysis::{CurveKind, FilterResponses, ResponseCurve};

/// Dataset label used when the caller passes an empty one.
pub const DEFAULT_LABEL: &str = "Plot";

/// Chart type of one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotType {
    #[default]
    Line,
    Bar,
    Area,
    Scatter,
}

/// Presentation hints for a dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlotStyle {
    pub plot_type: PlotType,
    pub border_color: Option<String>,
    pub background_color: Option<String>,
    pub point_radius: Option<f64>,
}

impl PlotStyle {
    /// Default look for a curve kind: thin lines without point markers,
    /// one colour per kind.
    pub fn for_kind(kind: CurveKind) -> Self {
        let color = match kind {
            CurveKind::FrequencyResponse => "#3e95cd",
            CurveKind::PhaseResponse => "#8e5ea2",
            CurveKind::ImpulseResponse => "#c45850",
            CurveKind::TimeDomainResponse => "#3cba9f",
            CurveKind::Spectrum => "#e8c3b9",
            CurveKind::Waveform => "#1f77b4",
        };
        Self {
            plot_type: PlotType::Line,
            border_color: Some(color.to_owned()),
            background_color: None,
            point_radius: Some(0.0),
        }
    }
}

/// One named data series inside a [`PlotSeries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotDataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(rename = "type")]
    pub plot_type: PlotType,
    pub fill: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,
}

/// Shared x-axis labels plus one or more datasets aligned with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub labels: Vec<f64>,
    pub datasets: Vec<PlotDataset>,
}

/// Serialize a curve with the default style for its kind.
pub fn serialize(curve: &ResponseCurve, label: &str) -> PlotSeries {
    serialize_styled(curve, label, &PlotStyle::for_kind(curve.kind()))
}

/// Serialize a curve with explicit presentation hints.
///
/// `fill` is set for [`PlotType::Area`] only.
pub fn serialize_styled(curve: &ResponseCurve, label: &str, style: &PlotStyle) -> PlotSeries {
    debug_assert_eq!(curve.labels().len(), curve.series().len());
    let label = if label.is_empty() { DEFAULT_LABEL } else { label };
    PlotSeries {
        labels: curve.labels().to_vec(),
        datasets: vec![PlotDataset {
            label: label.to_owned(),
            data: curve.series().to_vec(),
            plot_type: style.plot_type,
            fill: style.plot_type == PlotType::Area,
            border_color: style.border_color.clone(),
            background_color: style.background_color.clone(),
            point_radius: style.point_radius,
        }],
    }
}

/// The three dashboard plots, keyed the way the dashboard looks them up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotBundle {
    pub filter_frequency_response: PlotSeries,
    pub filter_time_domain_response: PlotSeries,
    pub filter_impulse_response: PlotSeries,
}

impl PlotBundle {
    /// Package the curves of a request, each labeled with its title.
    pub fn from_responses(responses: &FilterResponses) -> Self {
        let s = |c: &ResponseCurve| serialize(c, c.title());
        Self {
            filter_frequency_response: s(&responses.frequency),
            filter_time_domain_response: s(&responses.time_domain),
            filter_impulse_response: s(&responses.impulse),
        }
    }

    /// Like [`from_responses`](Self::from_responses) but with every curve
    /// reduced to at most `max_points` points first.
    pub fn decimated(responses: &FilterResponses, max_points: usize) -> Self {
        let reduced = FilterResponses {
            frequency: responses.frequency.decimated(max_points),
            impulse: responses.impulse.decimated(max_points),
            time_domain: responses.time_domain.decimated(max_points),
        };
        Self::from_responses(&reduced)
    }
}
