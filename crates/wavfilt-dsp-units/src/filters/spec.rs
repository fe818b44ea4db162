// SPDX-License-Identifier: LGPL-3.0-or-later

//! Filter specification: family, cutoff and order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_ORDER;
use crate::error::{FilterError, Result};

/// Filter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// Passes frequencies below the cutoff.
    #[serde(rename = "low")]
    Lowpass,
    /// Passes frequencies above the cutoff.
    #[serde(rename = "high")]
    Highpass,
    /// Passes frequencies between two cutoffs.
    #[serde(rename = "band")]
    Bandpass,
    /// Rejects frequencies between two cutoffs.
    #[serde(rename = "bandstop")]
    Bandstop,
}

impl FilterKind {
    /// All families in wire order.
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Lowpass,
        FilterKind::Highpass,
        FilterKind::Bandpass,
        FilterKind::Bandstop,
    ];

    /// Short name used in requests and file names.
    pub fn wire_name(self) -> &'static str {
        match self {
            FilterKind::Lowpass => "low",
            FilterKind::Highpass => "high",
            FilterKind::Bandpass => "band",
            FilterKind::Bandstop => "bandstop",
        }
    }

    /// Human-readable name used in plot titles.
    pub fn display_name(self) -> &'static str {
        match self {
            FilterKind::Lowpass => "Low Pass",
            FilterKind::Highpass => "High Pass",
            FilterKind::Bandpass => "Band Pass",
            FilterKind::Bandstop => "Band Stop",
        }
    }

    /// `true` for families that take a `(low, high)` cutoff pair.
    pub fn is_band(self) -> bool {
        matches!(self, FilterKind::Bandpass | FilterKind::Bandstop)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        FilterKind::ALL
            .into_iter()
            .find(|k| k.wire_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                FilterError::invalid(
                    "filter_type",
                    format!("'{s}' is not one of low, high, band, bandstop"),
                )
            })
    }
}

/// Cutoff frequency specification in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cutoff {
    /// Single corner frequency (low/high pass).
    Single(f64),
    /// Band edges (band pass/stop).
    Band { low: f64, high: f64 },
}

impl Cutoff {
    /// Corner frequencies in ascending order of declaration.
    pub fn frequencies(&self) -> Vec<f64> {
        match *self {
            Cutoff::Single(f) => vec![f],
            Cutoff::Band { low, high } => vec![low, high],
        }
    }
}

impl fmt::Display for Cutoff {
    /// `1000` for a single cutoff, `300-3000` for a band.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cutoff::Single(c) => write!(f, "{c}"),
            Cutoff::Band { low, high } => write!(f, "{low}-{high}"),
        }
    }
}

/// Complete description of a Butterworth filter request.
///
/// Construction does not validate; [`FilterSpec::validate`] checks the spec
/// against a sample rate and is called by the designer before any
/// computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(rename = "filter_type")]
    pub kind: FilterKind,
    pub cutoff: Cutoff,
    pub order: usize,
}

impl FilterSpec {
    pub fn new(kind: FilterKind, cutoff: Cutoff, order: usize) -> Self {
        Self {
            kind,
            cutoff,
            order,
        }
    }

    pub fn lowpass(cutoff: f64, order: usize) -> Self {
        Self::new(FilterKind::Lowpass, Cutoff::Single(cutoff), order)
    }

    pub fn highpass(cutoff: f64, order: usize) -> Self {
        Self::new(FilterKind::Highpass, Cutoff::Single(cutoff), order)
    }

    pub fn bandpass(low: f64, high: f64, order: usize) -> Self {
        Self::new(FilterKind::Bandpass, Cutoff::Band { low, high }, order)
    }

    pub fn bandstop(low: f64, high: f64, order: usize) -> Self {
        Self::new(FilterKind::Bandstop, Cutoff::Band { low, high }, order)
    }

    /// Check the spec against a sample rate.
    ///
    /// Rejects (never clamps): order outside `1..=MAX_ORDER`, a cutoff shape
    /// that does not match the family, cutoffs that are not finite, not
    /// positive or not below Nyquist, and band edges with `low >= high`.
    pub fn validate(&self, sample_rate: u32) -> Result<()> {
        if sample_rate == 0 {
            return Err(FilterError::invalid("sample_rate", "must be positive"));
        }
        if self.order == 0 || self.order > MAX_ORDER {
            return Err(FilterError::invalid(
                "order",
                format!("{} is outside 1..={MAX_ORDER}", self.order),
            ));
        }

        match (self.kind.is_band(), &self.cutoff) {
            (false, Cutoff::Band { .. }) => {
                return Err(FilterError::invalid(
                    "cutoff",
                    format!("'{}' filter takes a single cutoff", self.kind),
                ));
            }
            (true, Cutoff::Single(_)) => {
                return Err(FilterError::invalid(
                    "cutoff",
                    format!("'{}' filter takes a (low, high) cutoff pair", self.kind),
                ));
            }
            _ => {}
        }

        let nyquist = f64::from(sample_rate) * 0.5;
        for f in self.cutoff.frequencies() {
            if !f.is_finite() || f <= 0.0 {
                return Err(FilterError::invalid(
                    "cutoff",
                    format!("{f} Hz must be a positive frequency"),
                ));
            }
            if f >= nyquist {
                return Err(FilterError::invalid(
                    "cutoff",
                    format!("{f} Hz must be below the Nyquist frequency {nyquist} Hz"),
                ));
            }
        }

        if let Cutoff::Band { low, high } = self.cutoff {
            if low >= high {
                return Err(FilterError::invalid(
                    "cutoff",
                    format!("band edges must satisfy low < high, got {low} >= {high}"),
                ));
            }
        }

        Ok(())
    }

    /// Canonical text form used to key cached variants.
    ///
    /// Two specs have equal fingerprints exactly when they are equal.
    pub fn fingerprint(&self) -> String {
        format!("{}:{}:o{}", self.kind, self.cutoff, self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: FilterError) -> &'static str {
        match err {
            FilterError::InvalidSpecification { field, .. } => field,
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_kind_parse_case_insensitive() {
        assert_eq!("low".parse::<FilterKind>().unwrap(), FilterKind::Lowpass);
        assert_eq!("HIGH".parse::<FilterKind>().unwrap(), FilterKind::Highpass);
        assert_eq!(" Band ".parse::<FilterKind>().unwrap(), FilterKind::Bandpass);
        assert_eq!("BandStop".parse::<FilterKind>().unwrap(), FilterKind::Bandstop);
        assert_eq!(field_of("notch".parse::<FilterKind>().unwrap_err()), "filter_type");
    }

    #[test]
    fn test_kind_display_roundtrip() {
        for k in FilterKind::ALL {
            assert_eq!(k.to_string().parse::<FilterKind>().unwrap(), k);
        }
    }

    #[test]
    fn test_valid_specs() {
        assert!(FilterSpec::lowpass(500.0, 2).validate(44100).is_ok());
        assert!(FilterSpec::highpass(20.0, 1).validate(8000).is_ok());
        assert!(FilterSpec::bandpass(300.0, 3000.0, 4).validate(44100).is_ok());
        assert!(FilterSpec::bandstop(50.0, 60.0, MAX_ORDER).validate(44100).is_ok());
    }

    #[test]
    fn test_order_bounds() {
        assert_eq!(field_of(FilterSpec::lowpass(500.0, 0).validate(44100).unwrap_err()), "order");
        assert_eq!(
            field_of(FilterSpec::lowpass(500.0, MAX_ORDER + 1).validate(44100).unwrap_err()),
            "order"
        );
    }

    #[test]
    fn test_cutoff_at_or_above_nyquist() {
        let err = FilterSpec::lowpass(22050.0, 2).validate(44100).unwrap_err();
        assert_eq!(field_of(err), "cutoff");
        let err = FilterSpec::bandpass(300.0, 30000.0, 2).validate(44100).unwrap_err();
        assert_eq!(field_of(err), "cutoff");
    }

    #[test]
    fn test_non_positive_and_non_finite_cutoff() {
        for f in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let err = FilterSpec::highpass(f, 2).validate(44100).unwrap_err();
            assert_eq!(field_of(err), "cutoff");
        }
    }

    #[test]
    fn test_band_order() {
        let err = FilterSpec::bandpass(3000.0, 300.0, 2).validate(44100).unwrap_err();
        assert_eq!(field_of(err), "cutoff");
        let err = FilterSpec::bandstop(1000.0, 1000.0, 2).validate(44100).unwrap_err();
        assert_eq!(field_of(err), "cutoff");
    }

    #[test]
    fn test_shape_mismatch() {
        let spec = FilterSpec::new(FilterKind::Lowpass, Cutoff::Band { low: 1.0, high: 2.0 }, 2);
        assert_eq!(field_of(spec.validate(44100).unwrap_err()), "cutoff");
        let spec = FilterSpec::new(FilterKind::Bandpass, Cutoff::Single(100.0), 2);
        assert_eq!(field_of(spec.validate(44100).unwrap_err()), "cutoff");
    }

    #[test]
    fn test_zero_sample_rate() {
        let err = FilterSpec::lowpass(100.0, 2).validate(0).unwrap_err();
        assert_eq!(field_of(err), "sample_rate");
    }

    #[test]
    fn test_fingerprint() {
        assert_eq!(FilterSpec::lowpass(1000.0, 4).fingerprint(), "low:1000:o4");
        assert_eq!(FilterSpec::bandstop(300.0, 3000.5, 2).fingerprint(), "bandstop:300-3000.5:o2");
        assert_ne!(
            FilterSpec::lowpass(1000.0, 4).fingerprint(),
            FilterSpec::lowpass(1000.0, 3).fingerprint()
        );
    }

    #[test]
    fn test_serde_wire_names() {
        let spec = FilterSpec::bandpass(300.0, 3000.0, 4);
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(
            json,
            r#"{"filter_type":"band","cutoff":{"low":300.0,"high":3000.0},"order":4}"#
        );
        let back: FilterSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);

        let low: FilterSpec =
            serde_json::from_str(r#"{"filter_type":"low","cutoff":500,"order":2}"#).unwrap();
        assert_eq!(low, FilterSpec::lowpass(500.0, 2));
    }
}
