// SPDX-License-Identifier: LGPL-3.0-or-later

//! Dashboard request fields.
//!
//! The dashboard sends form fields as strings: `filter_type`, `cutoff`
//! (one number, or two comma-separated numbers for band filters) and an
//! optional `order`. Band edges may also arrive as separate
//! `low cutoff` / `high cutoff` fields.

use serde::Deserialize;
use wavfilt_dsp_units::FilterError;
use wavfilt_dsp_units::filters::{Cutoff, FilterKind, FilterSpec};

pub const FIELD_FILTER_TYPE: &str = "filter_type";
pub const FIELD_CUTOFF: &str = "cutoff";
pub const FIELD_ORDER: &str = "order";
pub const FIELD_LOW_CUTOFF: &str = "low cutoff";
pub const FIELD_HIGH_CUTOFF: &str = "high cutoff";

/// Order used when the request carries none.
pub const DEFAULT_ORDER: usize = 2;

/// Raw, unvalidated filter request as received from the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterRequest {
    pub filter_type: Option<String>,
    pub cutoff: Option<String>,
    pub order: Option<String>,
    #[serde(rename = "low cutoff")]
    pub low_cutoff: Option<String>,
    #[serde(rename = "high cutoff")]
    pub high_cutoff: Option<String>,
}

impl FilterRequest {
    /// Request with the three main fields set.
    pub fn new(filter_type: &str, cutoff: &str, order: Option<&str>) -> Self {
        Self {
            filter_type: Some(filter_type.to_owned()),
            cutoff: Some(cutoff.to_owned()),
            order: order.map(str::to_owned),
            ..Self::default()
        }
    }

    /// Build a request from `(name, value)` form pairs. Unknown names are
    /// ignored; a repeated name keeps the last value.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut req = Self::default();
        for (name, value) in pairs {
            let slot = match name {
                FIELD_FILTER_TYPE => &mut req.filter_type,
                FIELD_CUTOFF => &mut req.cutoff,
                FIELD_ORDER => &mut req.order,
                FIELD_LOW_CUTOFF => &mut req.low_cutoff,
                FIELD_HIGH_CUTOFF => &mut req.high_cutoff,
                _ => continue,
            };
            *slot = Some(value.to_owned());
        }
        req
    }

    /// Parse the fields into a filter spec.
    ///
    /// Only syntax is checked here. Ranges (cutoff below Nyquist, order
    /// limits, band ordering) are checked by the designer against the
    /// signal's sample rate.
    pub fn to_spec(&self) -> Result<FilterSpec, FilterError> {
        let kind: FilterKind = required(self.filter_type.as_deref(), FIELD_FILTER_TYPE)?.parse()?;
        let cutoff = self.cutoff(kind)?;
        let order = match present(self.order.as_deref()) {
            None => DEFAULT_ORDER,
            Some(s) => s.parse::<usize>().map_err(|_| {
                invalid(FIELD_ORDER, format!("'{s}' is not a positive integer"))
            })?,
        };
        Ok(FilterSpec::new(kind, cutoff, order))
    }

    fn cutoff(&self, kind: FilterKind) -> Result<Cutoff, FilterError> {
        if kind.is_band() && present(self.cutoff.as_deref()).is_none() {
            let edges = (
                present(self.low_cutoff.as_deref()),
                present(self.high_cutoff.as_deref()),
            );
            if let (Some(low), Some(high)) = edges {
                return Ok(Cutoff::Band {
                    low: number(low, FIELD_LOW_CUTOFF)?,
                    high: number(high, FIELD_HIGH_CUTOFF)?,
                });
            }
        }
        parse_cutoff(required(self.cutoff.as_deref(), FIELD_CUTOFF)?)
    }
}

/// Parse `"1000"` or `"300,3000"`.
pub fn parse_cutoff(s: &str) -> Result<Cutoff, FilterError> {
    match s.split_once(',') {
        None => Ok(Cutoff::Single(number(s, FIELD_CUTOFF)?)),
        Some((low, high)) => {
            if high.contains(',') {
                return Err(invalid(
                    FIELD_CUTOFF,
                    format!("'{s}' has more than two values"),
                ));
            }
            Ok(Cutoff::Band {
                low: number(low, FIELD_CUTOFF)?,
                high: number(high, FIELD_CUTOFF)?,
            })
        }
    }
}

fn invalid(field: &'static str, reason: String) -> FilterError {
    FilterError::InvalidSpecification { field, reason }
}

fn present(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn required<'a>(v: Option<&'a str>, field: &'static str) -> Result<&'a str, FilterError> {
    present(v).ok_or_else(|| invalid(field, "missing".to_owned()))
}

fn number(s: &str, field: &'static str) -> Result<f64, FilterError> {
    let s = s.trim();
    s.parse::<f64>()
        .map_err(|_| invalid(field, format!("'{s}' is not a number")))
}
