// SPDX-License-Identifier: LGPL-3.0-or-later

//! An immutable, validated filter ready for application and analysis.

use std::sync::Arc;

use log::warn;
use num_complex::Complex64;
use wavfilt_dsp_lib::complex::cascade_response;
use wavfilt_dsp_lib::filters::cascade_process;
use wavfilt_dsp_lib::types::{Sos, SosState};

use crate::error::{FilterError, Result};
use crate::filters::spec::{FilterKind, FilterSpec};
use crate::units::{hz_to_omega, pole_time_constant};

/// Curve name reported when a design yields non-finite or unpairable
/// sections.
pub const FILTER_SECTIONS: &str = "filter sections";

/// A designed filter: the spec it came from, the sample rate it was
/// designed for, and its section cascade.
///
/// Every pole has magnitude strictly below 1 and every coefficient is
/// finite. Clones share the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignedFilter {
    spec: FilterSpec,
    sample_rate: u32,
    sections: Arc<[Sos]>,
}

impl DesignedFilter {
    /// Wrap a section cascade, enforcing the stability invariant.
    pub(crate) fn from_sections(
        spec: FilterSpec,
        sample_rate: u32,
        sections: Vec<Sos>,
    ) -> Result<Self> {
        if sections.is_empty() {
            return Err(FilterError::ResponseComputation {
                curve: FILTER_SECTIONS,
                index: 0,
            });
        }
        if let Some(i) = sections.iter().position(|s| !s.is_finite()) {
            warn!(
                "designed filter {}: section {i} has non-finite coefficients",
                spec.fingerprint()
            );
            return Err(FilterError::ResponseComputation {
                curve: FILTER_SECTIONS,
                index: i,
            });
        }
        if let Some(i) = sections.iter().position(|s| s.max_pole_radius() >= 1.0) {
            warn!(
                "designed filter {}: section {i} pole radius {} is not inside the unit circle",
                spec.fingerprint(),
                sections[i].max_pole_radius()
            );
            return Err(FilterError::invalid(
                "order",
                format!("design is unstable (section {i} has a pole on or outside the unit circle)"),
            ));
        }
        Ok(Self {
            spec,
            sample_rate,
            sections: sections.into(),
        })
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn kind(&self) -> FilterKind {
        self.spec.kind
    }

    pub fn order(&self) -> usize {
        self.spec.order
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Section coefficients in processing order.
    pub fn sections(&self) -> &[Sos] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// All poles of the cascade. First-order sections contribute their
    /// real pole only.
    pub fn poles(&self) -> Vec<Complex64> {
        self.sections
            .iter()
            .flat_map(|s| {
                let [p1, p2] = s.poles();
                if s.is_first_order() {
                    vec![if p1.norm() >= p2.norm() { p1 } else { p2 }]
                } else {
                    vec![p1, p2]
                }
            })
            .collect()
    }

    /// Largest pole magnitude over all sections.
    pub fn max_pole_radius(&self) -> f64 {
        self.sections
            .iter()
            .map(Sos::max_pole_radius)
            .fold(0.0, f64::max)
    }

    /// `true` if every pole lies strictly inside the unit circle.
    pub fn is_stable(&self) -> bool {
        self.max_pole_radius() < 1.0
    }

    /// Complex response `H(e^{jω})` at `freq` Hz.
    pub fn response_at(&self, freq: f64) -> Complex64 {
        cascade_response(&self.sections, hz_to_omega(f64::from(self.sample_rate), freq))
    }

    /// Decay time constant in samples of the slowest pole.
    pub fn dominant_time_constant(&self) -> f64 {
        pole_time_constant(self.max_pole_radius())
    }

    /// Plot title for a curve of this filter, e.g.
    /// `Order: 4 Band Pass Filter - Impulse Response`.
    pub fn title(&self, curve: &str) -> String {
        format!(
            "Order: {} {} Filter - {curve}",
            self.spec.order,
            self.spec.kind.display_name()
        )
    }

    /// Create a stateful processor running this cascade.
    pub fn processor(&self) -> CascadeProcessor {
        CascadeProcessor {
            sections: Arc::clone(&self.sections),
            state: vec![SosState::default(); self.sections.len()],
        }
    }
}

/// Stateful runner of a designed cascade, one delay pair per section.
///
/// # Examples
///
/// ```
/// use wavfilt_dsp_units::filters::{FilterSpec, design};
///
/// let filter = design(&FilterSpec::lowpass(1000.0, 4), 48000).unwrap();
/// let mut proc = filter.processor();
///
/// let input = vec![1.0f64; 4096];
/// let mut output = vec![0.0f64; 4096];
/// proc.process(&mut output, &input);
/// ```
#[derive(Debug, Clone)]
pub struct CascadeProcessor {
    sections: Arc<[Sos]>,
    state: Vec<SosState>,
}

impl CascadeProcessor {
    /// Clear all delay registers.
    pub fn reset(&mut self) {
        self.state.iter_mut().for_each(SosState::reset);
    }

    /// Process a block. State carries over to the next call.
    pub fn process(&mut self, dst: &mut [f64], src: &[f64]) {
        cascade_process(dst, src, &self.sections, &mut self.state);
    }
}
