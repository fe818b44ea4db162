// SPDX-License-Identifier: LGPL-3.0-or-later

//! Core data types for the DSP library.

use num_complex::Complex64;

// ─── Second-order section types ───────────────────────────────────────────

/// Number of delay (memory) elements in a second-order section.
pub const SOS_D_ITEMS: usize = 2;

/// Coefficients of a single second-order section, normalized so `a0 = 1`.
///
/// Implements the transfer function
/// ```text
///          b0 + b1*z^-1 + b2*z^-2
///   H(z) = ----------------------
///           1 + a1*z^-1 + a2*z^-2
/// ```
///
/// `a1`/`a2` carry the textbook sign (not pre-negated). A first-order
/// section is stored with `b2 = a2 = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Sos {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Sos {
    /// Identity section (passes the signal unchanged).
    pub const IDENTITY: Sos = Sos {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Build a section from numerator `[b0, b1, b2]` and denominator
    /// `[a0, a1, a2]`, normalizing by `a0`.
    ///
    /// Returns `None` when `a0` is zero or not finite.
    pub fn from_ba(b: [f64; 3], a: [f64; 3]) -> Option<Self> {
        let a0 = a[0];
        if a0 == 0.0 || !a0.is_finite() {
            return None;
        }
        let inv = 1.0 / a0;
        Some(Self {
            b0: b[0] * inv,
            b1: b[1] * inv,
            b2: b[2] * inv,
            a1: a[1] * inv,
            a2: a[2] * inv,
        })
    }

    /// `true` if this section has no second-order terms.
    pub fn is_first_order(&self) -> bool {
        self.b2 == 0.0 && self.a2 == 0.0
    }

    /// `true` if every coefficient is finite.
    pub fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }

    /// Roots of the denominator `z^2 + a1*z + a2`.
    ///
    /// For a first-order section the second root is the origin.
    pub fn poles(&self) -> [Complex64; 2] {
        quadratic_roots(self.a1, self.a2)
    }

    /// Roots of the numerator `b0*z^2 + b1*z + b2`.
    ///
    /// Returns the origin for both roots if `b0` is zero.
    pub fn zeros(&self) -> [Complex64; 2] {
        if self.b0 == 0.0 {
            return [Complex64::new(0.0, 0.0); 2];
        }
        quadratic_roots(self.b1 / self.b0, self.b2 / self.b0)
    }

    /// Largest pole magnitude of this section.
    pub fn max_pole_radius(&self) -> f64 {
        let [p1, p2] = self.poles();
        p1.norm().max(p2.norm())
    }
}

/// Roots of the monic quadratic `z^2 + c1*z + c0`.
fn quadratic_roots(c1: f64, c0: f64) -> [Complex64; 2] {
    let disc = Complex64::new(c1 * c1 - 4.0 * c0, 0.0).sqrt();
    let half = Complex64::new(-c1, 0.0);
    [(half + disc) * 0.5, (half - disc) * 0.5]
}

/// Delay state of one second-order section.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SosState {
    /// Delay registers.
    pub d: [f64; SOS_D_ITEMS],
}

impl SosState {
    /// Reset the delay memory to zero (clear filter state).
    pub fn reset(&mut self) {
        self.d = [0.0; SOS_D_ITEMS];
    }
}
