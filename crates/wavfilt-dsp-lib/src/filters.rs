// SPDX-License-Identifier: LGPL-3.0-or-later

//! Cascaded second-order section processing (static coefficients).
//!
//! Each section runs the transposed direct form II recurrence with the
//! textbook sign convention (see [`Sos`]):
//! ```text
//!   y    = b0 * x + d[0]
//!   d[0] = b1 * x - a1 * y + d[1]
//!   d[1] = b2 * x - a2 * y
//! ```
//!
//! The cascade feeds the output of section `j` into section `j + 1`
//! sample by sample, so one pass over the buffer runs the whole filter.

use crate::types::{Sos, SosState};
use multiversion::multiversion;

/// Process audio through a cascade of sections.
///
/// `state` must hold one entry per section; it carries over between calls,
/// so reset it before starting an unrelated signal.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn cascade_process(dst: &mut [f64], src: &[f64], sections: &[Sos], state: &mut [SosState]) {
    debug_assert_eq!(
        sections.len(),
        state.len(),
        "cascade_process requires one state per section"
    );
    let n = sections.len().min(state.len());
    let sections = &sections[..n];
    let state = &mut state[..n];

    for (out, &inp) in dst.iter_mut().zip(src.iter()) {
        let mut signal = inp;
        for (c, st) in sections.iter().zip(state.iter_mut()) {
            let d = &mut st.d;
            let y = c.b0 * signal + d[0];
            d[0] = c.b1 * signal - c.a1 * y + d[1];
            d[1] = c.b2 * signal - c.a2 * y;
            signal = y;
        }
        *out = signal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    /// Run `src` through a single fresh section.
    fn run_one(dst: &mut [f64], src: &[f64], c: &Sos) {
        let mut st = [SosState::default()];
        cascade_process(dst, src, std::slice::from_ref(c), &mut st);
    }

    fn one_pole(a: f64) -> Sos {
        // y[n] = (1 - a) x[n] + a y[n-1]
        Sos {
            b0: 1.0 - a,
            b1: 0.0,
            b2: 0.0,
            a1: -a,
            a2: 0.0,
        }
    }

    #[test]
    fn test_identity_passthrough() {
        let src: Vec<f64> = (0..64).map(|i| (i as f64 * 0.3).sin()).collect();
        let mut dst = vec![0.0; 64];
        run_one(&mut dst, &src, &Sos::IDENTITY);
        for (a, b) in dst.iter().zip(src.iter()) {
            assert_approx_eq!(f64, *a, *b, ulps = 1);
        }
    }

    #[test]
    fn test_one_pole_impulse_decay() {
        let c = one_pole(0.5);
        let mut src = vec![0.0; 8];
        src[0] = 1.0;
        let mut dst = vec![0.0; 8];
        run_one(&mut dst, &src, &c);
        // h[n] = 0.5 * 0.5^n
        for (n, &h) in dst.iter().enumerate() {
            assert_approx_eq!(f64, h, 0.5 * 0.5f64.powi(n as i32), epsilon = 1e-15);
        }
    }

    #[test]
    fn test_one_pole_dc_gain_is_unity() {
        let c = one_pole(0.9);
        let src = vec![1.0; 400];
        let mut dst = vec![0.0; 400];
        run_one(&mut dst, &src, &c);
        assert_approx_eq!(f64, dst[399], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cascade_matches_sequential_sections() {
        let sections = [
            Sos {
                b0: 0.2,
                b1: 0.4,
                b2: 0.2,
                a1: -0.6,
                a2: 0.3,
            },
            Sos {
                b0: 1.0,
                b1: -1.2,
                b2: 0.5,
                a1: 0.1,
                a2: 0.05,
            },
            one_pole(0.25),
        ];
        let src: Vec<f64> = (0..257).map(|i| ((i * 7919) % 101) as f64 / 50.0 - 1.0).collect();

        let mut expected = src.clone();
        for s in &sections {
            let input = expected.clone();
            run_one(&mut expected, &input, s);
        }

        let mut dst = vec![0.0; src.len()];
        let mut state = [SosState::default(); 3];
        cascade_process(&mut dst, &src, &sections, &mut state);
        for (a, b) in dst.iter().zip(expected.iter()) {
            assert_approx_eq!(f64, *a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cascade_state_carries_between_blocks() {
        let sections = [one_pole(0.7), one_pole(0.3)];
        let src: Vec<f64> = (0..100).map(|i| (i as f64 * 0.1).cos()).collect();

        let mut whole = vec![0.0; 100];
        let mut st = [SosState::default(); 2];
        cascade_process(&mut whole, &src, &sections, &mut st);

        let mut split = vec![0.0; 100];
        let mut st = [SosState::default(); 2];
        let (a, b) = split.split_at_mut(37);
        cascade_process(a, &src[..37], &sections, &mut st);
        cascade_process(b, &src[37..], &sections, &mut st);

        assert_eq!(whole, split);
    }

    #[test]
    fn test_empty_cascade_copies_input() {
        let src = [1.0, -2.0, 3.0];
        let mut dst = [0.0; 3];
        cascade_process(&mut dst, &src, &[], &mut []);
        assert_eq!(dst, src);
    }
}
