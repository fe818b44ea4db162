// SPDX-License-Identifier: LGPL-3.0-or-later

//! Transfer-function evaluation and split real/imaginary helpers.
//!
//! Complex arrays are stored as separate `re` and `im` slices, the same
//! layout the FFT helpers use.

use crate::types::Sos;
use multiversion::multiversion;
use num_complex::Complex64;

/// Evaluate one section at `z = e^{jω}` (`omega` in radians/sample).
pub fn sos_response(c: &Sos, omega: f64) -> Complex64 {
    // z^-1 and z^-2 on the unit circle
    let z1 = Complex64::from_polar(1.0, -omega);
    let z2 = z1 * z1;
    let num = c.b0 + z1 * c.b1 + z2 * c.b2;
    let den = 1.0 + z1 * c.a1 + z2 * c.a2;
    num / den
}

/// Evaluate the product of all sections at `z = e^{jω}`.
///
/// An empty cascade is the identity (`1 + 0j`).
pub fn cascade_response(sections: &[Sos], omega: f64) -> Complex64 {
    sections
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, c| acc * sos_response(c, omega))
}

/// Evaluate a cascade at a batch of angular frequencies.
///
/// Writes `H(e^{jω_i})` into `dst_re[i]`, `dst_im[i]`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn cascade_response_batch(
    dst_re: &mut [f64],
    dst_im: &mut [f64],
    sections: &[Sos],
    omega: &[f64],
) {
    let n = dst_re.len().min(dst_im.len()).min(omega.len());
    for i in 0..n {
        let h = cascade_response(sections, omega[i]);
        dst_re[i] = h.re;
        dst_im[i] = h.im;
    }
}

/// Complex magnitude: `dst = sqrt(re^2 + im^2)`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn complex_mag(dst: &mut [f64], re: &[f64], im: &[f64]) {
    for ((d, &r), &i) in dst.iter_mut().zip(re.iter()).zip(im.iter()) {
        *d = r.hypot(i);
    }
}

/// Complex argument (phase angle): `dst = atan2(im, re)`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn complex_arg(dst: &mut [f64], re: &[f64], im: &[f64]) {
    for ((d, &r), &i) in dst.iter_mut().zip(re.iter()).zip(im.iter()) {
        *d = i.atan2(r);
    }
}
