// SPDX-License-Identifier: LGPL-3.0-or-later

//! Index searches on `f64` buffers.
//!
//! Ties resolve to the lowest index; an empty buffer yields index `0`.

/// Index of the maximum value.
pub fn imax(src: &[f64]) -> usize {
    let mut idx = 0;
    let mut val = f64::NEG_INFINITY;
    for (i, &x) in src.iter().enumerate() {
        if x > val {
            val = x;
            idx = i;
        }
    }
    idx
}

/// Indices of the minimum and the maximum, found in one pass.
pub fn imin_max(src: &[f64]) -> (usize, usize) {
    let (mut imn, mut imx) = (0, 0);
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for (i, &x) in src.iter().enumerate() {
        if x < lo {
            lo = x;
            imn = i;
        }
        if x > hi {
            hi = x;
            imx = i;
        }
    }
    (imn, imx)
}
