// SPDX-License-Identifier: LGPL-3.0-or-later

//! # wavfilt-dsp-lib
//!
//! Low-level DSP primitives used by `wavfilt-dsp-units` to design, apply and
//! analyse cascaded IIR filters. It includes:
//!
//! - **Types**: second-order section coefficients and delay state
//! - **Filters**: cascade processing in transposed direct form II
//! - **Complex**: transfer-function evaluation of a cascade, split re/im helpers
//! - **FFT**: planned forward transforms and real-signal magnitudes via `rustfft`
//! - **Float utilities**: non-finite detection, dB conversion with a floor
//! - **Search**: extreme-value index searches used for peaks and plot decimation
//!
//! ## Design
//!
//! All sample and coefficient math is `f64`. The per-sample loops use
//! runtime SIMD dispatch via the `multiversion` crate.

pub mod complex;
pub mod fft;
pub mod filters;
pub mod float;
pub mod search;
pub mod types;
