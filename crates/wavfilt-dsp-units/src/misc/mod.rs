// SPDX-License-Identifier: LGPL-3.0-or-later

//! Helpers shared by the analysis code.
//!
//! - **Windows**: tapering functions applied before the spectrum FFT

pub mod windows;
