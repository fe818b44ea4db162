// SPDX-License-Identifier: LGPL-3.0-or-later

//! Engine limits and defaults.
//!
//! Design limits bound what the filter designer accepts; analysis defaults
//! are what [`ResponseAnalyzer::new`](crate::analysis::ResponseAnalyzer::new)
//! starts from.

// Design limits

/// Highest accepted filter order.
pub const MAX_ORDER: usize = 24;

/// Imaginary part below which a root is treated as real when grouping
/// roots into sections.
pub const REAL_ROOT_EPSILON: f64 = 1e-9;

// Analysis defaults

/// Default number of frequency-response points.
pub const DFL_FREQ_POINTS: usize = 512;

/// Default impulse-response length in samples.
pub const DFL_IMPULSE_LEN: usize = 512;

/// Shortest impulse response produced from a time-constant request.
pub const MIN_IMPULSE_LEN: usize = 64;

/// Longest impulse response produced from a time-constant request.
pub const MAX_IMPULSE_LEN: usize = 65_536;

/// Lowest start frequency of a logarithmic grid (Hz).
pub const LOG_GRID_START_HZ: f64 = 20.0;

/// Default upper bound on plotted points per curve.
pub const DFL_MAX_PLOT_POINTS: usize = 2000;
