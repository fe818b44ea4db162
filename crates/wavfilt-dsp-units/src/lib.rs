// SPDX-License-Identifier: LGPL-3.0-or-later

//! # wavfilt-dsp-units
//!
//! Audio filter design and analysis engine built on top of
//! [`wavfilt_dsp_lib`]. It includes:
//!
//! - **Signal**: immutable, shareable decoded audio ([`signal::SignalBuffer`])
//! - **Filters**: Butterworth design into second-order sections, application
//! - **Analysis**: frequency, phase, impulse and time-domain responses,
//!   signal spectrum
//! - **Plot**: labeled series ready for a browser chart library
//!
//! Every call is pure and synchronous; nothing is cached inside the engine.
//!
//! ```
//! use wavfilt_dsp_units::analysis::run;
//! use wavfilt_dsp_units::filters::FilterSpec;
//! use wavfilt_dsp_units::plot::PlotBundle;
//! use wavfilt_dsp_units::signal::SignalBuffer;
//!
//! let signal = SignalBuffer::mono(44100, vec![0.0; 44100]).unwrap();
//! let out = run(&FilterSpec::lowpass(500.0, 2), &signal).unwrap();
//! assert!(out.filtered.channel(0).unwrap().iter().all(|&x| x == 0.0));
//! let bundle = PlotBundle::from_responses(&out.responses);
//! assert_eq!(bundle.filter_frequency_response.labels.len(), 512);
//! ```

// Foundational modules
pub mod consts;
pub mod error;
pub mod signal;
pub mod units;

pub mod analysis;
pub mod filters;
pub mod misc;
pub mod plot;

pub use error::{FilterError, Result};
