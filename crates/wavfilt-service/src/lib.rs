// SPDX-License-Identifier: LGPL-3.0-or-later

//! Dashboard-facing service layer for the wavfilt engine.
//!
//! This crate plays the external collaborators around
//! [`wavfilt_dsp_units`]: it parses request fields, decodes and encodes WAV
//! containers, stores original and filtered variants under stable names and
//! packages results as the JSON documents the dashboard consumes.
//!
//! | Module      | Role                                                  |
//! |-------------|-------------------------------------------------------|
//! | [`config`]  | Defaults, TOML file and environment overrides         |
//! | [`request`] | `filter_type` / `cutoff` / `order` field parsing      |
//! | [`wav`]     | WAV decode to [`SignalBuffer`] and 32-bit float encode |
//! | [`store`]   | Write-once named byte storage (memory or directory)   |
//! | [`service`] | [`FilterService`] facade and response documents       |
//!
//! [`SignalBuffer`]: wavfilt_dsp_units::signal::SignalBuffer

pub mod config;
pub mod error;
pub mod request;
pub mod service;
pub mod store;
pub mod wav;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use request::FilterRequest;
pub use service::{ApplyResponse, FilterService, PlotResponse, UploadMetadata};
pub use store::{DirStore, MemoryStore, SignalStore};
