// SPDX-License-Identifier: LGPL-3.0-or-later

//! Filter specification, Butterworth design and application.
//!
//! A [`FilterSpec`] is turned into an immutable [`DesignedFilter`] by
//! [`design`]; [`apply`] runs it over a [`SignalBuffer`](crate::signal::SignalBuffer).

pub mod apply;
pub mod butterworth;
pub mod designed;
pub mod spec;

pub use apply::{apply, apply_channel};
pub use butterworth::design;
pub use designed::{CascadeProcessor, DesignedFilter};
pub use spec::{Cutoff, FilterKind, FilterSpec};
