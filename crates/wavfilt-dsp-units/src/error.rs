// SPDX-License-Identifier: LGPL-3.0-or-later

//! Engine error type.

use thiserror::Error;

/// Errors raised by the filter design and analysis engine.
///
/// Validation failures (`InvalidSpecification`, `EmptySignal`,
/// `InvalidSample`) are detected before any processing starts.
/// `ResponseComputation` marks a numerical defect in a computed curve or
/// output buffer and aborts the whole request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// A filter specification or buffer parameter is out of range.
    #[error("invalid {field}: {reason}")]
    InvalidSpecification {
        /// Offending field, e.g. `cutoff`, `order`, `filter_type`.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// The signal has no channels or no samples.
    #[error("signal is empty")]
    EmptySignal,

    /// An input sample is NaN or infinite.
    #[error("non-finite sample at channel {channel}, index {index}")]
    InvalidSample { channel: usize, index: usize },

    /// A computed curve or output buffer contains NaN or infinity.
    #[error("non-finite value in {curve} at index {index}")]
    ResponseComputation { curve: &'static str, index: usize },
}

impl FilterError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSpecification {
            field,
            reason: reason.into(),
        }
    }

    /// `true` for errors the caller can fix by changing the request.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::ResponseComputation { .. })
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, FilterError>;
