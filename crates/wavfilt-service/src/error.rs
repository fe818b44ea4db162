// SPDX-License-Identifier: LGPL-3.0-or-later

//! Service error type and its mapping to dashboard status classes.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use wavfilt_dsp_units::FilterError;

/// Message shown to clients for every internal failure.
pub const INTERNAL_FAILURE: &str = "internal processing failure";

/// Errors raised by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("malformed WAV data: {0}")]
    Wav(#[from] hound::Error),

    #[error("WAV encoding failed: {0}")]
    Encode(#[source] hound::Error),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("invalid file name '{0}'")]
    InvalidName(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
}

/// Result alias for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP-style status class: 400 user-correctable, 404 unknown file,
    /// 500 internal.
    pub fn status(&self) -> u16 {
        match self {
            Self::Filter(e) if e.is_user_error() => 400,
            Self::Wav(_) | Self::InvalidName(_) => 400,
            Self::NotFound(_) => 404,
            Self::Filter(_) | Self::Encode(_) | Self::Io { .. } | Self::Poisoned(_) => 500,
        }
    }

    /// Message safe to hand to a client. Internal failures are collapsed
    /// into [`INTERNAL_FAILURE`]; the detail goes to the log only.
    pub fn public_message(&self) -> String {
        if self.status() >= 500 {
            INTERNAL_FAILURE.to_owned()
        } else {
            self.to_string()
        }
    }

    /// `{"error": ...}` body for this error.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.public_message(),
        }
    }
}

/// JSON error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
