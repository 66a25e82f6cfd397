//! Error types and failure classification for report runs.
//!
//! This module provides:
//! - [`ReportsError`]: The main error enum for every fallible step of a run
//! - [`FailureClass`]: Coarse classification used by hosts to surface failures

mod failure;

pub use failure::FailureClass;

use thiserror::Error;

use crate::resolver::ResolutionStage;

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportsError>;

/// Errors that can occur while signing, resolving, downloading or parsing a report.
///
/// All of them are fatal for the item being processed. Row and column
/// anomalies in a payload are not errors; the parser tolerates them.
#[derive(Error, Debug)]
pub enum ReportsError {
    /// The private key material could not be decoded or is not an EC key.
    #[error("Credential error: {0}")]
    Credential(String),

    /// A resolution stage returned an empty candidate set.
    #[error("{message}")]
    StageNotFound {
        /// The stage that came back empty
        stage: ResolutionStage,
        /// Human readable description naming the selectors involved
        message: String,
    },

    /// The remote service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level failure (connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The downloaded artifact is not valid gzip data.
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// A selector or option is missing or malformed.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportsError {
    /// Create a stage-specific not-found error.
    pub fn stage_not_found(stage: ResolutionStage, message: impl Into<String>) -> Self {
        Self::StageNotFound {
            stage,
            message: message.into(),
        }
    }

    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a credential error
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential(message.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Returns the stage that failed, if this is a stage miss.
    pub fn stage(&self) -> Option<ResolutionStage> {
        match self {
            Self::StageNotFound { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use appstore_reports::errors::{FailureClass, ReportsError};
    /// use appstore_reports::resolver::ResolutionStage;
    ///
    /// let error = ReportsError::stage_not_found(ResolutionStage::Instance, "Instance not found");
    /// assert_eq!(error.failure_class(), FailureClass::DataNotReady);
    ///
    /// let error = ReportsError::credential("not a PEM key");
    /// assert_eq!(error.failure_class(), FailureClass::Configuration);
    /// ```
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::StageNotFound { .. } => FailureClass::DataNotReady,

            Self::Credential(_) | Self::InvalidParameter(_) => FailureClass::Configuration,

            Self::Api { .. } | Self::Transport(_) | Self::Decompression(_) | Self::Json(_) => {
                FailureClass::Transport
            }
        }
    }
}

impl From<reqwest::Error> for ReportsError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::api(status.as_u16(), err.to_string()),
            None => Self::Transport(err.to_string()),
        }
    }
}
