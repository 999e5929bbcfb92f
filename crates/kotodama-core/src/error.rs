//! Error taxonomy for the generation layer.

use std::time::Duration;

use thiserror::Error;

use crate::types::Provider;

/// Everything a generation or analysis call can fail with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    /// No credential configured; raised before any network call.
    #[error("{0} credentials are not configured")]
    MissingCredentials(Provider),

    /// Network unreachable, connection reset, body read failure.
    #[error("Network error: {0}")]
    Transport(String),

    /// The per-attempt deadline elapsed.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Vendor answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Success status but the body was not what we expected.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The model declined to produce content.
    #[error("Content generation refused: {0}")]
    Refused(String),

    /// The model produced nothing usable.
    #[error("Model returned empty content")]
    EmptyContent,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

impl GenerationError {
    /// Whether this failure is a configuration problem rather than a vendor one.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GenerationError::MissingCredentials(_) | GenerationError::UnknownProvider(_)
        )
    }

    /// Vendor-supplied message for API errors.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            GenerationError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}
