//! Error taxonomy for API operations.

use thiserror::Error;

use crate::composer::ValidationError;

/// Failures surfaced by client operations.
///
/// Every variant maps to one user-facing behavior: `AuthRequired` routes to
/// login, `NotFound` renders the dedicated not-found state, and the rest are
/// notifications that leave last-known-good data in place.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected locally before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid token on an owner-scoped operation.
    #[error("authentication required")]
    AuthRequired,

    /// The paste is absent or expired.
    #[error("not found")]
    NotFound,

    /// Authenticated, but not the owner of the target paste.
    #[error("{0}")]
    Ownership(String),

    /// Non-success HTTP status with the server's message when available.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response did not match the expected schema.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Network failure or timeout; the operation may be retried.
    #[error("network error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Wrap a transport-level failure.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// Whether this failure should route the user to login instead of
    /// rendering an error.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
