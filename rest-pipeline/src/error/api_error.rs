use thiserror::Error;

use super::{AuthError, ClientError, ConfigError, ValidationError};

/// Top-level error for all client operations.
///
/// Cancellation is reported through its own variant so callers can tell a
/// caller-initiated abort apart from a real failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport or the target URL failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The auth strategy could not produce a header.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The client or its pipeline is misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A body could not be encoded or decoded.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The caller's cancellation token fired before the call completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// Returns `true` if the call was aborted through its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Client(ClientError::Request(err))
    }
}
