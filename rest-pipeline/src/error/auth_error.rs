use thiserror::Error;

/// Errors raised while producing an authorization header.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential or token source could not produce a value.
    #[error("credential unavailable: {message}")]
    CredentialUnavailable {
        /// What went wrong, as reported by the token source.
        message: String,
        /// The underlying failure, when the source had one.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The produced header could not be encoded as an HTTP header value.
    #[error("credential cannot be sent as a header value")]
    InvalidHeaderValue,
}

impl AuthError {
    /// Shorthand for a [`AuthError::CredentialUnavailable`] without a source.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::CredentialUnavailable {
            message: message.into(),
            source: None,
        }
    }
}
