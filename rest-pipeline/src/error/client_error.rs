use thiserror::Error;

/// Errors from the transport and from request target resolution.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying HTTP client failed to send or read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A string target could not be resolved against the base address.
    #[error("invalid request target `{target}`: {source}")]
    InvalidTarget {
        /// The target as given by the caller.
        target: String,
        /// Why it failed to parse.
        #[source]
        source: url::ParseError,
    },

    /// A per-request header name or value was rejected.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The server answered with an error status.
    ///
    /// Only produced by [`ResponseEnvelope::error_for_status`](crate::ResponseEnvelope::error_for_status);
    /// sending never fails on status alone.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// The numeric status code.
        status: u16,
        /// Reason phrase or body text.
        message: String,
    },
}
