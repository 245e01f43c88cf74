use thiserror::Error;

/// Builder and pipeline misconfiguration.
///
/// These are programmer errors; none of them are worth retrying.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required builder argument was `None`.
    #[error("required argument `{argument}` was not provided")]
    MissingArgument {
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// A handler tried to forward a request without an inner target.
    #[error("handler `{handler}` has no inner target to forward to")]
    UnboundHandler {
        /// Name of the handler that was invoked outside a chain.
        handler: String,
    },

    /// The base address could not be parsed.
    #[error("invalid base URL `{url}`: {source}")]
    InvalidBaseUrl {
        /// The rejected input.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// A default header name or value was rejected.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A serializer option map contained an unknown name or a bad value.
    #[error("invalid serializer option: {0}")]
    InvalidOption(String),
}
