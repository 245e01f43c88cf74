use thiserror::Error;

/// JSON body encoding and decoding errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The response body is not valid JSON for the requested type.
    #[error("failed to decode JSON body: {0}")]
    JsonParse(#[source] serde_json::Error),

    /// The request body could not be serialized.
    #[error("failed to encode JSON body: {0}")]
    JsonEncode(#[source] serde_json::Error),

    /// The document nests deeper than the configured limit.
    #[error("JSON nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded {
        /// The configured `max_depth`.
        max_depth: usize,
    },
}
