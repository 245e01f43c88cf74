//! Layered error types for the REST pipeline.
//!
//! The error hierarchy is structured for actionable diagnostics:
//! - [`ApiError`] - Top-level error type returned by every client operation
//! - [`ClientError`] - Transport, target resolution and HTTP status errors
//! - [`ValidationError`] - JSON encoding/decoding errors
//! - [`AuthError`] - Authorization header production errors
//! - [`ConfigError`] - Builder and pipeline misconfiguration

mod api_error;
mod auth_error;
mod client_error;
mod config_error;
mod validation_error;

pub use api_error::ApiError;
pub use auth_error::AuthError;
pub use client_error::ClientError;
pub use config_error::ConfigError;
pub use validation_error::ValidationError;
