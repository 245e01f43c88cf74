//! Async REST client built around a composable handler pipeline.
//!
//! Every request runs through an ordered chain of [`Handler`]s before it
//! reaches the terminal [`Transport`]. The first handler is always the
//! [`AuthHandler`], which stamps the authorization header produced by an
//! [`AuthStrategy`] on every request.
//!
//! ## Core Types
//!
//! - [`ClientBuilder`] - Assembles a client from a base URL, auth, handlers and options
//! - [`RestClient`] - Verb entry points (`get`, `post`, `put`, `patch`, `delete`, `request`)
//! - [`RequestBuilder`] - Per-call body, headers and cancellation
//! - [`ResponseEnvelope`] - Status, headers, body and the optional decoded payload
//!
//! ## Pipeline
//!
//! - [`Handler`] / [`Next`] - The interception contract
//! - [`HandlerChain`] - Ordered composition of handlers over a transport
//! - [`ReqwestTransport`] - Default terminal transport
//! - [`HeaderHandler`] / [`TracingHandler`] - Ready-made handlers
//!
//! ## Authentication
//!
//! - [`AuthStrategy`] - None, Basic or Bearer
//! - [`TokenSource`] - Supplies Bearer tokens, consulted on every request
//!
//! ## Examples
//!
//! ```rust,no_run
//! use rest_pipeline::{AuthStrategy, ClientBuilder, TracingHandler};
//!
//! #[derive(serde::Deserialize)]
//! struct Widget { id: u64, display_name: String }
//!
//! # async fn run() -> Result<(), rest_pipeline::ApiError> {
//! let client = ClientBuilder::parse("https://api.example.com/")?
//!     .with_auth_strategy(AuthStrategy::bearer(|| {
//!         std::env::var("WIDGETS_TOKEN")
//!             .map_err(|e| rest_pipeline::AuthError::unavailable(e.to_string()))
//!     }))?
//!     .with_request_handler(TracingHandler)
//!     .build()?;
//!
//! let widget = client.get("widgets/7").json::<Widget>().await?;
//! if let Some(widget) = widget.content() {
//!     println!("{}: {}", widget.id, widget.display_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
mod envelope;
pub mod error;
mod method;
pub mod pipeline;
mod serializer;

#[cfg(test)]
mod test_support;

pub use auth::{AuthHandler, AuthHeader, AuthStrategy, StaticToken, TokenSource};
pub use client::{ClientBuilder, RequestBuilder, RestClient, Target, DEFAULT_TIMEOUT_SECS};
pub use envelope::ResponseEnvelope;
pub use error::{ApiError, AuthError, ClientError, ConfigError, ValidationError};
pub use method::RestMethod;
pub use pipeline::{
    Handler, HandlerChain, HeaderHandler, HttpRequest, HttpResponse, Next, ReqwestTransport,
    TracingHandler, Transport,
};
pub use serializer::{
    NamingPolicy, SerializerOptions, DEFAULT_MAX_DEPTH, JSON_CONTENT_TYPE,
};
