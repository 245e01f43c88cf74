//! The REST client: configuration, per-call builders and execution.

mod builder;
mod executor;
mod request;

pub use builder::{ClientBuilder, DEFAULT_TIMEOUT_SECS};
pub use executor::RestClient;
pub use request::{RequestBuilder, Target};
