//! The request pipeline: records, handlers, chain composition and transports.
//!
//! - [`HttpRequest`] / [`HttpResponse`] - what travels through the chain
//! - [`Handler`] / [`Next`] - the interception contract
//! - [`HandlerChain`] - ordered composition into one [`Transport`]
//! - [`ReqwestTransport`] - the default terminal transport
//! - [`HeaderHandler`] / [`TracingHandler`] - ready-made handlers

mod chain;
mod handler;
mod handlers;
mod message;
mod transport;

pub use chain::HandlerChain;
pub use handler::{Handler, Next};
pub use handlers::{HeaderHandler, TracingHandler};
pub use message::{HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
