//! Authorization header production and injection.
//!
//! - [`AuthStrategy`] - how the header value is produced (none, Basic, Bearer)
//! - [`TokenSource`] - where Bearer tokens come from
//! - [`AuthHandler`] - the pipeline handler that stamps the header

mod handler;
mod strategy;
mod token;

pub use handler::AuthHandler;
pub use strategy::{AuthHeader, AuthStrategy};
pub use token::{StaticToken, TokenSource};
