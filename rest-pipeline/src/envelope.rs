//! Response wrapper returned by every [`RestClient`](crate::RestClient) call.

use std::sync::OnceLock;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, EXPIRES, LAST_MODIFIED};
use reqwest::{StatusCode, Version};
use tracing::trace;

use crate::error::{ApiError, ClientError};
use crate::pipeline::{HttpRequest, HttpResponse};

/// A raw response plus, for typed calls, its decoded payload.
///
/// The envelope owns the response exclusively. [`release`](Self::release)
/// drops the buffered headers and body. It runs at most once, explicitly or on
/// drop. After release the status line is still readable, headers read as
/// empty, and the body and request are gone.
///
/// `ResponseEnvelope` (with `T = ()`) is what
/// [`RequestBuilder::send`](crate::RequestBuilder::send) returns;
/// [`RequestBuilder::json`](crate::RequestBuilder::json) returns
/// `ResponseEnvelope<T>` with the body decoded once up front.
///
/// ## Examples
///
/// ```rust,no_run
/// # async fn run(client: rest_pipeline::RestClient) -> Result<(), rest_pipeline::ApiError> {
/// #[derive(serde::Deserialize)]
/// struct Widget { id: u64 }
///
/// let envelope = client.get("widgets/7").json::<Widget>().await?;
/// if envelope.is_success() {
///     let widget = envelope.into_content();
///     println!("{:?}", widget.map(|w| w.id));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ResponseEnvelope<T = ()> {
    status: StatusCode,
    raw: Option<HttpResponse>,
    content: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub(crate) fn new(raw: HttpResponse, content: Option<T>) -> Self {
        Self {
            status: raw.status,
            raw: Some(raw),
            content,
        }
    }

    /// Status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical reason phrase for the status code, if it has one.
    pub fn reason_phrase(&self) -> Option<&'static str> {
        self.status.canonical_reason()
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// All response headers. Empty after release.
    pub fn headers(&self) -> &HeaderMap {
        static EMPTY: OnceLock<HeaderMap> = OnceLock::new();
        match &self.raw {
            Some(raw) => &raw.headers,
            None => EMPTY.get_or_init(HeaderMap::new),
        }
    }

    /// The headers that describe the body rather than the exchange:
    /// `Content-*`, `Expires`, `Last-Modified` and `Allow`.
    pub fn content_headers(&self) -> HeaderMap {
        let mut out = HeaderMap::new();
        for (name, value) in self.headers() {
            if is_content_header(name) {
                out.append(name.clone(), value.clone());
            }
        }
        out
    }

    /// Protocol version, if the response has not been released.
    pub fn version(&self) -> Option<Version> {
        self.raw.as_ref().map(|raw| raw.version)
    }

    /// The request as it left the pipeline.
    pub fn request(&self) -> Option<&HttpRequest> {
        self.raw.as_ref().and_then(|raw| raw.request.as_ref())
    }

    /// Raw body bytes.
    pub fn body(&self) -> Option<&Bytes> {
        self.raw.as_ref().map(|raw| &raw.body)
    }

    /// Decoded payload. `None` for untyped calls and for empty or `null`
    /// bodies.
    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    /// Releases the response and returns the decoded payload.
    pub fn into_content(mut self) -> Option<T> {
        self.release();
        self.content.take()
    }

    /// Drops the buffered response. Calling it again does nothing.
    pub fn release(&mut self) {
        if self.raw.take().is_some() {
            trace!(status = self.status.as_u16(), "response released");
        }
    }

    /// Returns `true` once [`release`](Self::release) has run.
    pub fn is_released(&self) -> bool {
        self.raw.is_none()
    }

    /// Turns a 4xx or 5xx status into [`ClientError::HttpStatus`].
    ///
    /// The error message is the body text when there is one, otherwise the
    /// reason phrase.
    ///
    /// ## Errors
    ///
    /// Returns [`ApiError::Client`] for client and server error statuses.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if !(self.status.is_client_error() || self.status.is_server_error()) {
            return Ok(self);
        }
        let message = match self.body() {
            Some(body) if !body.is_empty() => String::from_utf8_lossy(body).into_owned(),
            _ => self.status.to_string(),
        };
        Err(ClientError::HttpStatus {
            status: self.status.as_u16(),
            message,
        }
        .into())
    }
}

impl<T> Drop for ResponseEnvelope<T> {
    fn drop(&mut self) {
        self.release();
    }
}

fn is_content_header(name: &HeaderName) -> bool {
    let name = name.as_str();
    name.starts_with("content-")
        || name == EXPIRES.as_str()
        || name == LAST_MODIFIED.as_str()
        || name == "allow"
}
