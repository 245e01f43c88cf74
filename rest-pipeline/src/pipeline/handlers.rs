//! Ready-made handlers.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use tracing::{debug, warn};

use super::handler::{Handler, Next};
use super::message::{HttpRequest, HttpResponse};
use crate::error::{ApiError, ConfigError};

/// Stamps a fixed header onto every request, replacing any earlier value.
#[derive(Debug, Clone)]
pub struct HeaderHandler {
    name: HeaderName,
    value: HeaderValue,
}

impl HeaderHandler {
    /// Creates the handler from a header name and value.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidHeader`] if either part is not a valid
    /// HTTP header token.
    pub fn new(name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self, ConfigError> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| ConfigError::InvalidHeader(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| ConfigError::InvalidHeader(format!("invalid header value: {e}")))?;
        Ok(Self { name, value })
    }
}

#[async_trait]
impl Handler for HeaderHandler {
    fn name(&self) -> &str {
        "header"
    }

    async fn handle(
        &self,
        mut request: HttpRequest,
        next: Next<'_>,
    ) -> Result<HttpResponse, ApiError> {
        request.headers.insert(self.name.clone(), self.value.clone());
        next.run(request).await
    }
}

/// Emits a `debug` event per exchange with method, URL, status and latency.
///
/// Failures are reported at `warn`, except cancellation which stays at
/// `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHandler;

#[async_trait]
impl Handler for TracingHandler {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse, ApiError> {
        let method = request.method.clone();
        let url = request.url.clone();
        let started = Instant::now();

        let result = next.run(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => debug!(
                http.method = %method,
                http.url = %url,
                http.status_code = response.status.as_u16(),
                elapsed_ms,
                "exchange completed"
            ),
            Err(ApiError::Cancelled) => debug!(http.method = %method, http.url = %url, "exchange cancelled"),
            Err(e) => warn!(http.method = %method, http.url = %url, elapsed_ms, error = %e, "exchange failed"),
        }

        result
    }
}
