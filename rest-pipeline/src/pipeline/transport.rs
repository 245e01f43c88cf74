//! The terminal transport capability and its reqwest implementation.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::message::{HttpRequest, HttpResponse};
use crate::error::{ApiError, ClientError};

/// Anything that can turn a request into a response.
///
/// The innermost element of every chain is a `Transport` that performs real
/// I/O. Composed chains are transports too, so a chain can terminate another
/// chain.
///
/// Implementations must return [`ApiError::Cancelled`] instead of a response
/// once `cancel` has fired.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the buffered response.
    async fn send(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, ApiError>;
}

/// Terminal transport backed by a [`reqwest::Client`].
///
/// Reads the whole body before returning so the connection goes back to the
/// pool as soon as the exchange completes.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps an already configured client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Returns the wrapped client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let version = response.version();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, version, headers, body))
        };

        let (status, version, headers, body) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                trace!(url = %request.url, "transport send abandoned");
                return Err(ApiError::Cancelled);
            }
            result = exchange => result.map_err(ClientError::Request)?,
        };

        Ok(HttpResponse {
            status,
            version,
            headers,
            body,
            request: Some(request),
        })
    }
}
