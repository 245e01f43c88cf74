//! The handler contract and the continuation passed to every handler.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::message::{HttpRequest, HttpResponse};
use super::transport::Transport;
use crate::error::{ApiError, ConfigError};

/// A request-processing step in a [`HandlerChain`](super::HandlerChain).
///
/// A handler receives the request and a [`Next`] pointing at the rest of the
/// chain. It may modify the request, call [`Next::run`] to forward it, and
/// inspect or modify the response on the way back. Not calling `next` short
/// circuits everything behind the handler, the terminal transport included.
///
/// ## Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use rest_pipeline::{ApiError, Handler, HttpRequest, HttpResponse, Next};
///
/// struct RequestId;
///
/// #[async_trait]
/// impl Handler for RequestId {
///     fn name(&self) -> &str {
///         "request_id"
///     }
///
///     async fn handle(
///         &self,
///         mut request: HttpRequest,
///         next: Next<'_>,
///     ) -> Result<HttpResponse, ApiError> {
///         request
///             .headers
///             .insert("x-request-id", "42".parse().unwrap());
///         next.run(request).await
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    /// Name used in traces and in [`ConfigError::UnboundHandler`].
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Processes one request.
    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse, ApiError>;
}

/// The remainder of the chain behind the current handler.
///
/// Consumed by [`run`](Next::run), so a handler forwards a request at most
/// once per invocation.
pub struct Next<'a> {
    inner: Option<&'a dyn Transport>,
    owner: &'a str,
    cancel: &'a CancellationToken,
}

impl<'a> Next<'a> {
    pub(crate) fn new(inner: &'a dyn Transport, owner: &'a str, cancel: &'a CancellationToken) -> Self {
        Self {
            inner: Some(inner),
            owner,
            cancel,
        }
    }

    /// A continuation with no inner target.
    ///
    /// Lets a handler be invoked on its own; forwarding through it fails with
    /// [`ConfigError::UnboundHandler`] naming `owner`.
    pub fn unbound(owner: &'a str, cancel: &'a CancellationToken) -> Self {
        Self {
            inner: None,
            owner,
            cancel,
        }
    }

    /// Returns `true` if there is an inner target to forward to.
    pub fn is_bound(&self) -> bool {
        self.inner.is_some()
    }

    /// The cancellation token of the call in flight.
    pub fn cancellation(&self) -> &CancellationToken {
        self.cancel
    }

    /// Forwards the request to the inner target.
    ///
    /// ## Errors
    ///
    /// - [`ConfigError::UnboundHandler`] when there is no inner target
    /// - [`ApiError::Cancelled`] when the call was cancelled before forwarding
    /// - whatever the inner target returns
    pub async fn run(self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let Some(inner) = self.inner else {
            return Err(ConfigError::UnboundHandler {
                handler: self.owner.to_string(),
            }
            .into());
        };
        if self.cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        inner.send(request, self.cancel).await
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("owner", &self.owner)
            .field("bound", &self.is_bound())
            .finish()
    }
}
