//! Folding an ordered handler list into a single transport.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::handler::{Handler, Next};
use super::message::{HttpRequest, HttpResponse};
use super::transport::Transport;
use crate::error::ApiError;

/// One handler bound to its inner target.
struct Link {
    handler: Arc<dyn Handler>,
    inner: Arc<dyn Transport>,
}

#[async_trait]
impl Transport for Link {
    async fn send(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        let name = self.handler.name();
        trace!(handler = name, "entering handler");
        let next = Next::new(self.inner.as_ref(), name, cancel);
        self.handler.handle(request, next).await
    }
}

/// An immutable, ordered composition of handlers over a terminal transport.
///
/// The first handler given to [`compose`](HandlerChain::compose) is the entry
/// point and sees the request first; the terminal transport sees it last.
/// Responses unwind in reverse order. To change a chain, compose a new one.
#[derive(Clone)]
pub struct HandlerChain {
    entry: Arc<dyn Transport>,
    names: Arc<[String]>,
}

impl HandlerChain {
    /// Composes `handlers` in order over `terminal`.
    ///
    /// The list is folded from last to first, each step binding the current
    /// effective transport as the inner target of the next handler. An empty
    /// list yields `terminal` itself as the entry point.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use rest_pipeline::{AuthHandler, Handler, HandlerChain, ReqwestTransport, Transport};
    ///
    /// let terminal: Arc<dyn Transport> = Arc::new(ReqwestTransport::default());
    /// let auth: Arc<dyn Handler> = Arc::new(AuthHandler::default());
    /// let chain = HandlerChain::compose(terminal, [auth]);
    /// assert_eq!(chain.handler_names(), ["auth"]);
    /// ```
    pub fn compose<I>(terminal: Arc<dyn Transport>, handlers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Handler>>,
    {
        let handlers: Vec<Arc<dyn Handler>> = handlers.into_iter().collect();
        let names = handlers.iter().map(|h| h.name().to_string()).collect();
        let entry = handlers.into_iter().rev().fold(terminal, |inner, handler| {
            Arc::new(Link { handler, inner }) as Arc<dyn Transport>
        });

        Self { entry, names }
    }

    /// The outermost transport of the chain.
    pub fn entry(&self) -> &Arc<dyn Transport> {
        &self.entry
    }

    /// Handler names in invocation order.
    pub fn handler_names(&self) -> &[String] {
        &self.names
    }

    /// Number of handlers in front of the terminal transport.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if requests go straight to the terminal transport.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[async_trait]
impl Transport for HandlerChain {
    async fn send(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, ApiError> {
        self.entry.send(request, cancel).await
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &self.names)
            .finish_non_exhaustive()
    }
}
