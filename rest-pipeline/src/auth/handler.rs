use async_trait::async_trait;
use reqwest::header::{HeaderName, AUTHORIZATION};
use tracing::trace;

use super::strategy::AuthStrategy;
use crate::error::{ApiError, AuthError};
use crate::pipeline::{Handler, HttpRequest, HttpResponse, Next};

/// Pipeline handler that writes the strategy's header onto every request.
///
/// The header is resolved per request and overwrites any value already in the
/// slot. With [`AuthStrategy::None`] the request passes through untouched.
///
/// [`ClientBuilder`](crate::ClientBuilder) always places this handler first in
/// the chain.
#[derive(Debug, Clone)]
pub struct AuthHandler {
    strategy: AuthStrategy,
    header: HeaderName,
}

impl Default for AuthHandler {
    fn default() -> Self {
        Self::new(AuthStrategy::None)
    }
}

impl AuthHandler {
    /// Creates a handler writing to the `Authorization` header.
    pub fn new(strategy: AuthStrategy) -> Self {
        Self {
            strategy,
            header: AUTHORIZATION,
        }
    }

    /// The current strategy.
    pub fn strategy(&self) -> &AuthStrategy {
        &self.strategy
    }

    /// Replaces the strategy.
    pub fn set_strategy(&mut self, strategy: AuthStrategy) {
        self.strategy = strategy;
    }

    /// The header the credentials are written to.
    pub fn header_name(&self) -> &HeaderName {
        &self.header
    }

    /// Writes credentials to another header, e.g. `Proxy-Authorization`.
    pub fn set_header_name(&mut self, header: HeaderName) {
        self.header = header;
    }

    /// Resolves the header and stamps it onto `request`.
    ///
    /// ## Errors
    ///
    /// Propagates [`AuthError`] from the strategy.
    pub async fn apply(&self, request: &mut HttpRequest) -> Result<(), AuthError> {
        let Some(header) = self.strategy.resolve_header().await? else {
            return Ok(());
        };
        trace!(scheme = header.scheme(), header = self.header.as_str(), "stamping credentials");
        request
            .headers
            .insert(self.header.clone(), header.to_header_value()?);
        Ok(())
    }
}

#[async_trait]
impl Handler for AuthHandler {
    fn name(&self) -> &str {
        "auth"
    }

    async fn handle(
        &self,
        mut request: HttpRequest,
        next: Next<'_>,
    ) -> Result<HttpResponse, ApiError> {
        self.apply(&mut request).await?;
        next.run(request).await
    }
}
