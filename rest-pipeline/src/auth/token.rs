use async_trait::async_trait;

use crate::error::AuthError;

/// Supplies the current Bearer token.
///
/// Called once per request and never cached by the caller, so a source may
/// hand out refreshed tokens over time. Overlapping requests call it
/// concurrently; implementations synchronize internally if they need to.
///
/// Plain closures returning `Result<String, AuthError>` are token sources.
///
/// ## Examples
///
/// ```rust
/// use rest_pipeline::{AuthError, AuthStrategy};
///
/// let strategy = AuthStrategy::bearer(|| {
///     std::env::var("API_TOKEN").map_err(|e| AuthError::unavailable(e.to_string()))
/// });
/// assert_eq!(strategy.scheme(), Some("Bearer"));
/// ```
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns the token to send with the current request.
    async fn token(&self) -> Result<String, AuthError>;
}

#[async_trait]
impl<F> TokenSource for F
where
    F: Fn() -> Result<String, AuthError> + Send + Sync,
{
    async fn token(&self) -> Result<String, AuthError> {
        self()
    }
}

/// A token fixed at construction time.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps the token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(***)")
    }
}
