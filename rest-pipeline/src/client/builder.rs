//! Fluent assembly of a [`RestClient`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;
use url::Url;

use super::executor::RestClient;
use crate::auth::{AuthHandler, AuthStrategy};
use crate::error::{ApiError, ClientError, ConfigError};
use crate::pipeline::{Handler, HandlerChain, ReqwestTransport, Transport};
use crate::serializer::SerializerOptions;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for configuring a [`RestClient`].
///
/// The pipeline is always `[auth, handlers in the order added..., transport]`.
/// [`build`](Self::build) leaves the builder untouched, so one builder can
/// stamp out several independent clients.
///
/// Methods taking an `impl Into<Option<_>>` fail with
/// [`ConfigError::MissingArgument`] when handed `None`.
///
/// ## Examples
///
/// ```rust
/// use std::time::Duration;
/// use rest_pipeline::{AuthStrategy, ClientBuilder, NamingPolicy, SerializerOptions, TracingHandler};
///
/// let client = ClientBuilder::parse("https://api.example.com/v2/")?
///     .with_auth_strategy(AuthStrategy::basic("svc", "hunter2"))?
///     .with_serializer_customization(|o: &mut SerializerOptions| {
///         o.naming = NamingPolicy::CamelCase;
///     })?
///     .with_request_handler(TracingHandler)
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// assert_eq!(client.chain().handler_names(), ["auth", "tracing"]);
/// # Ok::<(), rest_pipeline::ApiError>(())
/// ```
#[derive(Clone)]
pub struct ClientBuilder {
    base_url: Url,
    auth: AuthHandler,
    handlers: Vec<Arc<dyn Handler>>,
    options: SerializerOptions,
    transport: Option<Arc<dyn Transport>>,
    timeout: Duration,
    default_headers: HeaderMap,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Creates a new builder with the specified base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            auth: AuthHandler::default(),
            handlers: Vec::new(),
            options: SerializerOptions::default(),
            transport: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
            user_agent: None,
        }
    }

    /// Parses the base URL and creates a builder.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute URL.
    pub fn parse(base_url: &str) -> Result<Self, ApiError> {
        let url = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self::new(url))
    }

    /// Replaces the strategy used by the auth handler.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingArgument`] when `strategy` is `None`.
    pub fn with_auth_strategy(
        mut self,
        strategy: impl Into<Option<AuthStrategy>>,
    ) -> Result<Self, ApiError> {
        let strategy = required(strategy.into(), "strategy")?;
        self.auth.set_strategy(strategy);
        Ok(self)
    }

    /// Mutates the auth handler in place, e.g. to change the header it writes.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use rest_pipeline::{AuthHandler, AuthStrategy, ClientBuilder};
    /// use reqwest::header::PROXY_AUTHORIZATION;
    ///
    /// let builder = ClientBuilder::parse("https://api.example.com/")?
    ///     .with_auth_customization(|auth: &mut AuthHandler| {
    ///         auth.set_strategy(AuthStrategy::bearer_token("proxy-token"));
    ///         auth.set_header_name(PROXY_AUTHORIZATION);
    ///     })?;
    /// # Ok::<(), rest_pipeline::ApiError>(())
    /// ```
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingArgument`] when `customize` is `None`.
    pub fn with_auth_customization<F>(mut self, customize: impl Into<Option<F>>) -> Result<Self, ApiError>
    where
        F: FnOnce(&mut AuthHandler),
    {
        let customize = required(customize.into(), "customize")?;
        customize(&mut self.auth);
        Ok(self)
    }

    /// Replaces the serializer options.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingArgument`] when `options` is `None`.
    pub fn with_serializer_options(
        mut self,
        options: impl Into<Option<SerializerOptions>>,
    ) -> Result<Self, ApiError> {
        self.options = required(options.into(), "options")?;
        Ok(self)
    }

    /// Mutates the serializer options in place.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingArgument`] when `customize` is `None`.
    pub fn with_serializer_customization<F>(
        mut self,
        customize: impl Into<Option<F>>,
    ) -> Result<Self, ApiError>
    where
        F: FnOnce(&mut SerializerOptions),
    {
        let customize = required(customize.into(), "customize")?;
        customize(&mut self.options);
        Ok(self)
    }

    /// Appends a handler after those already added.
    pub fn with_request_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Appends several handlers, keeping their order.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingArgument`] when `handlers` is `None`.
    pub fn with_request_handlers<I>(mut self, handlers: impl Into<Option<I>>) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = Arc<dyn Handler>>,
    {
        let handlers = required(handlers.into(), "handlers")?;
        self.handlers.extend(handlers);
        Ok(self)
    }

    /// Replaces the terminal transport.
    ///
    /// The timeout, default headers and user agent only configure the default
    /// reqwest transport and are ignored once a transport is set.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a default header to all requests.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidHeader`] if the header name or value is
    /// invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ApiError> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| ConfigError::InvalidHeader(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| ConfigError::InvalidHeader(format!("invalid header value: {e}")))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the `User-Agent` sent by the default transport.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the [`RestClient`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the default HTTP client cannot be constructed.
    pub fn build(&self) -> Result<RestClient, ApiError> {
        let terminal: Arc<dyn Transport> = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(self.default_transport()?),
        };

        let auth: Arc<dyn Handler> = Arc::new(self.auth.clone());
        let handlers = std::iter::once(auth).chain(self.handlers.iter().cloned());
        let chain = HandlerChain::compose(terminal, handlers);
        debug!(
            base_url = %self.base_url,
            handlers = ?chain.handler_names(),
            "client built"
        );

        Ok(RestClient::from_parts(
            self.base_url.clone(),
            chain,
            self.options.clone(),
        ))
    }

    fn default_transport(&self) -> Result<ReqwestTransport, ApiError> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers.clone())
            .pool_max_idle_per_host(10);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        let client = builder.build().map_err(ClientError::Request)?;
        Ok(ReqwestTransport::new(client))
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth)
            .field("handlers", &handlers)
            .field("options", &self.options)
            .field("custom_transport", &self.transport.is_some())
            .field("timeout", &self.timeout)
            .field("default_headers", &self.default_headers)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn required<T>(value: Option<T>, argument: &'static str) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingArgument { argument })
}
