//! Request execution with tracing instrumentation.
//!
//! This module provides the [`RestClient`] struct, which resolves targets,
//! encodes bodies and drives every request through the configured
//! [`HandlerChain`].

use std::sync::Arc;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tracing::{debug, instrument, Span};
use url::Url;

use super::builder::ClientBuilder;
use super::request::{RequestBuilder, RequestSpec, Target};
use crate::envelope::ResponseEnvelope;
use crate::error::{ApiError, ClientError};
use crate::pipeline::{HandlerChain, HttpRequest, HttpResponse, Transport};
use crate::serializer::{SerializerOptions, JSON_CONTENT_TYPE};

/// Async REST client bound to a base address and a handler chain.
///
/// Cheap to clone; clones share the chain and serializer options. Every verb
/// method returns a [`RequestBuilder`]; nothing is sent until it is awaited.
///
/// ## Examples
///
/// ```rust,no_run
/// use rest_pipeline::{AuthStrategy, RestClient};
///
/// #[derive(serde::Deserialize)]
/// struct User { id: u64, name: String }
///
/// # async fn run() -> Result<(), rest_pipeline::ApiError> {
/// let client = RestClient::builder("https://api.example.com/")?
///     .with_auth_strategy(AuthStrategy::bearer_token("sk-xxx"))?
///     .build()?;
///
/// let user = client.get("users/1").json::<User>().await?;
/// if let Some(user) = user.content() {
///     println!("{} is {}", user.id, user.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: Url,
    chain: HandlerChain,
    options: Arc<SerializerOptions>,
}

impl RestClient {
    pub(crate) fn from_parts(base_url: Url, chain: HandlerChain, options: SerializerOptions) -> Self {
        Self {
            base_url,
            chain,
            options: Arc::new(options),
        }
    }

    /// Creates a new builder for the given base address.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`](crate::ConfigError::InvalidBaseUrl)
    /// if the address does not parse.
    pub fn builder(base_url: &str) -> Result<ClientBuilder, ApiError> {
        ClientBuilder::parse(base_url)
    }

    /// Creates a client with no auth, no extra handlers and default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        ClientBuilder::new(base_url).build()
    }

    /// Returns the base URL for this client.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Options used to encode request bodies and decode responses.
    pub fn serializer_options(&self) -> &SerializerOptions {
        &self.options
    }

    /// The composed pipeline every request goes through.
    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    /// Starts a GET request.
    pub fn get(&self, target: impl Into<Target>) -> RequestBuilder<'_> {
        self.request(Method::GET, target)
    }

    /// Starts a POST request.
    pub fn post(&self, target: impl Into<Target>) -> RequestBuilder<'_> {
        self.request(Method::POST, target)
    }

    /// Starts a PUT request.
    pub fn put(&self, target: impl Into<Target>) -> RequestBuilder<'_> {
        self.request(Method::PUT, target)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, target: impl Into<Target>) -> RequestBuilder<'_> {
        self.request(Method::PATCH, target)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, target: impl Into<Target>) -> RequestBuilder<'_> {
        self.request(Method::DELETE, target)
    }

    /// Starts a request with any method.
    ///
    /// ## Examples
    ///
    /// ```rust,no_run
    /// # async fn run(client: rest_pipeline::RestClient) -> Result<(), rest_pipeline::ApiError> {
    /// use rest_pipeline::RestMethod;
    ///
    /// client.request(RestMethod::Head, "health").send().await?;
    ///
    /// let propfind = reqwest::Method::from_bytes(b"PROPFIND").unwrap();
    /// client.request(propfind, "files/").send().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn request(&self, method: impl Into<Method>, target: impl Into<Target>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method.into(), target.into())
    }

    /// Resolves a target against the base address.
    ///
    /// ## Errors
    ///
    /// Returns [`ClientError::InvalidTarget`] for unparseable targets.
    pub fn resolve(&self, target: &Target) -> Result<Url, ClientError> {
        target.resolve(&self.base_url)
    }

    /// Runs one exchange through the chain.
    ///
    /// The status code never fails the call on its own. Cancellation wins over
    /// any pending handler or transport work.
    #[instrument(
        name = "rest_request",
        skip(self, spec),
        fields(
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub(crate) async fn execute(&self, spec: RequestSpec) -> Result<HttpResponse, ApiError> {
        let RequestSpec {
            method,
            target,
            headers,
            body,
            cancel,
        } = spec;

        let span = Span::current();
        span.record("http.method", method.as_str());
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        let url = self.resolve(&target)?;
        span.record("http.url", url.as_str());

        let mut request = HttpRequest::new(method, url);
        request.headers = headers;
        if let Some(body) = body {
            request
                .headers
                .entry(CONTENT_TYPE)
                .or_insert(HeaderValue::from_static(JSON_CONTENT_TYPE));
            request.body = Some(body);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.chain.send(request, &cancel) => result,
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let otel_status = if e.is_cancelled() { "UNSET" } else { "ERROR" };
                span.record("otel.status_code", otel_status);
                debug!(error = %e, "request failed");
                return Err(e);
            }
        };

        let status = response.status;
        span.record("http.status_code", status.as_u16());
        let otel_status = if status.is_server_error() {
            "ERROR"
        } else {
            "OK"
        };
        span.record("otel.status_code", otel_status);

        Ok(response)
    }

    /// Sends and wraps a response without decoding it.
    pub(crate) async fn send_spec(&self, spec: RequestSpec) -> Result<ResponseEnvelope, ApiError> {
        let raw = self.execute(spec).await?;
        Ok(ResponseEnvelope::new(raw, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthStrategy;
    use crate::error::ValidationError;
    use crate::method::RestMethod;
    use crate::pipeline::Handler;
    use crate::test_support::{EventLog, LoggingHandler, RecordingTransport};
    use reqwest::StatusCode;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    struct TestResponse {
        id: u64,
        name: String,
    }

    fn client_for(server: &MockServer) -> RestClient {
        RestClient::new(Url::parse(&server.uri()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_get_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/1"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestResponse {
                id: 1,
                name: "Alice".to_string(),
            }))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let envelope = client.get("/users/1").json::<TestResponse>().await.unwrap();

        assert_eq!(envelope.status(), StatusCode::OK);
        let user = envelope.into_content().unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.name, "Alice");
    }

    #[tokio::test]
    async fn test_post_encodes_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/users"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"id": 2, "name": "Bob"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let envelope = client
            .post("/users")
            .body(&TestResponse {
                id: 2,
                name: "Bob".to_string(),
            })
            .send()
            .await
            .unwrap();

        assert_eq!(envelope.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_null_body_sends_no_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/flags/on"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client
            .put("/flags/on")
            .body(&None::<TestResponse>)
            .send()
            .await
            .unwrap();

        let received = mock_server.received_requests().await.unwrap();
        assert!(received[0].body.is_empty());
        assert!(received[0].headers.get("content-type").is_none());
    }

    #[tokio::test]
    async fn test_patch_and_custom_methods_use_the_chain() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/users/3"))
            .and(header("authorization", "Bearer patch-tok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("PROPFIND"))
            .and(path("/files/"))
            .and(header("authorization", "Bearer patch-tok"))
            .respond_with(ResponseTemplate::new(207))
            .mount(&mock_server)
            .await;

        let client = RestClient::builder(&mock_server.uri())
            .unwrap()
            .with_auth_strategy(AuthStrategy::bearer_token("patch-tok"))
            .unwrap()
            .build()
            .unwrap();

        let patched = client.request(RestMethod::Patch, "/users/3").send().await.unwrap();
        assert_eq!(patched.status(), StatusCode::OK);

        let propfind = Method::from_bytes(b"PROPFIND").unwrap();
        let listed = client.request(propfind, "/files/").send().await.unwrap();
        assert_eq!(listed.status().as_u16(), 207);
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_send_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/server-error"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let envelope = client.get("/server-error").send().await.unwrap();
        assert_eq!(envelope.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let result = envelope.error_for_status();
        assert!(matches!(
            result,
            Err(ApiError::Client(ClientError::HttpStatus { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn test_json_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/invalid-json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.get("/invalid-json").json::<TestResponse>().await;
        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::JsonParse(_)))
        ));
    }

    #[tokio::test]
    async fn test_empty_body_decodes_to_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/users/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let envelope = client.delete("/users/1").json::<TestResponse>().await.unwrap();
        assert_eq!(envelope.status(), StatusCode::NO_CONTENT);
        assert!(envelope.content().is_none());
    }

    #[tokio::test]
    async fn test_per_request_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/with-header"))
            .and(header("x-request-id", "req-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client
            .get("/with-header")
            .header("X-Request-Id", "req-1")
            .send()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_header_surfaces_on_send() {
        let client = RestClient::new(Url::parse("https://api.example/").unwrap()).unwrap();
        let result = client.get("x").header("bad header", "v").send().await;
        assert!(matches!(
            result,
            Err(ApiError::Client(ClientError::InvalidHeader(_)))
        ));
    }

    #[tokio::test]
    async fn test_pre_cancelled_request_never_reaches_transport() {
        let terminal = RecordingTransport::new();
        let client = ClientBuilder::parse("https://api.example/")
            .unwrap()
            .with_transport(terminal.clone())
            .build()
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = client.get("widgets").cancel_on(cancel).send().await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert!(terminal.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_abandons_in_flight_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let result = client.get("/slow").cancel_on(cancel).send().await;

        assert!(result.unwrap_err().is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_bearer_auth_and_url_reach_transport() {
        let terminal = RecordingTransport::new();
        let client = ClientBuilder::parse("https://api.example/")
            .unwrap()
            .with_auth_strategy(AuthStrategy::bearer_token("tok1"))
            .unwrap()
            .with_transport(terminal.clone())
            .build()
            .unwrap();

        client.get("/widgets/7").send().await.unwrap();

        let seen = terminal.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, Method::GET);
        assert_eq!(seen[0].url.as_str(), "https://api.example/widgets/7");
        assert_eq!(seen[0].header_str("authorization"), Some("Bearer tok1"));
    }

    #[tokio::test]
    async fn test_auth_runs_before_user_handlers() {
        let log = EventLog::default();
        let terminal = RecordingTransport::new().with_log(log.clone());
        let h1: Arc<dyn Handler> =
            Arc::new(LoggingHandler::new("h1", log.clone()).watching("authorization"));
        let h2: Arc<dyn Handler> = Arc::new(LoggingHandler::new("h2", log.clone()));

        let client = ClientBuilder::parse("https://api.example/")
            .unwrap()
            .with_auth_strategy(AuthStrategy::basic("u", "p"))
            .unwrap()
            .with_request_handlers(vec![h1, h2])
            .unwrap()
            .with_transport(terminal.clone())
            .build()
            .unwrap();

        client.get("widgets").send().await.unwrap();

        assert_eq!(client.chain().handler_names(), ["auth", "h1", "h2"]);
        assert_eq!(
            log.entries(),
            [
                "h1 saw authorization=Basic dTpw",
                "h2",
                "terminal",
                "h2:done",
                "h1:done"
            ]
        );
        assert_eq!(
            terminal.requests()[0].header_str("authorization"),
            Some("Basic dTpw")
        );
    }

    #[tokio::test]
    async fn test_envelope_carries_request() {
        let terminal = RecordingTransport::new().responding(StatusCode::OK, r#"{"id":9,"name":"n"}"#);
        let client = ClientBuilder::parse("https://api.example/v1/")
            .unwrap()
            .with_transport(terminal)
            .build()
            .unwrap();

        let envelope = client.get("users/9").json::<TestResponse>().await.unwrap();

        assert_eq!(
            envelope.request().map(|r| r.url.as_str()),
            Some("https://api.example/v1/users/9")
        );
        assert_eq!(envelope.content().map(|u| u.id), Some(9));
    }

    #[tokio::test]
    async fn test_send_spec_skips_decoding() {
        let terminal = RecordingTransport::new().responding(StatusCode::OK, "not json");
        let client = ClientBuilder::parse("https://api.example/")
            .unwrap()
            .with_transport(terminal)
            .build()
            .unwrap();

        let spec = RequestSpec::new(Method::GET, Target::from("raw"));
        let envelope = client.send_spec(spec).await.unwrap();
        assert_eq!(envelope.body().map(|b| &b[..]), Some(&b"not json"[..]));
    }

    #[tokio::test]
    async fn test_custom_timeout() {
        let client = ClientBuilder::parse("https://example.com")
            .unwrap()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "https://example.com/");
    }

    #[tokio::test]
    async fn test_resolve_uses_base() {
        let client = RestClient::new(Url::parse("https://api.example/").unwrap()).unwrap();
        let url = client.resolve(&Target::from("a/b")).unwrap();
        assert_eq!(url.as_str(), "https://api.example/a/b");
    }
}
