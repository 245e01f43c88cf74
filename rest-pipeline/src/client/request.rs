//! Per-call request description and its fluent builder.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::executor::RestClient;
use crate::envelope::ResponseEnvelope;
use crate::error::{ApiError, ClientError};
use crate::serializer::JSON_CONTENT_TYPE;

/// Where a request goes.
///
/// Strings are resolved against the client's base address when the request is
/// sent:
///
/// - a string that parses as an absolute URL is used as-is
/// - an empty or whitespace-only string targets the base address itself
/// - anything else is joined onto the base address
///
/// A [`Url`] is always used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Base-relative (or absolute) string.
    Relative(String),
    /// Absolute address, bypassing the base.
    Absolute(Url),
}

impl Target {
    /// Resolves the target against `base`.
    ///
    /// ## Errors
    ///
    /// Returns [`ClientError::InvalidTarget`] if the string cannot be parsed
    /// or joined.
    pub fn resolve(&self, base: &Url) -> Result<Url, ClientError> {
        let raw = match self {
            Self::Absolute(url) => return Ok(url.clone()),
            Self::Relative(raw) => raw,
        };
        if raw.trim().is_empty() {
            return Ok(base.clone());
        }
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                base.join(raw).map_err(|source| ClientError::InvalidTarget {
                    target: raw.clone(),
                    source,
                })
            }
            Err(source) => Err(ClientError::InvalidTarget {
                target: raw.clone(),
                source,
            }),
        }
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Self::Relative(value.to_string())
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Self::Relative(value)
    }
}

impl From<&String> for Target {
    fn from(value: &String) -> Self {
        Self::Relative(value.clone())
    }
}

impl From<Url> for Target {
    fn from(value: Url) -> Self {
        Self::Absolute(value)
    }
}

impl From<&Url> for Target {
    fn from(value: &Url) -> Self {
        Self::Absolute(value.clone())
    }
}

/// Everything the client needs to run one exchange.
#[derive(Debug, Clone)]
pub(crate) struct RequestSpec {
    pub(crate) method: Method,
    pub(crate) target: Target,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Bytes>,
    pub(crate) cancel: CancellationToken,
}

impl RequestSpec {
    pub(crate) fn new(method: Method, target: Target) -> Self {
        Self {
            method,
            target,
            headers: HeaderMap::new(),
            body: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// Fluent builder for one call, returned by the [`RestClient`] verb methods.
///
/// Errors from [`body`](Self::body) and [`header`](Self::header) are held
/// until the call is sent, so the chain reads without intermediate `?`.
///
/// ## Examples
///
/// ```rust,no_run
/// use rest_pipeline::RestClient;
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(serde::Serialize)]
/// struct Rename<'a> { display_name: &'a str }
///
/// # async fn run(client: RestClient) -> Result<(), rest_pipeline::ApiError> {
/// let cancel = CancellationToken::new();
/// let envelope = client
///     .patch("widgets/7")
///     .header("If-Match", "\"v3\"")
///     .body(&Rename { display_name: "cog" })
///     .cancel_on(cancel.clone())
///     .send()
///     .await?;
/// assert!(envelope.is_success());
/// # Ok(())
/// # }
/// ```
#[must_use = "requests do nothing until `send` or `json` is awaited"]
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    client: &'a RestClient,
    spec: Result<RequestSpec, ApiError>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(client: &'a RestClient, method: Method, target: Target) -> Self {
        Self {
            client,
            spec: Ok(RequestSpec::new(method, target)),
        }
    }

    /// Encodes `value` as the JSON body.
    ///
    /// A value that serializes to `null` (e.g. `None`) leaves the request
    /// without content.
    pub fn body<B>(mut self, value: &B) -> Self
    where
        B: Serialize + ?Sized,
    {
        if let Ok(spec) = &mut self.spec {
            match self.client.serializer_options().encode(value) {
                Ok(body) => spec.body = body,
                Err(e) => self.spec = Err(e.into()),
            }
        }
        self
    }

    /// Adds a header to this request only.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let Ok(spec) = &mut self.spec {
            match parse_header(name.as_ref(), value.as_ref()) {
                Ok((name, value)) => {
                    spec.headers.append(name, value);
                }
                Err(e) => self.spec = Err(e.into()),
            }
        }
        self
    }

    /// Binds a cancellation token. Without one the call cannot be cancelled.
    pub fn cancel_on(mut self, cancel: CancellationToken) -> Self {
        if let Ok(spec) = &mut self.spec {
            spec.cancel = cancel;
        }
        self
    }

    /// Sends the request and returns the response metadata.
    ///
    /// Error statuses are not errors here; see
    /// [`ResponseEnvelope::error_for_status`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the request was misbuilt, the target cannot be
    /// resolved, a handler or the transport fails, or the call is cancelled.
    pub async fn send(self) -> Result<ResponseEnvelope, ApiError> {
        self.client.send_spec(self.spec?).await
    }

    /// Sends the request and decodes the JSON body as `T`.
    ///
    /// Sets `Accept: application/json` unless the caller set one.
    ///
    /// ## Errors
    ///
    /// Everything [`send`](Self::send) returns, plus
    /// [`ValidationError`](crate::ValidationError) when the body is not valid
    /// JSON for `T`.
    pub async fn json<T>(self) -> Result<ResponseEnvelope<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let mut spec = self.spec?;
        spec.headers
            .entry(ACCEPT)
            .or_insert(HeaderValue::from_static(JSON_CONTENT_TYPE));

        let raw = self.client.execute(spec).await?;
        let content = self.client.serializer_options().decode::<T>(&raw.body)?;
        Ok(ResponseEnvelope::new(raw, content))
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ClientError> {
    let name = HeaderName::try_from(name)
        .map_err(|e| ClientError::InvalidHeader(format!("invalid header name: {e}")))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| ClientError::InvalidHeader(format!("invalid header value: {e}")))?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.example/v1/").unwrap()
    }

    #[test]
    fn test_relative_target_joins_base() {
        let url = Target::from("widgets/7").resolve(&base()).unwrap();
        assert_eq!(url.as_str(), "https://api.example/v1/widgets/7");
    }

    #[test]
    fn test_rooted_target_replaces_base_path() {
        let url = Target::from("/widgets/7").resolve(&base()).unwrap();
        assert_eq!(url.as_str(), "https://api.example/widgets/7");
    }

    #[test]
    fn test_absolute_string_bypasses_base() {
        let url = Target::from("https://other.example/x").resolve(&base()).unwrap();
        assert_eq!(url.as_str(), "https://other.example/x");
    }

    #[test]
    fn test_blank_target_is_base() {
        assert_eq!(Target::from("").resolve(&base()).unwrap(), base());
        assert_eq!(Target::from("   ").resolve(&base()).unwrap(), base());
    }

    #[test]
    fn test_url_target_is_used_as_is() {
        let url = Url::parse("http://localhost:9000/health").unwrap();
        assert_eq!(Target::from(&url).resolve(&base()).unwrap(), url);
    }

    #[test]
    fn test_query_is_kept() {
        let url = Target::from("widgets?page=2").resolve(&base()).unwrap();
        assert_eq!(url.query(), Some("page=2"));
    }

    #[test]
    fn test_bad_header_is_rejected() {
        assert!(matches!(
            parse_header("bad header", "x"),
            Err(ClientError::InvalidHeader(_))
        ));
        assert!(parse_header("x-trace", "abc").is_ok());
    }
}
