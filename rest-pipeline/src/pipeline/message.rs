//! Request and response records that travel through the handler chain.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Version};
use url::Url;

/// A fully resolved outgoing request.
///
/// The method is a plain [`Method`], so any verb (PATCH, WebDAV verbs, custom
/// extension methods) is expressed with the same record and passes through the
/// same handlers.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute target URL.
    pub url: Url,
    /// Request headers, including the authorization slot once stamped.
    pub headers: HeaderMap,
    /// Encoded body, if any.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Returns the header value as a string, if present and visible ASCII.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A response whose body has been read in full by the terminal transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Protocol version the server answered with.
    pub version: Version,
    /// Response headers, content headers included.
    pub headers: HeaderMap,
    /// Raw body bytes.
    pub body: Bytes,
    /// The request as it left the pipeline.
    pub request: Option<HttpRequest>,
}

impl HttpResponse {
    /// Creates an empty HTTP/1.1 response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            request: None,
        }
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Records the request that produced this response.
    pub fn with_request(mut self, request: HttpRequest) -> Self {
        self.request = Some(request);
        self
    }
}
