//! Fixtures shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::ApiError;
use crate::pipeline::{Handler, HttpRequest, HttpResponse, Next, Transport};

pub(crate) fn get_request(url: &str) -> HttpRequest {
    HttpRequest::new(Method::GET, Url::parse(url).unwrap())
}

/// Ordered record of who saw a request, shared between handlers and terminal.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Logs its name on the way in and `<name>:done` on the way out.
///
/// With [`watching`](Self::watching) the entry on the way in also records
/// the value of one header as the handler received it.
#[derive(Debug)]
pub(crate) struct LoggingHandler {
    name: String,
    log: EventLog,
    watch: Option<&'static str>,
}

impl LoggingHandler {
    pub(crate) fn new(name: impl Into<String>, log: EventLog) -> Self {
        Self {
            name: name.into(),
            log,
            watch: None,
        }
    }

    pub(crate) fn watching(mut self, header: &'static str) -> Self {
        self.watch = Some(header);
        self
    }
}

#[async_trait]
impl Handler for LoggingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse, ApiError> {
        match self.watch {
            Some(header) => self.log.push(format!(
                "{} saw {header}={}",
                self.name,
                request.header_str(header).unwrap_or("<unset>")
            )),
            None => self.log.push(self.name.clone()),
        }
        let response = next.run(request).await?;
        self.log.push(format!("{}:done", self.name));
        Ok(response)
    }
}

/// Terminal transport that records every request and answers with a canned
/// status and body.
#[derive(Debug, Clone)]
pub(crate) struct RecordingTransport {
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    status: StatusCode,
    body: &'static str,
    log: Option<EventLog>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self {
            requests: Arc::default(),
            status: StatusCode::OK,
            body: "",
            log: None,
        }
    }

    pub(crate) fn with_log(mut self, log: EventLog) -> Self {
        self.log = Some(log);
        self
    }

    pub(crate) fn responding(mut self, status: StatusCode, body: &'static str) -> Self {
        self.status = status;
        self.body = body;
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        if let Some(log) = &self.log {
            log.push("terminal");
        }
        self.requests.lock().unwrap().push(request.clone());

        Ok(HttpResponse::new(self.status)
            .with_body(self.body)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_request(request))
    }
}
