use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rest_pipeline::{
    ApiError, AuthError, AuthStrategy, ClientBuilder, ClientError, Handler, HeaderHandler,
    HttpRequest, HttpResponse, NamingPolicy, Next, SerializerOptions, TokenSource, TracingHandler,
};
use serde::{Deserialize, Serialize};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Widget {
    widget_id: u64,
    display_name: String,
}

/// Hands out `token-1`, `token-2`, ... on successive calls.
#[derive(Default)]
struct CountingTokens(AtomicUsize);

#[async_trait]
impl TokenSource for CountingTokens {
    async fn token(&self) -> Result<String, AuthError> {
        let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token-{n}"))
    }
}

/// Rejects requests to paths under `/admin` without reaching the server.
struct AdminGuard;

#[async_trait]
impl Handler for AdminGuard {
    fn name(&self) -> &str {
        "admin-guard"
    }

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse, ApiError> {
        if request.url.path().starts_with("/admin") {
            return Ok(HttpResponse::new(reqwest::StatusCode::FORBIDDEN).with_request(request));
        }
        next.run(request).await
    }
}

async fn client_for(server: &MockServer) -> rest_pipeline::RestClient {
    ClientBuilder::parse(&server.uri())
        .unwrap()
        .with_auth_strategy(AuthStrategy::bearer(CountingTokens::default()))
        .unwrap()
        .with_serializer_options(SerializerOptions {
            naming: NamingPolicy::CamelCase,
            ..SerializerOptions::default()
        })
        .unwrap()
        .with_request_handler(HeaderHandler::new("x-tenant", "acme").unwrap())
        .with_request_handler(AdminGuard)
        .with_request_handler(TracingHandler)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_tokens_are_fetched_per_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/1"))
        .and(header("authorization", "Bearer token-1"))
        .and(header("x-tenant", "acme"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"widgetId": 1, "displayName": "cog"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/widgets/2"))
        .and(header("authorization", "Bearer token-2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"widgetId": 2, "displayName": "gear"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let first = client.get("/widgets/1").json::<Widget>().await.unwrap();
    let second = client.get("/widgets/2").json::<Widget>().await.unwrap();

    assert_eq!(
        first.into_content(),
        Some(Widget {
            widget_id: 1,
            display_name: "cog".to_string()
        })
    );
    assert_eq!(second.content().map(|w| w.widget_id), Some(2));
}

#[tokio::test]
async fn test_patch_body_uses_naming_policy() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/widgets/7"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"widgetId": 7, "displayName": "sprocket"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let envelope = client
        .patch("/widgets/7")
        .body(&Widget {
            widget_id: 7,
            display_name: "sprocket".to_string(),
        })
        .json::<Widget>()
        .await
        .unwrap();

    assert_eq!(envelope.status().as_u16(), 204);
    assert!(envelope.content().is_none());
}

#[tokio::test]
async fn test_handler_can_short_circuit() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    let envelope = client.delete("/admin/widgets").send().await.unwrap();

    assert_eq!(envelope.status().as_u16(), 403);
    assert!(server.received_requests().await.unwrap().is_empty());

    let result = envelope.error_for_status();
    assert!(matches!(
        result,
        Err(ApiError::Client(ClientError::HttpStatus { status: 403, .. }))
    ));
}

#[tokio::test]
async fn test_shared_client_across_tasks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .expect(8)
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server).await);
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.get("/ping").send().await.map(|e| e.status()) })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().unwrap().is_success());
    }

    let mut tokens: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|r| r.headers.get("authorization"))
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    tokens.sort();
    tokens.dedup();
    assert_eq!(tokens.len(), 8);
}
