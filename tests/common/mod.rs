use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use reeftide_api::{
    config::AppConfig,
    events::{self, EventSender},
    handlers::AppServices,
    services::catalog::{CatalogService, PricingService},
    services::storage::InMemoryCatalogStore,
    AppState,
};

/// Test harness wiring the full router over a fresh in-memory store.
pub struct TestApp {
    router: Router,
    #[allow(dead_code)]
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = AppConfig::default();

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let store = Arc::new(InMemoryCatalogStore::new());
        let services = AppServices {
            catalog: Arc::new(CatalogService::new(store.clone(), event_sender.clone())),
            pricing: Arc::new(PricingService::new(store, event_sender.clone())),
        };

        let state = AppState {
            config: cfg,
            event_sender,
            services,
        };

        let router = reeftide_api::app_router().with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Sends one request through the router and returns the status plus the
    /// parsed JSON body (`Null` for empty bodies).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not JSON")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Imports a CSV export, panicking on failure.
    pub async fn import(&self, contents: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/catalog/import",
                serde_json::json!({
                    "file_name": "export.csv",
                    "contents": contents,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "import failed: {}", body);
        body
    }
}
