//! Reeftide API Library
//!
//! Catalog ingestion, normalization, and pricing for a saltwater livestock
//! storefront, exposed over HTTP.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn catalog_service(&self) -> Arc<services::catalog::CatalogService> {
        self.services.catalog.clone()
    }

    pub fn pricing_service(&self) -> Arc<services::catalog::PricingService> {
        self.services.pricing.clone()
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

pub type ApiResult<T> = Result<T, errors::ServiceError>;

/// Service status endpoint: name, version, and wall-clock timestamp.
async fn status_endpoint() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Liveness/readiness probe backed by a store connectivity check.
async fn health_endpoint(State(state): State<AppState>) -> Json<Value> {
    let store_ok = state.services.catalog.ping().await.is_ok();
    Json(json!({
        "status": if store_ok { "healthy" } else { "degraded" },
        "store": if store_ok { "up" } else { "down" },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Builds the versioned API router plus the unversioned probe endpoints.
pub fn app_router() -> Router<AppState> {
    let api_v1 = Router::new()
        .nest("/catalog", handlers::catalog::catalog_routes())
        .nest("/pricing", handlers::pricing::pricing_routes());

    Router::new()
        .route("/status", get(status_endpoint))
        .route("/health", get(health_endpoint))
        .nest("/api/v1", api_v1)
}
