use crate::handlers::common::{success_response, validate_input};
use crate::{
    errors::ServiceError,
    models::{CatalogRecord, MarkupRule},
    ApiResponse, AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Creates the router for pricing endpoints
pub fn pricing_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/markup-rules",
            get(get_markup_rules).put(put_markup_rules),
        )
        .route("/recompute", post(recompute_prices))
}

fn validate_decimal_min_zero(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("decimal_min_zero"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct MarkupRuleRequest {
    /// Category the rule applies to; omit for the store-wide default.
    pub category: Option<String>,
    #[validate(custom = "validate_decimal_min_zero")]
    pub markup_percentage: Decimal,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct PutMarkupRulesRequest {
    #[validate]
    pub rules: Vec<MarkupRuleRequest>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct SetPriceRequest {
    /// Manual price override. Omit (or null) to clear the override and fall
    /// back to the markup rules.
    #[validate(custom = "validate_optional_decimal_min_zero")]
    pub price: Option<Decimal>,
}

fn validate_optional_decimal_min_zero(value: &Decimal) -> Result<(), ValidationError> {
    validate_decimal_min_zero(value)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecomputeResponse {
    /// Records whose sale price changed.
    pub updated: usize,
}

/// List the configured markup rules
#[utoipa::path(
    get,
    path = "/api/v1/pricing/markup-rules",
    responses(
        (status = 200, description = "Markup rules", body = crate::ApiResponse<Vec<MarkupRule>>)
    ),
    tag = "Pricing"
)]
pub async fn get_markup_rules(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let rules = state.services.pricing.markup_rules().await?;
    Ok(success_response(ApiResponse::success(rules)))
}

/// Create or update markup rules, one per category scope
#[utoipa::path(
    put,
    path = "/api/v1/pricing/markup-rules",
    request_body = PutMarkupRulesRequest,
    responses(
        (status = 200, description = "Stored rule set", body = crate::ApiResponse<Vec<MarkupRule>>),
        (status = 400, description = "Invalid rule", body = crate::errors::ErrorResponse)
    ),
    tag = "Pricing"
)]
pub async fn put_markup_rules(
    State(state): State<AppState>,
    Json(payload): Json<PutMarkupRulesRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let rules = payload
        .rules
        .into_iter()
        .map(|r| MarkupRule::new(r.category, r.markup_percentage))
        .collect();
    let stored = state.services.pricing.upsert_markup_rules(rules).await?;
    Ok(success_response(ApiResponse::success(stored)))
}

/// Re-run the pricing policy over the whole catalog
#[utoipa::path(
    post,
    path = "/api/v1/pricing/recompute",
    responses(
        (status = 200, description = "Recompute summary", body = crate::ApiResponse<RecomputeResponse>)
    ),
    tag = "Pricing"
)]
pub async fn recompute_prices(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let updated = state.services.pricing.recompute().await?;
    Ok(success_response(ApiResponse::success(RecomputeResponse {
        updated,
    })))
}

/// Set or clear a manual price override on one item
#[utoipa::path(
    put,
    path = "/api/v1/catalog/items/{id}/price",
    params(("id" = Uuid, Path, description = "Catalog item ID")),
    request_body = SetPriceRequest,
    responses(
        (status = 200, description = "Updated record", body = crate::ApiResponse<CatalogRecord>),
        (status = 400, description = "Invalid price", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Pricing"
)]
pub async fn set_item_price(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetPriceRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let record = match payload.price {
        Some(price) => state.services.pricing.set_override(id, price).await?,
        None => state.services.pricing.clear_override(id).await?,
    };
    Ok(success_response(ApiResponse::success(record)))
}
