use crate::handlers::common::{
    created_response, no_content_response, success_response, validate_input, ViewParams,
};
use crate::{
    errors::ServiceError,
    models::{CatalogItemView, CategoryGroup, ImportStats},
    ApiResponse, AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for catalog endpoints
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_catalog).delete(wipe_catalog))
        .route("/import", post(import_catalog))
        .route("/items/:id", get(get_item).delete(delete_item))
        .route("/items/:id/disable", post(disable_item))
        .route("/items/:id/enable", post(enable_item))
        .route("/items/:id/archive", post(archive_item))
        .route("/items/:id/unarchive", post(unarchive_item))
        .route("/items/:id/image", put(attach_image))
        .route(
            "/items/:id/price",
            put(crate::handlers::pricing::set_item_price),
        )
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ImportCatalogRequest {
    /// Original file name; used for format detection before parsing.
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    /// Full file contents as UTF-8 text.
    #[validate(length(min = 1))]
    pub contents: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct AttachImageRequest {
    /// Direct URL or inline `data:image/...;base64,` payload.
    #[validate(length(min = 1))]
    pub image: String,
}

/// Import a catalog export, replacing the current catalog
#[utoipa::path(
    post,
    path = "/api/v1/catalog/import",
    request_body = ImportCatalogRequest,
    responses(
        (status = 201, description = "Catalog replaced", body = crate::ApiResponse<ImportStats>),
        (status = 400, description = "Unsupported or malformed file", body = crate::errors::ErrorResponse),
        (status = 422, description = "File produced zero items", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn import_catalog(
    State(state): State<AppState>,
    Json(payload): Json<ImportCatalogRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let stats = state
        .services
        .catalog
        .import_catalog(&payload.file_name, &payload.contents)
        .await?;
    Ok(created_response(ApiResponse::success(stats)))
}

/// Get the catalog grouped by category
#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    params(ViewParams),
    responses(
        (status = 200, description = "Grouped catalog", body = crate::ApiResponse<Vec<CategoryGroup>>)
    ),
    tag = "Catalog"
)]
pub async fn get_catalog(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let view = params.resolve()?;
    let groups = state.services.catalog.grouped_catalog(view).await?;
    Ok(success_response(ApiResponse::success(groups)))
}

/// Wipe the entire catalog
#[utoipa::path(
    delete,
    path = "/api/v1/catalog",
    responses(
        (status = 204, description = "Catalog wiped")
    ),
    tag = "Catalog"
)]
pub async fn wipe_catalog(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    state.services.catalog.wipe().await?;
    Ok(no_content_response())
}

/// Get one catalog item
#[utoipa::path(
    get,
    path = "/api/v1/catalog/items/{id}",
    params(("id" = Uuid, Path, description = "Catalog item ID")),
    responses(
        (status = 200, description = "Catalog item", body = crate::ApiResponse<CatalogItemView>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let item = state.services.catalog.item(id).await?;
    Ok(success_response(ApiResponse::success(item)))
}

/// Hide an item from the public catalog without losing it
#[utoipa::path(
    post,
    path = "/api/v1/catalog/items/{id}/disable",
    params(("id" = Uuid, Path, description = "Catalog item ID")),
    responses(
        (status = 200, description = "Item disabled", body = crate::ApiResponse<CatalogItemView>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn disable_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let item = state.services.catalog.set_disabled(id, true).await?;
    Ok(success_response(ApiResponse::success(item)))
}

/// Return a disabled item to the public catalog
#[utoipa::path(
    post,
    path = "/api/v1/catalog/items/{id}/enable",
    params(("id" = Uuid, Path, description = "Catalog item ID")),
    responses(
        (status = 200, description = "Item enabled", body = crate::ApiResponse<CatalogItemView>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn enable_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let item = state.services.catalog.set_disabled(id, false).await?;
    Ok(success_response(ApiResponse::success(item)))
}

/// Archive an item, removing it from every catalog view
#[utoipa::path(
    post,
    path = "/api/v1/catalog/items/{id}/archive",
    params(("id" = Uuid, Path, description = "Catalog item ID")),
    responses(
        (status = 200, description = "Item archived", body = crate::ApiResponse<CatalogItemView>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn archive_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let item = state.services.catalog.set_archived(id, true).await?;
    Ok(success_response(ApiResponse::success(item)))
}

/// Restore an archived item
#[utoipa::path(
    post,
    path = "/api/v1/catalog/items/{id}/unarchive",
    params(("id" = Uuid, Path, description = "Catalog item ID")),
    responses(
        (status = 200, description = "Item restored", body = crate::ApiResponse<CatalogItemView>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn unarchive_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let item = state.services.catalog.set_archived(id, false).await?;
    Ok(success_response(ApiResponse::success(item)))
}

/// Attach an image to an item and every row sharing its search key
#[utoipa::path(
    put,
    path = "/api/v1/catalog/items/{id}/image",
    params(("id" = Uuid, Path, description = "Catalog item ID")),
    request_body = AttachImageRequest,
    responses(
        (status = 200, description = "Image attached", body = crate::ApiResponse<CatalogItemView>),
        (status = 400, description = "Invalid image payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn attach_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachImageRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let item = state
        .services
        .catalog
        .attach_image(id, payload.image)
        .await?;
    Ok(success_response(ApiResponse::success(item)))
}

/// Permanently remove one item
#[utoipa::path(
    delete,
    path = "/api/v1/catalog/items/{id}",
    params(("id" = Uuid, Path, description = "Catalog item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    state.services.catalog.delete_item(id).await?;
    Ok(no_content_response())
}
