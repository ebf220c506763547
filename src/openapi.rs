use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reeftide Catalog API",
        version = "1.0.0",
        description = r#"
# Reeftide Catalog API

Catalog management for a saltwater livestock storefront: CSV export
ingestion, category grouping, image correlation, and markup-based pricing.

## Workflow

1. `PUT /api/v1/pricing/markup-rules` to configure markup percentages.
2. `POST /api/v1/catalog/import` with a point-of-sale CSV export. The
   current catalog is replaced wholesale; stored images carry over by
   search key.
3. `GET /api/v1/catalog` serves the grouped storefront view. Pass
   `?view=privileged` to include disabled items.

## Error Handling

Failures use a consistent error body with appropriate HTTP status codes:

```json
{
  "error": "Unprocessable Entity",
  "message": "No valid data: the file produced zero catalog items",
  "timestamp": "2026-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Catalog", description = "Catalog import and item management"),
        (name = "Pricing", description = "Markup rules and price overrides")
    ),
    paths(
        handlers::catalog::import_catalog,
        handlers::catalog::get_catalog,
        handlers::catalog::wipe_catalog,
        handlers::catalog::get_item,
        handlers::catalog::disable_item,
        handlers::catalog::enable_item,
        handlers::catalog::archive_item,
        handlers::catalog::unarchive_item,
        handlers::catalog::attach_image,
        handlers::catalog::delete_item,
        handlers::pricing::get_markup_rules,
        handlers::pricing::put_markup_rules,
        handlers::pricing::recompute_prices,
        handlers::pricing::set_item_price,
    ),
    components(schemas(
        models::CatalogRecord,
        models::CatalogItemView,
        models::CategoryGroup,
        models::ImportStats,
        models::ParsedPrice,
        models::MarkupRule,
        crate::errors::ErrorResponse,
        handlers::catalog::ImportCatalogRequest,
        handlers::catalog::AttachImageRequest,
        handlers::pricing::MarkupRuleRequest,
        handlers::pricing::PutMarkupRulesRequest,
        handlers::pricing::SetPriceRequest,
        handlers::pricing::RecomputeResponse,
    ))
)]
pub struct ApiDoc;
