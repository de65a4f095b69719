use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SiteStock API",
        version = "1.0.0",
        description = r#"
# SiteStock Construction Material Management API

An API for managing construction sites, a material catalog with live stock
levels, stock-decrementing usage recording, and per-site purchase reporting.

## Features

- **Material Catalog**: Products with unit, rate and stock level
- **Site Registry**: Construction sites with schedule and staffing details
- **Usage Recording**: Batched, validated material consumption that decrements stock
- **Purchase Reports**: Per-site cost summaries priced at current catalog rates
- **Dashboard**: Aggregate site, stock and spend figures
- **Low Stock Alerts**: Products at or below their configured threshold

## Error Handling

The API uses consistent error response formats with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Validation failed",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

Costs are always derived from the catalog at read time, so historical usage is
repriced whenever a product's rate changes.
        "#,
        contact(
            name = "SiteStock Support",
            email = "support@sitestock.dev",
            url = "https://sitestock.dev"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "https://api.sitestock.dev/v1", description = "Production server"),
        (url = "http://localhost:8080/api/v1", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Material catalog endpoints"),
        (name = "Sites", description = "Construction site endpoints"),
        (name = "Usage", description = "Material usage recording endpoints"),
        (name = "Purchases", description = "Purchase reporting endpoints"),
        (name = "Dashboard", description = "Aggregate metrics endpoints")
    ),
    paths(
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::low_stock_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Sites
        crate::handlers::sites::list_sites,
        crate::handlers::sites::create_site,
        crate::handlers::sites::get_site,
        crate::handlers::sites::update_site,
        crate::handlers::sites::delete_site,
        crate::handlers::sites::site_usage,

        // Usage
        crate::handlers::usage::record_usage,
        crate::handlers::usage::validate_usage,
        crate::handlers::usage::list_usage_events,

        // Purchases
        crate::handlers::purchases::purchase_summary,

        // Dashboard
        crate::handlers::dashboard::dashboard_metrics,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,

            // Entities
            crate::entities::product::Model,
            crate::entities::site::Model,
            crate::entities::usage_event::Model,

            // Product types
            crate::handlers::products::CreateProductRequest,
            crate::handlers::products::UpdateProductRequest,

            // Site types
            crate::handlers::sites::CreateSiteRequest,
            crate::handlers::sites::UpdateSiteRequest,
            crate::services::sites::SiteStatus,
            crate::services::sites::SiteUsageReport,

            // Usage types
            crate::handlers::usage::UsageLineRequest,
            crate::handlers::usage::RecordUsageRequest,
            crate::handlers::usage::ValidateUsageRequest,
            crate::services::usage::LineValidation,
            crate::services::usage::UsageBatchOutcome,
            crate::services::usage::StockUpdateFailure,

            // Purchase reporting types
            crate::services::purchases::EnrichedUsageEvent,
            crate::services::purchases::PurchaseSummary,
            crate::services::purchases::PurchaseReport,

            // Dashboard types
            crate::services::stats::DashboardMetrics,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
