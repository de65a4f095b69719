use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::ServiceError,
    services::purchases::EnrichedUsageEvent,
    services::usage::{validate_lines, LineValidation, UsageBatchOutcome, UsageLine},
    ApiResponse, AppState,
};

/// Build the usage recording Router scoped under `/api/v1/usage`.
pub fn usage_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(record_usage).get(list_usage_events))
        .route("/validate", post(validate_usage))
}

/// One requested usage line. Unit and rate are never taken from the
/// caller, they are resolved from the catalog on the server side.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsageLineRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordUsageRequest {
    pub site_id: Uuid,
    #[validate(length(min = 1, message = "At least one usage line is required"))]
    pub lines: Vec<UsageLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateUsageRequest {
    pub lines: Vec<UsageLineRequest>,
}

/// Query parameters for the usage ledger listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct UsageListQuery {
    /// Restrict the ledger to one site
    pub site_id: Option<Uuid>,
}

fn resolve_lines(
    requests: &[UsageLineRequest],
    snapshot: &crate::services::usage::CatalogSnapshot,
) -> Vec<UsageLine> {
    requests
        .iter()
        .map(|line| {
            UsageLine::from_request(line.product_id, line.quantity, line.notes.clone(), snapshot)
        })
        .collect()
}

/// Record a batch of material usage against a site
#[utoipa::path(
    post,
    path = "/api/v1/usage",
    request_body = RecordUsageRequest,
    responses(
        (status = 201, description = "Usage batch recorded", body = ApiResponse<UsageBatchOutcome>),
        (status = 400, description = "One or more lines failed validation", body = crate::errors::ErrorResponse),
        (status = 404, description = "Site not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Usage"
)]
pub async fn record_usage(
    State(state): State<AppState>,
    Json(payload): Json<RecordUsageRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let snapshot = state.services.usage.catalog_snapshot().await?;
    let lines = resolve_lines(&payload.lines, &snapshot);

    let outcome = state
        .services
        .usage
        .submit_batch(payload.site_id, lines, &snapshot)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(outcome))))
}

/// Dry-run validation of usage lines against current stock
#[utoipa::path(
    post,
    path = "/api/v1/usage/validate",
    request_body = ValidateUsageRequest,
    responses(
        (status = 200, description = "Per-line validation verdicts", body = ApiResponse<Vec<LineValidation>>)
    ),
    tag = "Usage"
)]
pub async fn validate_usage(
    State(state): State<AppState>,
    Json(payload): Json<ValidateUsageRequest>,
) -> Result<Json<ApiResponse<Vec<LineValidation>>>, ServiceError> {
    let snapshot = state.services.usage.catalog_snapshot().await?;
    let lines = resolve_lines(&payload.lines, &snapshot);
    let verdicts = validate_lines(&lines, &snapshot);

    Ok(Json(ApiResponse::success(verdicts)))
}

/// Usage ledger joined with product and site details, newest first
#[utoipa::path(
    get,
    path = "/api/v1/usage",
    params(UsageListQuery),
    responses(
        (status = 200, description = "Usage events retrieved successfully", body = ApiResponse<Vec<EnrichedUsageEvent>>)
    ),
    tag = "Usage"
)]
pub async fn list_usage_events(
    State(state): State<AppState>,
    Query(query): Query<UsageListQuery>,
) -> Result<Json<ApiResponse<Vec<EnrichedUsageEvent>>>, ServiceError> {
    let events = state
        .services
        .purchases
        .list_usage_events(query.site_id)
        .await?;

    Ok(Json(ApiResponse::success(events)))
}
