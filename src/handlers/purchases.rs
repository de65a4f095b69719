use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    errors::ServiceError, services::purchases::PurchaseReport, ApiResponse, AppState,
};

/// Build the purchase reporting Router scoped under `/api/v1/purchases`.
pub fn purchase_routes() -> Router<AppState> {
    Router::new().route("/summary", get(purchase_summary))
}

/// Query parameters for the purchase summary report
#[derive(Debug, Deserialize, IntoParams)]
pub struct PurchaseSummaryQuery {
    /// Keep only the summary for one site
    pub site_id: Option<Uuid>,
}

/// Per-site purchase summaries with a grand total
#[utoipa::path(
    get,
    path = "/api/v1/purchases/summary",
    params(PurchaseSummaryQuery),
    responses(
        (status = 200, description = "Purchase summaries retrieved successfully", body = ApiResponse<PurchaseReport>)
    ),
    tag = "Purchases"
)]
pub async fn purchase_summary(
    State(state): State<AppState>,
    Query(query): Query<PurchaseSummaryQuery>,
) -> Result<Json<ApiResponse<PurchaseReport>>, ServiceError> {
    let report = state
        .services
        .purchases
        .purchase_summaries(query.site_id)
        .await?;

    Ok(Json(ApiResponse::success(report)))
}
