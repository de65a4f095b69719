use axum::{extract::State, routing::get, Json, Router};

use crate::{errors::ServiceError, services::stats::DashboardMetrics, ApiResponse, AppState};

/// Build the dashboard Router scoped under `/api/v1/dashboard`.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(dashboard_metrics))
}

/// Aggregate counts and cost figures for the dashboard
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard metrics retrieved successfully", body = ApiResponse<DashboardMetrics>)
    ),
    tag = "Dashboard"
)]
pub async fn dashboard_metrics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardMetrics>>, ServiceError> {
    let metrics = state.services.dashboard.dashboard_metrics().await?;
    Ok(Json(ApiResponse::success(metrics)))
}
