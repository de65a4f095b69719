use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::site,
    errors::ServiceError,
    services::sites::{SiteStatus, SiteUsageReport},
    ApiResponse, AppState,
};

/// Build the site management Router scoped under `/api/v1/sites`.
pub fn site_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sites).post(create_site))
        .route("/:id", get(get_site).put(update_site).delete(delete_site))
        .route("/:id/usage", get(site_usage))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSiteRequest {
    #[validate(length(min = 1, message = "Site name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Site location is required"))]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub supervisor: Option<String>,
    pub manager: Option<String>,
    pub status: Option<SiteStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSiteRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub supervisor: Option<String>,
    pub manager: Option<String>,
    pub status: Option<SiteStatus>,
}

/// List construction sites ordered by name
#[utoipa::path(
    get,
    path = "/api/v1/sites",
    responses(
        (status = 200, description = "Sites retrieved successfully", body = ApiResponse<Vec<site::Model>>)
    ),
    tag = "Sites"
)]
pub async fn list_sites(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<site::Model>>>, ServiceError> {
    let sites = state.services.sites.list_sites().await?;
    Ok(Json(ApiResponse::success(sites)))
}

/// Register a construction site
#[utoipa::path(
    post,
    path = "/api/v1/sites",
    request_body = CreateSiteRequest,
    responses(
        (status = 201, description = "Site created", body = ApiResponse<site::Model>),
        (status = 400, description = "Invalid site payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Sites"
)]
pub async fn create_site(
    State(state): State<AppState>,
    Json(payload): Json<CreateSiteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let site = state
        .services
        .sites
        .create_site(
            payload.name,
            payload.location,
            payload.start_date,
            payload.end_date,
            payload.supervisor,
            payload.manager,
            payload.status,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(site))))
}

/// Fetch one site
#[utoipa::path(
    get,
    path = "/api/v1/sites/{id}",
    params(("id" = Uuid, Path, description = "Site id")),
    responses(
        (status = 200, description = "Site retrieved successfully", body = ApiResponse<site::Model>),
        (status = 404, description = "Site not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Sites"
)]
pub async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<site::Model>>, ServiceError> {
    let site = state
        .services
        .sites
        .get_site(&id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Site {} not found", id)))?;

    Ok(Json(ApiResponse::success(site)))
}

/// Update a site
#[utoipa::path(
    put,
    path = "/api/v1/sites/{id}",
    params(("id" = Uuid, Path, description = "Site id")),
    request_body = UpdateSiteRequest,
    responses(
        (status = 200, description = "Site updated", body = ApiResponse<site::Model>),
        (status = 400, description = "Invalid site payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Site not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Sites"
)]
pub async fn update_site(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSiteRequest>,
) -> Result<Json<ApiResponse<site::Model>>, ServiceError> {
    payload.validate()?;

    let site = state
        .services
        .sites
        .update_site(
            id,
            payload.name,
            payload.location,
            payload.start_date,
            payload.end_date,
            payload.supervisor,
            payload.manager,
            payload.status,
        )
        .await?;

    Ok(Json(ApiResponse::success(site)))
}

/// Delete a site
#[utoipa::path(
    delete,
    path = "/api/v1/sites/{id}",
    params(("id" = Uuid, Path, description = "Site id")),
    responses(
        (status = 204, description = "Site deleted"),
        (status = 404, description = "Site not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Sites"
)]
pub async fn delete_site(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.sites.delete_site(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Usage history and total material cost for one site
#[utoipa::path(
    get,
    path = "/api/v1/sites/{id}/usage",
    params(("id" = Uuid, Path, description = "Site id")),
    responses(
        (status = 200, description = "Site usage retrieved successfully", body = ApiResponse<SiteUsageReport>),
        (status = 404, description = "Site not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Sites"
)]
pub async fn site_usage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SiteUsageReport>>, ServiceError> {
    let report = state.services.sites.site_usage(id).await?;
    Ok(Json(ApiResponse::success(report)))
}
