use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{entities::product, errors::ServiceError, ApiResponse, AppState};

/// Build the product catalog Router scoped under `/api/v1/products`.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/low-stock", get(low_stock_products))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Product unit is required"))]
    pub unit: String,
    pub rate_per_unit: Decimal,
    pub stock_quantity: Decimal,
    pub low_stock_threshold: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub rate_per_unit: Option<Decimal>,
    pub stock_quantity: Option<Decimal>,
    pub low_stock_threshold: Option<Decimal>,
}

/// Query parameters for product listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListQuery {
    /// Substring match over product name and unit
    pub search: Option<String>,
}

/// List catalog products ordered by name
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products retrieved successfully", body = ApiResponse<Vec<product::Model>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Vec<product::Model>>>, ServiceError> {
    let products = state.services.products.list_products(query.search).await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Products at or below their low stock threshold
#[utoipa::path(
    get,
    path = "/api/v1/products/low-stock",
    responses(
        (status = 200, description = "Low stock products retrieved successfully", body = ApiResponse<Vec<product::Model>>)
    ),
    tag = "Products"
)]
pub async fn low_stock_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<product::Model>>>, ServiceError> {
    let products = state.services.products.low_stock_products().await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Create a catalog product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<product::Model>),
        (status = 400, description = "Invalid product payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let product = state
        .services
        .products
        .create_product(
            payload.name,
            payload.unit,
            payload.rate_per_unit,
            payload.stock_quantity,
            payload.low_stock_threshold,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// Fetch one product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product retrieved successfully", body = ApiResponse<product::Model>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<product::Model>>, ServiceError> {
    let product = state
        .services
        .products
        .get_product(&id)
        .await?
        .ok_or(ServiceError::ProductNotFound(id))?;

    Ok(Json(ApiResponse::success(product)))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<product::Model>),
        (status = 400, description = "Invalid product payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<product::Model>>, ServiceError> {
    payload.validate()?;

    let product = state
        .services
        .products
        .update_product(
            id,
            payload.name,
            payload.unit,
            payload.rate_per_unit,
            payload.stock_quantity,
            payload.low_stock_threshold,
        )
        .await?;

    Ok(Json(ApiResponse::success(product)))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
