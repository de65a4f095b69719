use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Simplified error structure for OpenAPI documentation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Not Found",
    "message": "Product 550e8400-e29b-41d4-a716-446655440000 not found",
    "details": null,
    "request_id": "req-abc123xyz",
    "timestamp": "2025-06-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request", "Internal Server Error")
    #[schema(example = "Not Found")]
    pub error: String,
    /// Human-readable error description
    #[schema(example = "Product 550e8400-e29b-41d4-a716-446655440000 not found")]
    pub message: String,
    /// Additional error details (validation errors, per-line failures)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Line 2: quantity must be greater than 0")]
    pub details: Option<String>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "req-abc123xyz")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    #[schema(example = "2025-06-09T10:30:00.000Z")]
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Quantity must be greater than 0")]
    NonPositiveQuantity,

    #[error("Only {available} {unit} available in stock")]
    InsufficientStock { available: Decimal, unit: String },

    #[error("Batch validation failed for line(s) {0:?}")]
    BatchValidationFailed(Vec<usize>),

    #[error("Failed to record usage events: {0}")]
    LedgerWriteFailed(String),

    #[error("Insufficient stock for {name}")]
    StockUnderflow { product_id: Uuid, name: String },

    #[error("Stock update failed for {name}: {reason}")]
    StockUpdateFailed {
        product_id: Uuid,
        name: String,
        reason: String,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Internal server error")]
    InternalServerError,

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl ServiceError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        ServiceError::DatabaseError(error.into_db_err())
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) | Self::ProductNotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_)
            | Self::NonPositiveQuantity
            | Self::BatchValidationFailed(_)
            | Self::InvalidOperation(_)
            | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::StockUnderflow { .. } => StatusCode::CONFLICT,
            Self::LedgerWriteFailed(_)
            | Self::StockUpdateFailed { .. }
            | Self::EventError(_)
            | Self::InternalError(_)
            | Self::InternalServerError
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            // For internal errors, return generic messages to avoid leaking details
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            Self::InternalServerError => "Internal server error".to_string(),
            Self::LedgerWriteFailed(_) => "Failed to record usage events".to_string(),
            Self::StockUpdateFailed { name, .. } => {
                format!("Stock update failed for {}", name)
            }
            // For user-facing errors, return the actual message
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = self.response_message();

        let request_id = current_request_id();
        // Build standardized error response
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: error_message,
            details: None,
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rust_decimal_macros::dec;

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ProductNotFound(Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NonPositiveQuantity.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::BatchValidationFailed(vec![0]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InsufficientStock {
                available: dec!(10),
                unit: "kg".into()
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::StockUnderflow {
                product_id: Uuid::nil(),
                name: "Cement".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::LedgerWriteFailed("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::StockUpdateFailed {
                product_id: Uuid::nil(),
                name: "Cement".into(),
                reason: "boom".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::InternalServerError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn insufficient_stock_message_names_quantity_and_unit() {
        let err = ServiceError::InsufficientStock {
            available: dec!(10),
            unit: "kg".into(),
        };
        assert_eq!(err.to_string(), "Only 10 kg available in stock");
        assert_eq!(err.response_message(), "Only 10 kg available in stock");
    }

    #[test]
    fn batch_validation_message_names_failing_lines() {
        let err = ServiceError::BatchValidationFailed(vec![0, 2]);
        assert!(err.to_string().contains("[0, 2]"));
    }

    #[test]
    fn stock_underflow_message_names_product() {
        let err = ServiceError::StockUnderflow {
            product_id: Uuid::nil(),
            name: "Cement OPC 53".into(),
        };
        assert_eq!(err.to_string(), "Insufficient stock for Cement OPC 53");
    }

    #[test]
    fn service_error_response_message_hides_internal_details() {
        // Internal errors should NOT expose implementation details
        assert_eq!(
            ServiceError::InternalError("connection pool exhausted".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::LedgerWriteFailed("sqlx: constraint".into()).response_message(),
            "Failed to record usage events"
        );
        assert_eq!(
            ServiceError::StockUpdateFailed {
                product_id: Uuid::nil(),
                name: "Cement".into(),
                reason: "sqlx timeout".into()
            }
            .response_message(),
            "Stock update failed for Cement"
        );

        // User-facing errors SHOULD include the actual message
        assert_eq!(
            ServiceError::NotFound("Site not found".into()).response_message(),
            "Not found: Site not found"
        );
        assert_eq!(
            ServiceError::NonPositiveQuantity.response_message(),
            "Quantity must be greater than 0"
        );
    }

    #[tokio::test]
    async fn error_response_includes_request_id_when_scoped() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-err-42"), async {
                ServiceError::ProductNotFound(Uuid::nil()).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.request_id.as_deref(), Some("req-err-42"));
    }
}
