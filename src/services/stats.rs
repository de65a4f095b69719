use crate::{
    db::DbPool,
    entities::product::{Column as ProductColumn, Entity as Product},
    entities::site::{Column as SiteColumn, Entity as Site},
    errors::ServiceError,
    services::purchases::{load_enriched_events, site_total},
    services::sites::SiteStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

/// Headline numbers for the overview dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardMetrics {
    pub active_sites: u64,
    pub total_sites: u64,
    pub total_products: u64,
    /// Current catalog valuation: Σ stock_quantity × rate_per_unit
    pub total_stock_value: Decimal,
    /// Grand total over the whole usage ledger at today's rates
    pub total_purchase_cost: Decimal,
    pub low_stock_items: u64,
    pub generated_at: DateTime<Utc>,
}

/// Service computing dashboard statistics
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    /// Creates a new dashboard service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, ServiceError> {
        let db = &*self.db_pool;

        let active_sites = Site::find()
            .filter(SiteColumn::Status.eq(SiteStatus::Active.to_string()))
            .count(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when counting active sites");
                ServiceError::db_error(format!("Failed to count active sites: {}", e))
            })?;

        let total_sites = Site::find().count(db).await.map_err(|e| {
            error!(error = %e, "Database error when counting sites");
            ServiceError::db_error(format!("Failed to count sites: {}", e))
        })?;

        let products = Product::find().all(db).await.map_err(|e| {
            error!(error = %e, "Database error when reading catalog");
            ServiceError::db_error(format!("Failed to read catalog: {}", e))
        })?;
        let total_products = products.len() as u64;
        let total_stock_value: Decimal = products
            .iter()
            .map(|p| p.stock_quantity * p.rate_per_unit)
            .sum();

        let low_stock_items = Product::find()
            .filter(
                Expr::col(ProductColumn::StockQuantity)
                    .lte(Expr::col(ProductColumn::LowStockThreshold)),
            )
            .count(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when counting low stock products");
                ServiceError::db_error(format!("Failed to count low stock products: {}", e))
            })?;

        let events = load_enriched_events(db, None).await?;
        let total_purchase_cost = site_total(&events);

        crate::metrics::set_gauge("active_sites", active_sites as f64);
        crate::metrics::set_gauge("low_stock_items", low_stock_items as f64);
        crate::metrics::set_gauge(
            "total_stock_value",
            total_stock_value.to_f64().unwrap_or(0.0),
        );

        Ok(DashboardMetrics {
            active_sites,
            total_sites,
            total_products,
            total_stock_value,
            total_purchase_cost,
            low_stock_items,
            generated_at: Utc::now(),
        })
    }
}
