use crate::{
    db::DbPool,
    entities::product::{self, Column as ProductColumn, Entity as Product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    Set,
};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Stock threshold applied when a product is created without one
pub const DEFAULT_LOW_STOCK_THRESHOLD: Decimal = dec!(10);

/// Service for managing the material catalog
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ProductService {
    /// Creates a new product service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Create a new product
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        name: String,
        unit: String,
        rate_per_unit: Decimal,
        stock_quantity: Decimal,
        low_stock_threshold: Option<Decimal>,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db_pool;

        let name = name.trim().to_string();
        let unit = unit.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Product name is required".to_string(),
            ));
        }
        if unit.is_empty() {
            return Err(ServiceError::ValidationError(
                "Product unit is required".to_string(),
            ));
        }
        if rate_per_unit < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Rate per unit must not be negative".to_string(),
            ));
        }
        if stock_quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Stock quantity must not be negative".to_string(),
            ));
        }
        let threshold = low_stock_threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        if threshold < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Low stock threshold must not be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            unit: Set(unit),
            rate_per_unit: Set(rate_per_unit),
            stock_quantity: Set(stock_quantity),
            low_stock_threshold: Set(threshold),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let created = model.insert(db).await.map_err(|e| {
            let msg = format!("Failed to create product: {}", e);
            error!(%msg);
            ServiceError::db_error(msg)
        })?;

        self.event_sender
            .send(Event::ProductCreated(created.id))
            .await
            .map_err(|e| {
                let msg = format!("Failed to publish product created event: {}", e);
                error!(%msg);
                ServiceError::EventError(msg)
            })?;

        info!(product_id = %created.id, name = %name, "Product created successfully");

        Ok(created)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &Uuid) -> Result<Option<product::Model>, ServiceError> {
        let db = &*self.db_pool;

        let found = Product::find_by_id(*id).one(db).await.map_err(|e| {
            error!(product_id = %id, error = %e, "Database error when fetching product");
            ServiceError::db_error(format!("Failed to get product: {}", e))
        })?;

        Ok(found)
    }

    /// List products ordered by name, optionally filtered by a substring search
    /// over name and unit
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        search_term: Option<String>,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = Product::find();

        if let Some(term) = search_term {
            let term = term.trim().to_lowercase();
            if !term.is_empty() {
                let pattern = format!("%{}%", term);
                query = query.filter(
                    Condition::any()
                        .add(
                            Expr::expr(Func::lower(Expr::col(ProductColumn::Name)))
                                .like(&pattern),
                        )
                        .add(
                            Expr::expr(Func::lower(Expr::col(ProductColumn::Unit)))
                                .like(&pattern),
                        ),
                );
            }
        }

        let products = query
            .order_by_asc(ProductColumn::Name)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when listing products");
                ServiceError::db_error(format!("Failed to list products: {}", e))
            })?;

        Ok(products)
    }

    /// Products whose stock has fallen to or below their threshold, ordered by name
    #[instrument(skip(self))]
    pub async fn low_stock_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;

        let products = Product::find()
            .filter(
                Expr::col(ProductColumn::StockQuantity)
                    .lte(Expr::col(ProductColumn::LowStockThreshold)),
            )
            .order_by_asc(ProductColumn::Name)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when listing low stock products");
                ServiceError::db_error(format!("Failed to list low stock products: {}", e))
            })?;

        Ok(products)
    }

    /// Update a product
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: Uuid,
        name: Option<String>,
        unit: Option<String>,
        rate_per_unit: Option<Decimal>,
        stock_quantity: Option<Decimal>,
        low_stock_threshold: Option<Decimal>,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db_pool;

        let existing = Product::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(product_id = %id, error = %e, "Database error when finding product");
                ServiceError::db_error(format!("Failed to find product: {}", e))
            })?
            .ok_or(ServiceError::ProductNotFound(id))?;

        let mut model: product::ActiveModel = existing.into();

        if let Some(name) = name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Product name is required".to_string(),
                ));
            }
            model.name = Set(name);
        }

        if let Some(unit) = unit {
            let unit = unit.trim().to_string();
            if unit.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Product unit is required".to_string(),
                ));
            }
            model.unit = Set(unit);
        }

        if let Some(rate) = rate_per_unit {
            if rate < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Rate per unit must not be negative".to_string(),
                ));
            }
            model.rate_per_unit = Set(rate);
        }

        if let Some(stock) = stock_quantity {
            if stock < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Stock quantity must not be negative".to_string(),
                ));
            }
            model.stock_quantity = Set(stock);
        }

        if let Some(threshold) = low_stock_threshold {
            if threshold < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Low stock threshold must not be negative".to_string(),
                ));
            }
            model.low_stock_threshold = Set(threshold);
        }

        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(db).await.map_err(|e| {
            error!(product_id = %id, error = %e, "Database error when updating product");
            ServiceError::db_error(format!("Failed to update product: {}", e))
        })?;

        self.event_sender
            .send(Event::ProductUpdated(updated.id))
            .await
            .map_err(|e| {
                let msg = format!("Failed to publish product updated event: {}", e);
                error!(%msg);
                ServiceError::EventError(msg)
            })?;

        info!(product_id = %updated.id, "Product updated successfully");

        Ok(updated)
    }

    /// Delete a product
    ///
    /// Usage ledger rows referencing the product are left in place.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = Product::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(product_id = %id, error = %e, "Database error when finding product");
                ServiceError::db_error(format!("Failed to find product: {}", e))
            })?
            .ok_or(ServiceError::ProductNotFound(id))?;

        existing.delete(db).await.map_err(|e| {
            error!(product_id = %id, error = %e, "Database error when deleting product");
            ServiceError::db_error(format!("Failed to delete product: {}", e))
        })?;

        self.event_sender
            .send(Event::ProductDeleted(id))
            .await
            .map_err(|e| {
                let msg = format!("Failed to publish product deleted event: {}", e);
                error!(%msg);
                ServiceError::EventError(msg)
            })?;

        info!(product_id = %id, "Product deleted successfully");

        Ok(())
    }
}
