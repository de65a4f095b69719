use crate::{
    db::DbPool,
    entities::product::{self, Column as ProductColumn, Entity as Product},
    entities::site::Entity as Site,
    entities::usage_event,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalog state read once per recording session
///
/// All validation and stock arithmetic for a batch works against this
/// snapshot, never against re-read rows. A snapshot that goes stale between
/// read and submit produces stale stock writes; that trade-off is accepted
/// in exchange for keeping submission free of locks and transactions.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    products: Vec<product::Model>,
    by_id: HashMap<Uuid, usize>,
}

impl CatalogSnapshot {
    pub fn new(products: Vec<product::Model>) -> Self {
        let by_id = products
            .iter()
            .enumerate()
            .map(|(index, p)| (p.id, index))
            .collect();
        Self { products, by_id }
    }

    pub fn get(&self, id: &Uuid) -> Option<&product::Model> {
        self.by_id.get(id).map(|&index| &self.products[index])
    }

    pub fn products(&self) -> &[product::Model] {
        &self.products
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// One material line within a usage batch
///
/// Unit and rate are copied from the snapshot when the product is selected,
/// so the line's cost is fixed by the catalog as it looked at selection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UsageLine {
    pub product_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit: String,
    pub rate_per_unit: Decimal,
    pub notes: Option<String>,
}

impl UsageLine {
    /// A blank line with no product selected
    pub fn empty() -> Self {
        Self {
            product_id: None,
            quantity: Decimal::ZERO,
            unit: String::new(),
            rate_per_unit: Decimal::ZERO,
            notes: None,
        }
    }

    /// A line for a known catalog product
    pub fn for_product(product: &product::Model, quantity: Decimal, notes: Option<String>) -> Self {
        Self {
            product_id: Some(product.id),
            quantity,
            unit: product.unit.clone(),
            rate_per_unit: product.rate_per_unit,
            notes,
        }
    }

    /// A line built from request input, resolving unit and rate against the
    /// snapshot when the product exists
    pub fn from_request(
        product_id: Uuid,
        quantity: Decimal,
        notes: Option<String>,
        snapshot: &CatalogSnapshot,
    ) -> Self {
        match snapshot.get(&product_id) {
            Some(product) => Self::for_product(product, quantity, notes),
            None => Self {
                product_id: Some(product_id),
                quantity,
                unit: String::new(),
                rate_per_unit: Decimal::ZERO,
                notes,
            },
        }
    }
}

/// Cost of one line: quantity times the rate captured at selection time.
/// Decimal multiplication, no rounding.
pub fn line_cost(line: &UsageLine) -> Decimal {
    line.quantity * line.rate_per_unit
}

/// Total cost of a batch
pub fn batch_cost(lines: &[UsageLine]) -> Decimal {
    lines.iter().map(line_cost).sum()
}

/// Validate a single line against the snapshot
///
/// Checks run in order: the product must exist in the snapshot, the quantity
/// must be positive, and the quantity must not exceed the snapshot stock.
pub fn validate_line(line: &UsageLine, snapshot: &CatalogSnapshot) -> Result<(), ServiceError> {
    let product_id = line.product_id.ok_or_else(|| {
        ServiceError::ValidationError("A product must be selected for each line".to_string())
    })?;
    let product = snapshot
        .get(&product_id)
        .ok_or(ServiceError::ProductNotFound(product_id))?;

    if line.quantity <= Decimal::ZERO {
        return Err(ServiceError::NonPositiveQuantity);
    }

    if line.quantity > product.stock_quantity {
        return Err(ServiceError::InsufficientStock {
            available: product.stock_quantity,
            unit: product.unit.clone(),
        });
    }

    Ok(())
}

/// Validate a whole batch, collecting the indices of every failing line
pub fn validate_batch(lines: &[UsageLine], snapshot: &CatalogSnapshot) -> Result<(), ServiceError> {
    if lines.is_empty() {
        return Err(ServiceError::InvalidInput(
            "At least one usage line is required".to_string(),
        ));
    }

    let failing: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| validate_line(line, snapshot).is_err())
        .map(|(index, _)| index)
        .collect();

    if !failing.is_empty() {
        return Err(ServiceError::BatchValidationFailed(failing));
    }

    Ok(())
}

/// Per-line validation verdict, used by the dry-run endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LineValidation {
    pub index: usize,
    pub valid: bool,
    pub message: Option<String>,
}

/// Validate every line and report each verdict instead of failing fast
pub fn validate_lines(lines: &[UsageLine], snapshot: &CatalogSnapshot) -> Vec<LineValidation> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| match validate_line(line, snapshot) {
            Ok(()) => LineValidation {
                index,
                valid: true,
                message: None,
            },
            Err(e) => LineValidation {
                index,
                valid: false,
                message: Some(e.to_string()),
            },
        })
        .collect()
}

/// An in-progress usage batch being edited line by line
#[derive(Debug, Clone, Default)]
pub struct UsageDraft {
    lines: Vec<UsageLine>,
}

impl UsageDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a blank line and return its index
    pub fn add_line(&mut self) -> usize {
        self.lines.push(UsageLine::empty());
        self.lines.len() - 1
    }

    pub fn remove_line(&mut self, index: usize) -> Result<(), ServiceError> {
        if index >= self.lines.len() {
            return Err(ServiceError::InvalidInput(format!(
                "No usage line at index {}",
                index
            )));
        }
        self.lines.remove(index);
        Ok(())
    }

    /// Select the product for a line, copying its unit and rate from the
    /// snapshot and resetting the quantity to zero
    pub fn select_product(
        &mut self,
        index: usize,
        product_id: Uuid,
        snapshot: &CatalogSnapshot,
    ) -> Result<(), ServiceError> {
        let line = self.lines.get_mut(index).ok_or_else(|| {
            ServiceError::InvalidInput(format!("No usage line at index {}", index))
        })?;
        let product = snapshot
            .get(&product_id)
            .ok_or(ServiceError::ProductNotFound(product_id))?;

        line.product_id = Some(product.id);
        line.unit = product.unit.clone();
        line.rate_per_unit = product.rate_per_unit;
        line.quantity = Decimal::ZERO;

        Ok(())
    }

    pub fn set_quantity(&mut self, index: usize, quantity: Decimal) -> Result<(), ServiceError> {
        let line = self.lines.get_mut(index).ok_or_else(|| {
            ServiceError::InvalidInput(format!("No usage line at index {}", index))
        })?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn set_notes(&mut self, index: usize, notes: Option<String>) -> Result<(), ServiceError> {
        let line = self.lines.get_mut(index).ok_or_else(|| {
            ServiceError::InvalidInput(format!("No usage line at index {}", index))
        })?;
        line.notes = notes;
        Ok(())
    }

    pub fn lines(&self) -> &[UsageLine] {
        &self.lines
    }

    /// Running total over the draft as it stands
    pub fn batch_cost(&self) -> Decimal {
        batch_cost(&self.lines)
    }
}

/// Stock write that failed after the ledger insert succeeded
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockUpdateFailure {
    pub line_index: usize,
    pub product_id: Uuid,
    pub product_name: String,
    pub reason: String,
}

/// Result of a successful batch submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsageBatchOutcome {
    pub events_written: usize,
    pub batch_cost: Decimal,
    pub failed_stock_updates: Vec<StockUpdateFailure>,
}

/// Stock remaining after deducting a line's quantity from the snapshot value.
/// A consistent snapshot cannot drive this negative once the line has passed
/// validation; the check guards the arithmetic all the same.
fn next_stock(
    snapshot_stock: Decimal,
    quantity: Decimal,
    product: &product::Model,
) -> Result<Decimal, ServiceError> {
    let updated = snapshot_stock - quantity;
    if updated < Decimal::ZERO {
        return Err(ServiceError::StockUnderflow {
            product_id: product.id,
            name: product.name.clone(),
        });
    }
    Ok(updated)
}

/// Service recording material usage against sites
pub struct UsageService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl UsageService {
    /// Creates a new usage service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Read the catalog once for a recording session, ordered by name
    #[instrument(skip(self))]
    pub async fn catalog_snapshot(&self) -> Result<CatalogSnapshot, ServiceError> {
        let db = &*self.db_pool;

        let products = Product::find()
            .order_by_asc(ProductColumn::Name)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when reading catalog snapshot");
                ServiceError::db_error(format!("Failed to read catalog: {}", e))
            })?;

        Ok(CatalogSnapshot::new(products))
    }

    /// Submit a batch of usage lines for a site
    ///
    /// The write sequence is intentionally not atomic. The ledger insert goes
    /// first as a single batched statement; stock deductions follow one row at
    /// a time, computed from the snapshot. A stock write that fails is logged
    /// and reported while the remaining lines continue, and nothing rolls the
    /// ledger back. Stock quantities are written as snapshot minus quantity,
    /// so concurrent submissions against the same product lose updates rather
    /// than contend.
    #[instrument(skip(self, lines, snapshot), fields(line_count = lines.len()))]
    pub async fn submit_batch(
        &self,
        site_id: Uuid,
        lines: Vec<UsageLine>,
        snapshot: &CatalogSnapshot,
    ) -> Result<UsageBatchOutcome, ServiceError> {
        let db = &*self.db_pool;

        let site = Site::find_by_id(site_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(site_id = %site_id, error = %e, "Database error when finding site");
                ServiceError::db_error(format!("Failed to find site: {}", e))
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Site {} not found", site_id)))?;

        validate_batch(&lines, snapshot)?;

        // Resolve each line against the snapshot up front; validation has
        // already guaranteed every product is present.
        let mut resolved: Vec<(usize, &product::Model, &UsageLine)> =
            Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            let product_id = line.product_id.ok_or_else(|| {
                ServiceError::ValidationError(
                    "A product must be selected for each line".to_string(),
                )
            })?;
            let product = snapshot
                .get(&product_id)
                .ok_or(ServiceError::ProductNotFound(product_id))?;
            resolved.push((index, product, line));
        }

        // One submission instant stamps every row in the batch.
        let now = Utc::now();
        let rows: Vec<usage_event::ActiveModel> = resolved
            .iter()
            .map(|(_, product, line)| usage_event::ActiveModel {
                id: Set(Uuid::new_v4()),
                site_id: Set(site_id),
                product_id: Set(product.id),
                quantity_used: Set(line.quantity),
                usage_date: Set(now),
                notes: Set(line.notes.clone()),
                created_at: Set(now),
            })
            .collect();
        let events_written = rows.len();

        usage_event::Entity::insert_many(rows)
            .exec(db)
            .await
            .map_err(|e| {
                error!(site_id = %site_id, error = %e, "Ledger insert failed, no stock was touched");
                ServiceError::LedgerWriteFailed(e.to_string())
            })?;

        // Stock deductions follow the ledger insert. An underflow aborts the
        // remaining deductions and surfaces, leaving the ledger as written.
        let mut failed_stock_updates = Vec::new();
        for (index, product, line) in &resolved {
            let updated_stock = next_stock(product.stock_quantity, line.quantity, product)?;

            let update = product::ActiveModel {
                id: Set(product.id),
                stock_quantity: Set(updated_stock),
                updated_at: Set(Some(now)),
                ..Default::default()
            };

            match update.update(db).await {
                Ok(saved) => {
                    if saved.is_low_stock() {
                        self.event_sender
                            .send_or_log(Event::LowStockDetected {
                                product_id: saved.id,
                                stock_quantity: saved.stock_quantity,
                                threshold: saved.low_stock_threshold,
                            })
                            .await;
                    }
                }
                Err(e) => {
                    warn!(
                        product_id = %product.id,
                        line_index = index,
                        error = %e,
                        "Stock update failed, continuing with remaining lines"
                    );
                    crate::metrics::BUSINESS_METRICS.record_stock_update_failure();
                    failed_stock_updates.push(StockUpdateFailure {
                        line_index: *index,
                        product_id: product.id,
                        product_name: product.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let total_cost = batch_cost(&lines);
        crate::metrics::observe_histogram("usage_batch_cost", total_cost.to_f64().unwrap_or(0.0));

        self.event_sender
            .send_or_log(Event::UsageBatchRecorded {
                site_id,
                events_written,
                total_cost,
            })
            .await;

        info!(
            site_id = %site_id,
            site = %site.name,
            events_written,
            total_cost = %total_cost,
            failed_stock_updates = failed_stock_updates.len(),
            "Usage batch recorded"
        );

        Ok(UsageBatchOutcome {
            events_written,
            batch_cost: total_cost,
            failed_stock_updates,
        })
    }
}
