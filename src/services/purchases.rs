use crate::{
    db::DbPool,
    entities::product::{self, Entity as Product},
    entities::site::{self, Entity as Site},
    entities::usage_event::{Column as UsageColumn, Entity as UsageEvent},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// A ledger row joined with its product and site at read time
///
/// The cost is derived here from the product's current rate, so editing a
/// rate reprices the whole history that references it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrichedUsageEvent {
    pub id: Uuid,
    pub site_id: Uuid,
    pub site_name: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub rate_per_unit: Decimal,
    pub quantity_used: Decimal,
    pub usage_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub total_cost: Decimal,
}

/// Per-site purchase rollup
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseSummary {
    pub site_id: Uuid,
    pub site_name: String,
    pub lines: Vec<EnrichedUsageEvent>,
    pub total_cost: Decimal,
}

/// The full purchase report served to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseReport {
    pub summaries: Vec<PurchaseSummary>,
    pub grand_total: Decimal,
}

/// Read ledger rows (optionally for one site), newest first, joined with
/// product and site
///
/// Rows whose product or site has been deleted have nothing to join against
/// and are omitted.
pub(crate) async fn load_enriched_events(
    db: &DbPool,
    site_id: Option<Uuid>,
) -> Result<Vec<EnrichedUsageEvent>, ServiceError> {
    let mut query = UsageEvent::find();
    if let Some(site_id) = site_id {
        query = query.filter(UsageColumn::SiteId.eq(site_id));
    }

    let events = query
        .order_by_desc(UsageColumn::UsageDate)
        .all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error when reading usage ledger");
            ServiceError::db_error(format!("Failed to read usage ledger: {}", e))
        })?;

    if events.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = events
        .iter()
        .map(|e| e.product_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let site_ids: Vec<Uuid> = events
        .iter()
        .map(|e| e.site_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let products: HashMap<Uuid, product::Model> = Product::find()
        .filter(product::Column::Id.is_in(product_ids))
        .all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error when joining products onto usage ledger");
            ServiceError::db_error(format!("Failed to load products for ledger: {}", e))
        })?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let sites: HashMap<Uuid, site::Model> = Site::find()
        .filter(site::Column::Id.is_in(site_ids))
        .all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error when joining sites onto usage ledger");
            ServiceError::db_error(format!("Failed to load sites for ledger: {}", e))
        })?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let mut enriched = Vec::with_capacity(events.len());
    for event in events {
        let (product, site) = match (products.get(&event.product_id), sites.get(&event.site_id)) {
            (Some(product), Some(site)) => (product, site),
            _ => {
                debug!(
                    event_id = %event.id,
                    product_id = %event.product_id,
                    site_id = %event.site_id,
                    "Skipping ledger row whose product or site no longer exists"
                );
                continue;
            }
        };

        enriched.push(EnrichedUsageEvent {
            id: event.id,
            site_id: event.site_id,
            site_name: site.name.clone(),
            product_id: event.product_id,
            product_name: product.name.clone(),
            unit: product.unit.clone(),
            rate_per_unit: product.rate_per_unit,
            quantity_used: event.quantity_used,
            usage_date: event.usage_date,
            notes: event.notes,
            total_cost: event.quantity_used * product.rate_per_unit,
        });
    }

    Ok(enriched)
}

/// Total cost across a slice of enriched events
pub fn site_total(events: &[EnrichedUsageEvent]) -> Decimal {
    events.iter().map(|e| e.total_cost).sum()
}

/// Group events into per-site summaries
///
/// Sites appear in the order they are first seen in the input, and each
/// summary's lines keep the input order. Sites with no events do not appear.
pub fn aggregate_by_site(events: &[EnrichedUsageEvent]) -> Vec<PurchaseSummary> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut groups: HashMap<Uuid, PurchaseSummary> = HashMap::new();

    for event in events {
        let summary = groups.entry(event.site_id).or_insert_with(|| {
            order.push(event.site_id);
            PurchaseSummary {
                site_id: event.site_id,
                site_name: event.site_name.clone(),
                lines: Vec::new(),
                total_cost: Decimal::ZERO,
            }
        });
        summary.total_cost += event.total_cost;
        summary.lines.push(event.clone());
    }

    order
        .into_iter()
        .filter_map(|site_id| groups.remove(&site_id))
        .collect()
}

/// Sum of the per-site totals
pub fn grand_total(summaries: &[PurchaseSummary]) -> Decimal {
    summaries.iter().map(|s| s.total_cost).sum()
}

/// Keep only the summary for the requested site, if any
pub fn filter_by_site(
    summaries: Vec<PurchaseSummary>,
    site_id: Option<Uuid>,
) -> Vec<PurchaseSummary> {
    match site_id {
        Some(site_id) => summaries
            .into_iter()
            .filter(|s| s.site_id == site_id)
            .collect(),
        None => summaries,
    }
}

/// Service producing purchase reports from the usage ledger
pub struct PurchaseSummaryService {
    db_pool: Arc<DbPool>,
}

impl PurchaseSummaryService {
    /// Creates a new purchase summary service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Enriched ledger rows, newest first, optionally for one site
    #[instrument(skip(self))]
    pub async fn list_usage_events(
        &self,
        site_id: Option<Uuid>,
    ) -> Result<Vec<EnrichedUsageEvent>, ServiceError> {
        load_enriched_events(&self.db_pool, site_id).await
    }

    /// Purchase report across the whole ledger, optionally narrowed to one
    /// site after aggregation
    #[instrument(skip(self))]
    pub async fn purchase_summaries(
        &self,
        site_id: Option<Uuid>,
    ) -> Result<PurchaseReport, ServiceError> {
        let events = load_enriched_events(&self.db_pool, None).await?;
        let summaries = filter_by_site(aggregate_by_site(&events), site_id);
        let total = grand_total(&summaries);

        Ok(PurchaseReport {
            summaries,
            grand_total: total,
        })
    }
}
