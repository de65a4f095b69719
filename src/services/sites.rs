use crate::{
    db::DbPool,
    entities::site::{self, Column as SiteColumn, Entity as Site},
    errors::ServiceError,
    events::{Event, EventSender},
    services::purchases::{load_enriched_events, site_total, EnrichedUsageEvent},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of a construction site
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SiteStatus {
    Active,
    Completed,
    OnHold,
}

impl Default for SiteStatus {
    fn default() -> Self {
        SiteStatus::Active
    }
}

/// A site's usage ledger together with its total material cost
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SiteUsageReport {
    pub site_id: Uuid,
    pub site_name: String,
    pub events: Vec<EnrichedUsageEvent>,
    pub total_cost: Decimal,
}

fn validate_site_dates(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Result<(), ServiceError> {
    if let Some(end) = end_date {
        if end < start_date {
            return Err(ServiceError::ValidationError(
                "End date must not precede start date".to_string(),
            ));
        }
    }
    Ok(())
}

/// Service for managing construction sites
pub struct SiteService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SiteService {
    /// Creates a new site service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Create a new site
    #[instrument(skip(self))]
    pub async fn create_site(
        &self,
        name: String,
        location: String,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        supervisor: Option<String>,
        manager: Option<String>,
        status: Option<SiteStatus>,
    ) -> Result<site::Model, ServiceError> {
        let db = &*self.db_pool;

        let name = name.trim().to_string();
        let location = location.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Site name is required".to_string(),
            ));
        }
        if location.is_empty() {
            return Err(ServiceError::ValidationError(
                "Site location is required".to_string(),
            ));
        }
        validate_site_dates(start_date, end_date)?;

        let now = Utc::now();
        let model = site::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            location: Set(location),
            start_date: Set(start_date),
            end_date: Set(end_date),
            supervisor: Set(supervisor),
            manager: Set(manager),
            status: Set(status.unwrap_or_default().to_string()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let created = model.insert(db).await.map_err(|e| {
            let msg = format!("Failed to create site: {}", e);
            error!(%msg);
            ServiceError::db_error(msg)
        })?;

        self.event_sender
            .send(Event::SiteCreated(created.id))
            .await
            .map_err(|e| {
                let msg = format!("Failed to publish site created event: {}", e);
                error!(%msg);
                ServiceError::EventError(msg)
            })?;

        info!(site_id = %created.id, name = %name, "Site created successfully");

        Ok(created)
    }

    /// Get a site by ID
    #[instrument(skip(self))]
    pub async fn get_site(&self, id: &Uuid) -> Result<Option<site::Model>, ServiceError> {
        let db = &*self.db_pool;

        let found = Site::find_by_id(*id).one(db).await.map_err(|e| {
            error!(site_id = %id, error = %e, "Database error when fetching site");
            ServiceError::db_error(format!("Failed to get site: {}", e))
        })?;

        Ok(found)
    }

    /// List sites ordered by name
    #[instrument(skip(self))]
    pub async fn list_sites(&self) -> Result<Vec<site::Model>, ServiceError> {
        let db = &*self.db_pool;

        let sites = Site::find()
            .order_by_asc(SiteColumn::Name)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when listing sites");
                ServiceError::db_error(format!("Failed to list sites: {}", e))
            })?;

        Ok(sites)
    }

    /// Update a site
    #[instrument(skip(self))]
    pub async fn update_site(
        &self,
        id: Uuid,
        name: Option<String>,
        location: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        supervisor: Option<String>,
        manager: Option<String>,
        status: Option<SiteStatus>,
    ) -> Result<site::Model, ServiceError> {
        let db = &*self.db_pool;

        let existing = Site::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(site_id = %id, error = %e, "Database error when finding site");
                ServiceError::db_error(format!("Failed to find site: {}", e))
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Site {} not found", id)))?;

        let effective_start = start_date.unwrap_or(existing.start_date);
        let effective_end = end_date.or(existing.end_date);
        validate_site_dates(effective_start, effective_end)?;

        let mut model: site::ActiveModel = existing.into();

        if let Some(name) = name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Site name is required".to_string(),
                ));
            }
            model.name = Set(name);
        }

        if let Some(location) = location {
            let location = location.trim().to_string();
            if location.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Site location is required".to_string(),
                ));
            }
            model.location = Set(location);
        }

        if let Some(start) = start_date {
            model.start_date = Set(start);
        }

        if let Some(end) = end_date {
            model.end_date = Set(Some(end));
        }

        if let Some(supervisor) = supervisor {
            model.supervisor = Set(Some(supervisor));
        }

        if let Some(manager) = manager {
            model.manager = Set(Some(manager));
        }

        if let Some(status) = status {
            model.status = Set(status.to_string());
        }

        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(db).await.map_err(|e| {
            error!(site_id = %id, error = %e, "Database error when updating site");
            ServiceError::db_error(format!("Failed to update site: {}", e))
        })?;

        self.event_sender
            .send(Event::SiteUpdated(updated.id))
            .await
            .map_err(|e| {
                let msg = format!("Failed to publish site updated event: {}", e);
                error!(%msg);
                ServiceError::EventError(msg)
            })?;

        info!(site_id = %updated.id, "Site updated successfully");

        Ok(updated)
    }

    /// Delete a site
    ///
    /// Usage ledger rows referencing the site are left in place.
    #[instrument(skip(self))]
    pub async fn delete_site(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = Site::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(site_id = %id, error = %e, "Database error when finding site");
                ServiceError::db_error(format!("Failed to find site: {}", e))
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Site {} not found", id)))?;

        existing.delete(db).await.map_err(|e| {
            error!(site_id = %id, error = %e, "Database error when deleting site");
            ServiceError::db_error(format!("Failed to delete site: {}", e))
        })?;

        self.event_sender
            .send(Event::SiteDeleted(id))
            .await
            .map_err(|e| {
                let msg = format!("Failed to publish site deleted event: {}", e);
                error!(%msg);
                ServiceError::EventError(msg)
            })?;

        info!(site_id = %id, "Site deleted successfully");

        Ok(())
    }

    /// A site's usage history, most recent first, with its total material cost
    #[instrument(skip(self))]
    pub async fn site_usage(&self, id: Uuid) -> Result<SiteUsageReport, ServiceError> {
        let db = &*self.db_pool;

        let site = Site::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(site_id = %id, error = %e, "Database error when finding site");
                ServiceError::db_error(format!("Failed to find site: {}", e))
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Site {} not found", id)))?;

        let events = load_enriched_events(db, Some(id)).await?;
        let total_cost = site_total(&events);

        Ok(SiteUsageReport {
            site_id: site.id,
            site_name: site.name,
            events,
            total_cost,
        })
    }
}
