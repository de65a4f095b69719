use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalog product: a purchasable material with a live stock level
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Product)]
#[sea_orm(table_name = "inventory_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product name (unique by convention, not enforced by the store)
    pub name: String,

    /// Unit label the quantity is measured in, e.g. "kg", "m2", "pcs"
    pub unit: String,

    /// Price per unit
    pub rate_per_unit: Decimal,

    /// Current stock level; may be fractional
    pub stock_quantity: Decimal,

    /// Stock at or below this level counts as low
    pub low_stock_threshold: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::usage_event::Entity")]
    UsageEvents,
}

impl Related<super::usage_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsageEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stock is at or below the product's own threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }
}
