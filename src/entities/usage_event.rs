use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Material usage ledger row. Append-only by intent: rows are written once by the
/// usage recording flow and never edited or deleted afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = UsageEvent)]
#[sea_orm(table_name = "site_material_usage")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Site the material was used on. Plain reference, no FK constraint; a deleted
    /// site leaves its ledger rows behind.
    pub site_id: Uuid,

    /// Product that was consumed. Same orphaning caveat as `site_id`.
    pub product_id: Uuid,

    /// Quantity consumed, in the product's unit at recording time
    pub quantity_used: Decimal,

    /// Submission time of the batch this row belongs to
    pub usage_date: DateTime<Utc>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::site::Entity",
        from = "Column::SiteId",
        to = "super::site::Column::Id"
    )]
    Site,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::site::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Site.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
