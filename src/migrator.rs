use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_inventory_products_table::Migration),
            Box::new(m20240101_000002_create_sites_table::Migration),
            Box::new(m20240101_000003_create_site_material_usage_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_inventory_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_inventory_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create inventory_products table aligned with entities::product Model
            manager
                .create_table(
                    Table::create()
                        .table(InventoryProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryProducts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryProducts::Name).string().not_null())
                        .col(ColumnDef::new(InventoryProducts::Unit).string().not_null())
                        .col(
                            ColumnDef::new(InventoryProducts::RatePerUnit)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryProducts::StockQuantity)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryProducts::LowStockThreshold)
                                .decimal()
                                .not_null()
                                .default(10),
                        )
                        .col(
                            ColumnDef::new(InventoryProducts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryProducts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            // List and search are served ordered by name
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_products_name")
                        .table(InventoryProducts::Table)
                        .col(InventoryProducts::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryProducts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InventoryProducts {
        Table,
        Id,
        Name,
        Unit,
        RatePerUnit,
        StockQuantity,
        LowStockThreshold,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_sites_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_sites_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create sites table aligned with entities::site Model
            manager
                .create_table(
                    Table::create()
                        .table(Sites::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Sites::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Sites::Name).string().not_null())
                        .col(ColumnDef::new(Sites::Location).string().not_null())
                        .col(ColumnDef::new(Sites::StartDate).date().not_null())
                        .col(ColumnDef::new(Sites::EndDate).date().null())
                        .col(ColumnDef::new(Sites::Supervisor).string().null())
                        .col(ColumnDef::new(Sites::Manager).string().null())
                        .col(ColumnDef::new(Sites::Status).string().not_null())
                        .col(
                            ColumnDef::new(Sites::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Sites::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sites_name")
                        .table(Sites::Table)
                        .col(Sites::Name)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sites_status")
                        .table(Sites::Table)
                        .col(Sites::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Sites::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Sites {
        Table,
        Id,
        Name,
        Location,
        StartDate,
        EndDate,
        Supervisor,
        Manager,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_site_material_usage_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_site_material_usage_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create site_material_usage table aligned with entities::usage_event
            // Model. Site and product references are plain uuid columns with no FK
            // constraints: deleting a site or product must not cascade here, and the
            // ledger keeps orphaned rows.
            manager
                .create_table(
                    Table::create()
                        .table(SiteMaterialUsage::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SiteMaterialUsage::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SiteMaterialUsage::SiteId).uuid().not_null())
                        .col(
                            ColumnDef::new(SiteMaterialUsage::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SiteMaterialUsage::QuantityUsed)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SiteMaterialUsage::UsageDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SiteMaterialUsage::Notes).string().null())
                        .col(
                            ColumnDef::new(SiteMaterialUsage::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Useful indexes
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_site_material_usage_site_id")
                        .table(SiteMaterialUsage::Table)
                        .col(SiteMaterialUsage::SiteId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_site_material_usage_product_id")
                        .table(SiteMaterialUsage::Table)
                        .col(SiteMaterialUsage::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_site_material_usage_usage_date")
                        .table(SiteMaterialUsage::Table)
                        .col(SiteMaterialUsage::UsageDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SiteMaterialUsage::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum SiteMaterialUsage {
        Table,
        Id,
        SiteId,
        ProductId,
        QuantityUsed,
        UsageDate,
        Notes,
        CreatedAt,
    }
}
