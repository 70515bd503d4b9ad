use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_rate_tables::Migration),
            Box::new(m20250301_000002_create_stage_entrances_table::Migration),
            Box::new(m20250301_000003_create_part_numbers_table::Migration),
            Box::new(m20250301_000004_seed_default_rates::Migration),
        ]
    }
}

// Migration implementations

mod m20250301_000001_create_rate_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_rate_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(EntranceFees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EntranceFees::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(EntranceFees::Cost).decimal_len(10, 2))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StorageCosts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StorageCosts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(StorageCosts::Cost).decimal_len(10, 2))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StorageCosts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(EntranceFees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum EntranceFees {
        Table,
        Id,
        Cost,
    }

    #[derive(DeriveIden)]
    pub(super) enum StorageCosts {
        Table,
        Id,
        Cost,
    }
}

mod m20250301_000002_create_stage_entrances_table {
    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_rate_tables::{EntranceFees, StorageCosts};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_stage_entrances_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StageEntrances::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StageEntrances::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(StageEntrances::Folio).integer())
                        .col(
                            ColumnDef::new(StageEntrances::Platforms)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StageEntrances::TotalPieces)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(StageEntrances::IdStorageCost).integer())
                        .col(ColumnDef::new(StageEntrances::IdEntranceFee).integer())
                        .col(ColumnDef::new(StageEntrances::EntryDate).date_time())
                        .col(ColumnDef::new(StageEntrances::ExitDate).date_time())
                        .col(
                            ColumnDef::new(StageEntrances::CreatedAt)
                                .date_time()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StageEntrances::UpdatedAt).date_time())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stage_entrances_storage_cost")
                                .from(StageEntrances::Table, StageEntrances::IdStorageCost)
                                .to(StorageCosts::Table, StorageCosts::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stage_entrances_entrance_fee")
                                .from(StageEntrances::Table, StageEntrances::IdEntranceFee)
                                .to(EntranceFees::Table, EntranceFees::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stage_entrances_folio")
                        .table(StageEntrances::Table)
                        .col(StageEntrances::Folio)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stage_entrances_entry_date")
                        .table(StageEntrances::Table)
                        .col(StageEntrances::EntryDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StageEntrances::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StageEntrances {
        Table,
        Id,
        Folio,
        Platforms,
        TotalPieces,
        IdStorageCost,
        IdEntranceFee,
        EntryDate,
        ExitDate,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000003_create_part_numbers_table {
    use sea_orm_migration::prelude::*;

    use super::m20250301_000002_create_stage_entrances_table::StageEntrances;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_part_numbers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StageEntrancePartNumbers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StageEntrancePartNumbers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StageEntrancePartNumbers::StageEntranceId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StageEntrancePartNumbers::PartNumber)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StageEntrancePartNumbers::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StageEntrancePartNumbers::CreatedAt)
                                .date_time()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_part_numbers_stage_entrance")
                                .from(
                                    StageEntrancePartNumbers::Table,
                                    StageEntrancePartNumbers::StageEntranceId,
                                )
                                .to(StageEntrances::Table, StageEntrances::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_part_numbers_stage_entrance_id")
                        .table(StageEntrancePartNumbers::Table)
                        .col(StageEntrancePartNumbers::StageEntranceId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_part_numbers_part_number")
                        .table(StageEntrancePartNumbers::Table)
                        .col(StageEntrancePartNumbers::PartNumber)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(StageEntrancePartNumbers::Table)
                        .to_owned(),
                )
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StageEntrancePartNumbers {
        Table,
        Id,
        StageEntranceId,
        PartNumber,
        Quantity,
        CreatedAt,
    }
}

mod m20250301_000004_seed_default_rates {
    use rust_decimal_macros::dec;
    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_rate_tables::{EntranceFees, StorageCosts};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_seed_default_rates"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Row id 1 in each table is the rate newly created entrances
            // reference by default.
            manager
                .exec_stmt(
                    Query::insert()
                        .into_table(EntranceFees::Table)
                        .columns([EntranceFees::Cost])
                        .values_panic([dec!(67.50).into()])
                        .to_owned(),
                )
                .await?;

            manager
                .exec_stmt(
                    Query::insert()
                        .into_table(StorageCosts::Table)
                        .columns([StorageCosts::Cost])
                        .values_panic([dec!(133).into()])
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .exec_stmt(Query::delete().from_table(EntranceFees::Table).to_owned())
                .await?;
            manager
                .exec_stmt(Query::delete().from_table(StorageCosts::Table).to_owned())
                .await
        }
    }
}
