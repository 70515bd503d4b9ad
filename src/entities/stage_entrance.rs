use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One inbound shipment, tracked from arrival to full exit. `platforms` is
/// the remaining pallet count and is decremented by exit processing.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stage_entrances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub folio: Option<i32>,
    pub platforms: i32,
    pub total_pieces: i32,
    pub id_storage_cost: Option<i32>,
    pub id_entrance_fee: Option<i32>,
    pub entry_date: Option<DateTime>,
    pub exit_date: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stage_entrance_part_number::Entity")]
    PartNumbers,
    #[sea_orm(
        belongs_to = "super::entrance_fee::Entity",
        from = "Column::IdEntranceFee",
        to = "super::entrance_fee::Column::Id"
    )]
    EntranceFee,
    #[sea_orm(
        belongs_to = "super::storage_cost::Entity",
        from = "Column::IdStorageCost",
        to = "super::storage_cost::Column::Id"
    )]
    StorageCost,
}

impl Related<super::stage_entrance_part_number::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartNumbers.def()
    }
}

impl Related<super::entrance_fee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntranceFee.def()
    }
}

impl Related<super::storage_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageCost.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
