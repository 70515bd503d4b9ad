use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-pallet-per-day storage rate referenced by stage entrances.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_costs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub cost: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stage_entrance::Entity")]
    StageEntrances,
}

impl Related<super::stage_entrance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StageEntrances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
