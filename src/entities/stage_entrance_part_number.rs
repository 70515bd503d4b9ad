use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A (part number, quantity) line owned by a stage entrance. Lines are
/// replaced wholesale when the entrance is updated and removed with it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stage_entrance_part_numbers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub stage_entrance_id: i32,
    pub part_number: String,
    pub quantity: i32,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stage_entrance::Entity",
        from = "Column::StageEntranceId",
        to = "super::stage_entrance::Column::Id"
    )]
    StageEntrance,
}

impl Related<super::stage_entrance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StageEntrance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
