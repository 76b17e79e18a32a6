//! `SeaORM` Entity for the members table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Primary email; crediting a member's payment requires one.
    pub email: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::debts::Entity")]
    Debts,
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
