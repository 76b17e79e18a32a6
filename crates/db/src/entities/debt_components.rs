//! `SeaORM` Entity for the debt_components table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "debt_components")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub debt_id: Uuid,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::debts::Entity",
        from = "Column::DebtId",
        to = "super::debts::Column::Id"
    )]
    Debts,
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
