//! `SeaORM` Entity for the bank_accounts table.
//!
//! Identity is the normalized IBAN; rows are immutable once created.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub iban: String,
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank_statements::Entity")]
    BankStatements,
    #[sea_orm(has_many = "super::bank_transactions::Entity")]
    BankTransactions,
}

impl Related<super::bank_statements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankStatements.def()
    }
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
