//! `SeaORM` Entity for the bank_statement_transactions link table.
//!
//! Many-to-many: overlapping statement windows cover the same
//! transaction, so one transaction may be linked to many statements.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_statement_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub statement_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_statements::Entity",
        from = "Column::StatementId",
        to = "super::bank_statements::Column::Id"
    )]
    BankStatements,
    #[sea_orm(
        belongs_to = "super::bank_transactions::Entity",
        from = "Column::TransactionId",
        to = "super::bank_transactions::Column::Id"
    )]
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
