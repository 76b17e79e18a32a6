//! `SeaORM` Entity for the bank_statements table.
//!
//! A statement is a view over transactions, not their owner; coverage is
//! the bank_statement_transactions link table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_statements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_iban: String,
    pub generated_at: DateTimeWithTimeZone,
    pub opening_balance: Decimal,
    pub opening_balance_date: Date,
    pub closing_balance: Decimal,
    pub closing_balance_date: Date,
    pub imported_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::AccountIban",
        to = "super::bank_accounts::Column::Iban"
    )]
    BankAccounts,
    #[sea_orm(has_many = "super::bank_statement_transactions::Entity")]
    BankStatementTransactions,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        super::bank_statement_transactions::Relation::BankTransactions.def()
    }

    fn via() -> Option<RelationDef> {
        Some(
            super::bank_statement_transactions::Relation::BankStatements
                .def()
                .rev(),
        )
    }
}

impl ActiveModelBehavior for ActiveModel {}
