//! `SeaORM` Entity for the bank_transactions table.
//!
//! The primary key is the upstream bank's transaction ID: globally unique
//! and stable across re-delivery, which is what makes statement import
//! idempotent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionDirection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_iban: String,
    pub amount: Decimal,
    pub direction: TransactionDirection,
    pub value_date: Date,
    pub other_party_name: String,
    pub other_party_account: Option<String>,
    pub message: Option<String>,
    pub reference: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::AccountIban",
        to = "super::bank_accounts::Column::Iban"
    )]
    BankAccounts,
    #[sea_orm(has_many = "super::payment_events::Entity")]
    PaymentEvents,
    #[sea_orm(has_many = "super::bank_statement_transactions::Entity")]
    BankStatementTransactions,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::payment_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentEvents.def()
    }
}

impl Related<super::bank_statements::Entity> for Entity {
    fn to() -> RelationDef {
        super::bank_statement_transactions::Relation::BankStatements.def()
    }

    fn via() -> Option<RelationDef> {
        Some(
            super::bank_statement_transactions::Relation::BankTransactions
                .def()
                .rev(),
        )
    }
}

impl ActiveModelBehavior for ActiveModel {}
