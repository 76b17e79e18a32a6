//! `SeaORM` Entity for the payment_events table.
//!
//! Rows are append-only: nothing in the application updates or deletes
//! them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentEventType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payment_id: Uuid,
    pub event_type: PaymentEventType,
    pub amount: Decimal,
    pub event_time: DateTimeWithTimeZone,
    pub data: Option<Json>,
    pub bank_transaction_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id"
    )]
    Payments,
    #[sea_orm(
        belongs_to = "super::bank_transactions::Entity",
        from = "Column::BankTransactionId",
        to = "super::bank_transactions::Column::Id"
    )]
    BankTransactions,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
