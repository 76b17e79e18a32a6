//! Active enums backed by native Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment event classification, stored as `payment_event_type`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_event_type")]
pub enum PaymentEventType {
    /// Synthesized once at payment creation.
    #[sea_orm(string_value = "created")]
    Created,
    /// A payment against the balance.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Audit marker for crediting.
    #[sea_orm(string_value = "credited")]
    Credited,
    /// A failed provider attempt.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Anything else.
    #[sea_orm(string_value = "other")]
    Other,
}

impl From<velka_core::payment::PaymentEventType> for PaymentEventType {
    fn from(value: velka_core::payment::PaymentEventType) -> Self {
        use velka_core::payment::PaymentEventType as Core;
        match value {
            Core::Created => Self::Created,
            Core::Payment => Self::Payment,
            Core::Credited => Self::Credited,
            Core::Failed => Self::Failed,
            Core::Other => Self::Other,
        }
    }
}

impl From<PaymentEventType> for velka_core::payment::PaymentEventType {
    fn from(value: PaymentEventType) -> Self {
        match value {
            PaymentEventType::Created => Self::Created,
            PaymentEventType::Payment => Self::Payment,
            PaymentEventType::Credited => Self::Credited,
            PaymentEventType::Failed => Self::Failed,
            PaymentEventType::Other => Self::Other,
        }
    }
}

/// Bank transaction direction, stored as `transaction_direction`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_direction")]
pub enum TransactionDirection {
    /// Money in.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Money out.
    #[sea_orm(string_value = "debit")]
    Debit,
}

impl From<velka_core::reconciliation::TransactionDirection> for TransactionDirection {
    fn from(value: velka_core::reconciliation::TransactionDirection) -> Self {
        use velka_core::reconciliation::TransactionDirection as Core;
        match value {
            Core::Credit => Self::Credit,
            Core::Debit => Self::Debit,
        }
    }
}

impl From<TransactionDirection> for velka_core::reconciliation::TransactionDirection {
    fn from(value: TransactionDirection) -> Self {
        match value {
            TransactionDirection::Credit => Self::Credit,
            TransactionDirection::Debit => Self::Debit,
        }
    }
}
