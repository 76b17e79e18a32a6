//! Debt aggregates and the status projection.
//!
//! A debt's visible status is never stored. It is read by following the
//! debt to its settling payment and reusing that payment's derived status,
//! so exactly one status state machine exists in the system.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use velka_shared::AppError;

use crate::payment::PaymentStatus;

/// Errors that can occur during debt operations.
#[derive(Debug, Error)]
pub enum DebtError {
    /// Debt not found.
    #[error("Debt not found: {0}")]
    NotFound(Uuid),

    /// Member not found.
    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),

    /// Payment not found when assigning a settling payment.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// A debt needs at least one component.
    #[error("Debt must have at least one component")]
    NoComponents,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl DebtError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "DEBT_NOT_FOUND",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::NoComponents => "NO_COMPONENTS",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<DebtError> for AppError {
    fn from(err: DebtError) -> Self {
        let message = err.to_string();
        match err {
            DebtError::NotFound(_) | DebtError::MemberNotFound(_) | DebtError::PaymentNotFound(_) => {
                Self::NotFound(message)
            }
            DebtError::NoComponents => Self::Validation(message),
            DebtError::Database(_) => Self::Database(message),
        }
    }
}

/// An itemized debt owed by a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// Debt ID.
    pub id: Uuid,
    /// The member who owes.
    pub member_id: Uuid,
    /// Human-readable title.
    pub title: String,
    /// The payment currently settling this debt, if any.
    pub payment_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// One line item of a debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtComponent {
    /// Component ID.
    pub id: Uuid,
    /// Owning debt.
    pub debt_id: Uuid,
    /// Line item name.
    pub name: String,
    /// Line item amount.
    pub amount: Decimal,
}

/// A debt's face value is the sum of its components.
#[must_use]
pub fn face_amount(components: &[DebtComponent]) -> Decimal {
    components.iter().map(|c| c.amount).sum()
}

/// Projects a debt's status from its settling payment's status.
///
/// A debt with no settling payment is unpaid by definition.
#[must_use]
pub fn debt_status(settling_payment_status: Option<PaymentStatus>) -> PaymentStatus {
    settling_payment_status.unwrap_or(PaymentStatus::Unpaid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_component(amount: Decimal) -> DebtComponent {
        DebtComponent {
            id: Uuid::new_v4(),
            debt_id: Uuid::new_v4(),
            name: "Line".to_string(),
            amount,
        }
    }

    #[test]
    fn test_face_amount_sums_components() {
        let components = vec![make_component(dec!(7.50)), make_component(dec!(2.50))];
        assert_eq!(face_amount(&components), dec!(10.00));
        assert_eq!(face_amount(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_status_follows_settling_payment() {
        assert_eq!(debt_status(Some(PaymentStatus::Paid)), PaymentStatus::Paid);
        assert_eq!(
            debt_status(Some(PaymentStatus::Mispaid)),
            PaymentStatus::Mispaid
        );
    }

    #[test]
    fn test_unsettled_debt_is_unpaid() {
        assert_eq!(debt_status(None), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_rolls_up_into_app_error() {
        assert_eq!(
            AppError::from(DebtError::NotFound(Uuid::nil())).status_code(),
            404
        );
        assert_eq!(AppError::from(DebtError::NoComponents).status_code(), 400);
        assert_eq!(
            AppError::from(DebtError::Database("down".into())).status_code(),
            500
        );
    }
}
