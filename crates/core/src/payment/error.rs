//! Payment ledger error types.

use thiserror::Error;
use uuid::Uuid;

use velka_shared::AppError;

use super::strategy::StrategyError;

/// Errors that can occur during payment ledger operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    // ========== Validation Errors ==========
    /// Face amount must be positive.
    #[error("Payment face amount must be positive")]
    NonPositiveFaceAmount,

    /// No strategy registered for the payment type.
    #[error("Unknown payment type: {0}")]
    UnknownPaymentType(String),

    // ========== State Errors ==========
    /// Payment not found.
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Payment is already credited; credited is one-way.
    #[error("Payment {0} is already credited")]
    AlreadyCredited(Uuid),

    /// Crediting is only meaningful for debt-backed payments.
    #[error("Payment {0} has no associated debts")]
    NotDebtBacked(Uuid),

    // ========== Collaborator Errors ==========
    /// No resolvable primary email for the payer; aborts the credit.
    #[error("No payer email resolvable for payment {0}")]
    NoPayerEmail(Uuid),

    /// The notification collaborator rejected the request outright.
    #[error("Notification request failed: {0}")]
    Notification(String),

    /// The payment-type strategy failed.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    // ========== Infrastructure Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveFaceAmount => "NON_POSITIVE_FACE_AMOUNT",
            Self::UnknownPaymentType(_) => "UNKNOWN_PAYMENT_TYPE",
            Self::NotFound(_) => "PAYMENT_NOT_FOUND",
            Self::AlreadyCredited(_) => "ALREADY_CREDITED",
            Self::NotDebtBacked(_) => "NOT_DEBT_BACKED",
            Self::NoPayerEmail(_) => "NO_PAYER_EMAIL",
            Self::Notification(_) => "NOTIFICATION_FAILED",
            Self::Strategy(_) => "STRATEGY_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NonPositiveFaceAmount | Self::UnknownPaymentType(_) => 400,
            Self::NotFound(_) => 404,
            Self::AlreadyCredited(_) | Self::NotDebtBacked(_) | Self::NoPayerEmail(_) => 422,
            Self::Notification(_)
            | Self::Strategy(_)
            | Self::Database(_)
            | Self::Internal(_) => 500,
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        let message = err.to_string();
        match err {
            PaymentError::NonPositiveFaceAmount | PaymentError::UnknownPaymentType(_) => {
                Self::Validation(message)
            }
            PaymentError::NotFound(_) => Self::NotFound(message),
            PaymentError::AlreadyCredited(_)
            | PaymentError::NotDebtBacked(_)
            | PaymentError::NoPayerEmail(_) => Self::BusinessRule(message),
            PaymentError::Notification(_) | PaymentError::Strategy(_) => {
                Self::ExternalService(message)
            }
            PaymentError::Database(_) => Self::Database(message),
            PaymentError::Internal(_) => Self::Internal(message),
        }
    }
}
