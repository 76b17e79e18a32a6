//! Bank reconciliation error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use velka_shared::AppError;

use crate::payment::PaymentError;

/// Errors that can occur during bank reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    // ========== Account Errors ==========
    /// The IBAN is not plausibly an IBAN.
    #[error("Invalid IBAN: {0}")]
    InvalidIban(String),

    /// An account with this IBAN already exists.
    #[error("Bank account already exists for IBAN {0}")]
    DuplicateAccount(String),

    /// Statements must never create orphan accounts.
    #[error("Bank account not found for IBAN {0}")]
    AccountNotFound(String),

    // ========== Lookup Errors ==========
    /// Statement not found.
    #[error("Bank statement not found: {0}")]
    StatementNotFound(String),

    /// Transaction not found.
    #[error("Bank transaction not found: {0}")]
    TransactionNotFound(String),

    /// Payment not found for a registration.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    // ========== Invariant Violations ==========
    /// Registration amounts must be positive; registrations never reverse.
    #[error("Registration amount must be positive")]
    NonPositiveAmount,

    /// Registrations against a transaction are capped at its amount.
    #[error(
        "Registration of {attempted} against transaction {transaction_id} exceeds its amount: \
         {registered} already registered of {transaction_amount}"
    )]
    RegistrationExceedsTransaction {
        /// Upstream transaction ID.
        transaction_id: String,
        /// The transaction's amount (the cap).
        transaction_amount: Decimal,
        /// Sum already registered against the transaction.
        registered: Decimal,
        /// The rejected amount.
        attempted: Decimal,
    },

    // ========== Delegated Errors ==========
    /// The payment ledger rejected the forwarded append.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    // ========== Infrastructure Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidIban(_) => "INVALID_IBAN",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::StatementNotFound(_) => "STATEMENT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::RegistrationExceedsTransaction { .. } => "REGISTRATION_EXCEEDS_TRANSACTION",
            Self::Payment(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidIban(_) | Self::NonPositiveAmount => 400,
            Self::DuplicateAccount(_) => 409,
            Self::AccountNotFound(_)
            | Self::StatementNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::PaymentNotFound(_) => 404,
            Self::RegistrationExceedsTransaction { .. } => 422,
            Self::Payment(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }
}

impl From<ReconciliationError> for AppError {
    fn from(err: ReconciliationError) -> Self {
        let message = err.to_string();
        match err {
            ReconciliationError::InvalidIban(_) | ReconciliationError::NonPositiveAmount => {
                Self::Validation(message)
            }
            ReconciliationError::DuplicateAccount(_) => Self::Conflict(message),
            ReconciliationError::AccountNotFound(_)
            | ReconciliationError::StatementNotFound(_)
            | ReconciliationError::TransactionNotFound(_)
            | ReconciliationError::PaymentNotFound(_) => Self::NotFound(message),
            ReconciliationError::RegistrationExceedsTransaction { .. } => {
                Self::BusinessRule(message)
            }
            ReconciliationError::Payment(inner) => Self::from(inner),
            ReconciliationError::Database(_) => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ReconciliationError::AccountNotFound("FI21".into()).error_code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            ReconciliationError::RegistrationExceedsTransaction {
                transaction_id: "T1".into(),
                transaction_amount: dec!(10.00),
                registered: dec!(5.00),
                attempted: dec!(10.00),
            }
            .error_code(),
            "REGISTRATION_EXCEEDS_TRANSACTION"
        );
    }

    #[test]
    fn test_cap_violation_display_names_the_numbers() {
        let err = ReconciliationError::RegistrationExceedsTransaction {
            transaction_id: "T1".into(),
            transaction_amount: dec!(10.00),
            registered: dec!(5.00),
            attempted: dec!(10.00),
        };
        let message = err.to_string();
        assert!(message.contains("T1"));
        assert!(message.contains("10.00"));
        assert!(message.contains("5.00"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ReconciliationError::DuplicateAccount(String::new()).status_code(),
            409
        );
        assert_eq!(
            ReconciliationError::TransactionNotFound(String::new()).status_code(),
            404
        );
        assert_eq!(ReconciliationError::NonPositiveAmount.status_code(), 400);
    }

    #[test]
    fn test_rolls_up_into_app_error_preserving_status() {
        let cases = [
            ReconciliationError::InvalidIban("x".into()),
            ReconciliationError::DuplicateAccount("FI21".into()),
            ReconciliationError::AccountNotFound("FI21".into()),
            ReconciliationError::RegistrationExceedsTransaction {
                transaction_id: "T1".into(),
                transaction_amount: dec!(10.00),
                registered: dec!(10.00),
                attempted: dec!(1.00),
            },
            ReconciliationError::Payment(PaymentError::NotFound(Uuid::nil())),
        ];
        for err in cases {
            let status = err.status_code();
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }
}
