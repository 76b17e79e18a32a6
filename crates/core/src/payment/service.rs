//! Payment ledger service: balance and status derivation.
//!
//! This service contains pure business logic with no database dependencies.
//! Repositories load the event history, ask this service what an append
//! means, and persist the result.

use rust_decimal::Decimal;

use super::error::PaymentError;
use super::types::{Payment, PaymentEvent, PaymentStatus};

/// Outcome of appending one event to a payment, relative to the state
/// immediately before the append.
///
/// The comparison baseline is always the balance/status before this
/// specific append, never a cached value, so zero-amount appends can never
/// spuriously report a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Balance after the append.
    pub balance: Decimal,
    /// Status after the append.
    pub status: PaymentStatus,
    /// True if the balance differs from the pre-append balance.
    pub balance_changed: bool,
    /// True if the status differs from the pre-append status.
    pub status_changed: bool,
}

/// Payment ledger service.
pub struct PaymentService;

impl PaymentService {
    /// Sums the amounts of all events, `created` included.
    ///
    /// Invariant: a payment's balance always equals this sum.
    #[must_use]
    pub fn balance(events: &[PaymentEvent]) -> Decimal {
        events.iter().map(|e| e.amount).sum()
    }

    /// Derives the status from a balance and the payment's face value.
    ///
    /// - `balance == -face_amount` (only the `created` event nets out) → unpaid
    /// - `balance == 0` → paid
    /// - anything else → mispaid
    #[must_use]
    pub fn derive_status(balance: Decimal, face_amount: Decimal) -> PaymentStatus {
        if balance == -face_amount {
            PaymentStatus::Unpaid
        } else if balance == Decimal::ZERO {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Mispaid
        }
    }

    /// Amount of the synthesized `created` event: the negated face value.
    #[must_use]
    pub fn created_event_amount(face_amount: Decimal) -> Decimal {
        -face_amount
    }

    /// Computes the effect of appending an event of `amount` to a payment
    /// whose pre-append balance is `prior_balance`.
    #[must_use]
    pub fn append_outcome(
        prior_balance: Decimal,
        face_amount: Decimal,
        amount: Decimal,
    ) -> AppendOutcome {
        let prior_status = Self::derive_status(prior_balance, face_amount);
        let balance = prior_balance + amount;
        let status = Self::derive_status(balance, face_amount);

        AppendOutcome {
            balance,
            status,
            balance_changed: balance != prior_balance,
            status_changed: status != prior_status,
        }
    }

    /// Validates a payment creation input's face amount.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::NonPositiveFaceAmount`] for zero or negative
    /// face values.
    pub fn validate_face_amount(face_amount: Decimal) -> Result<(), PaymentError> {
        if face_amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveFaceAmount);
        }
        Ok(())
    }

    /// Validates that a payment may be credited.
    ///
    /// Crediting requires the payment to not already be credited and to
    /// back at least one debt.
    ///
    /// # Errors
    ///
    /// Returns an error when either precondition fails.
    pub fn validate_credit(payment: &Payment, debt_count: u64) -> Result<(), PaymentError> {
        if payment.credited {
            return Err(PaymentError::AlreadyCredited(payment.id));
        }
        if debt_count == 0 {
            return Err(PaymentError::NotDebtBacked(payment.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::payment::types::PaymentEventType;

    fn make_event(amount: Decimal) -> PaymentEvent {
        PaymentEvent {
            id: Uuid::new_v4(),
            payment_id: Uuid::new_v4(),
            event_type: PaymentEventType::Payment,
            amount,
            event_time: Utc::now(),
            data: None,
            bank_transaction_id: None,
        }
    }

    fn make_payment(credited: bool) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            payment_type: "invoice".to_string(),
            title: "Membership fee".to_string(),
            message: String::new(),
            face_amount: dec!(10.00),
            data: serde_json::json!({}),
            reference_number: None,
            credited,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_balance_is_sum_of_events() {
        let events = vec![
            make_event(dec!(-10.00)),
            make_event(dec!(5.00)),
            make_event(dec!(2.50)),
        ];
        assert_eq!(PaymentService::balance(&events), dec!(-2.50));
        assert_eq!(PaymentService::balance(&[]), Decimal::ZERO);
    }

    #[rstest]
    #[case(dec!(-10.00), dec!(10.00), PaymentStatus::Unpaid)]
    #[case(dec!(0), dec!(10.00), PaymentStatus::Paid)]
    #[case(dec!(-5.00), dec!(10.00), PaymentStatus::Mispaid)]
    #[case(dec!(5.00), dec!(10.00), PaymentStatus::Mispaid)]
    #[case(dec!(-10.01), dec!(10.00), PaymentStatus::Mispaid)]
    fn test_derive_status(
        #[case] balance: Decimal,
        #[case] face: Decimal,
        #[case] expected: PaymentStatus,
    ) {
        assert_eq!(PaymentService::derive_status(balance, face), expected);
    }

    #[test]
    fn test_created_event_amount_negates_face() {
        assert_eq!(
            PaymentService::created_event_amount(dec!(10.00)),
            dec!(-10.00)
        );
    }

    #[test]
    fn test_partial_payment_flips_to_mispaid() {
        // Invoice for 10.00, register 5.00: balance -5.00, mispaid,
        // both balance and status changed.
        let outcome = PaymentService::append_outcome(dec!(-10.00), dec!(10.00), dec!(5.00));
        assert_eq!(outcome.balance, dec!(-5.00));
        assert_eq!(outcome.status, PaymentStatus::Mispaid);
        assert!(outcome.balance_changed);
        assert!(outcome.status_changed);
    }

    #[test]
    fn test_completing_payment_reaches_paid() {
        let outcome = PaymentService::append_outcome(dec!(-5.00), dec!(10.00), dec!(5.00));
        assert_eq!(outcome.balance, Decimal::ZERO);
        assert_eq!(outcome.status, PaymentStatus::Paid);
        assert!(outcome.status_changed);
    }

    #[test]
    fn test_overpayment_is_mispaid() {
        let outcome = PaymentService::append_outcome(dec!(0), dec!(10.00), dec!(5.00));
        assert_eq!(outcome.balance, dec!(5.00));
        assert_eq!(outcome.status, PaymentStatus::Mispaid);
        assert!(outcome.status_changed);
    }

    #[test]
    fn test_zero_amount_append_changes_nothing() {
        let outcome = PaymentService::append_outcome(dec!(-10.00), dec!(10.00), Decimal::ZERO);
        assert!(!outcome.balance_changed);
        assert!(!outcome.status_changed);
        assert_eq!(outcome.status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_status_can_stay_mispaid_while_balance_moves() {
        let outcome = PaymentService::append_outcome(dec!(-7.00), dec!(10.00), dec!(1.00));
        assert!(outcome.balance_changed);
        assert!(!outcome.status_changed);
        assert_eq!(outcome.status, PaymentStatus::Mispaid);
    }

    #[test]
    fn test_validate_face_amount() {
        assert!(PaymentService::validate_face_amount(dec!(0.01)).is_ok());
        assert!(matches!(
            PaymentService::validate_face_amount(Decimal::ZERO),
            Err(PaymentError::NonPositiveFaceAmount)
        ));
        assert!(matches!(
            PaymentService::validate_face_amount(dec!(-1)),
            Err(PaymentError::NonPositiveFaceAmount)
        ));
    }

    #[test]
    fn test_validate_credit_preconditions() {
        let payment = make_payment(false);
        assert!(PaymentService::validate_credit(&payment, 1).is_ok());

        assert!(matches!(
            PaymentService::validate_credit(&payment, 0),
            Err(PaymentError::NotDebtBacked(_))
        ));

        let credited = make_payment(true);
        assert!(matches!(
            PaymentService::validate_credit(&credited, 1),
            Err(PaymentError::AlreadyCredited(_))
        ));
    }
}
