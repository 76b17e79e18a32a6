//! Property-based tests for the payment ledger service.
//!
//! - Balance integrity: the balance is always the sum of event amounts.
//! - Status derivation: status is a total function of (balance, face).
//! - Append outcomes: change flags track the pre-append baseline exactly.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::PaymentService;
use super::types::{PaymentEvent, PaymentEventType, PaymentStatus};

/// Strategy for signed amounts (-10,000.00 to 10,000.00).
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for positive face amounts (0.01 to 10,000.00).
fn face_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

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

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any sequence of events, the balance equals the sum of amounts.
    #[test]
    fn prop_balance_is_event_sum(amounts in prop::collection::vec(signed_amount(), 0..20)) {
        let events: Vec<_> = amounts.iter().copied().map(make_event).collect();
        let expected: Decimal = amounts.iter().copied().sum();
        prop_assert_eq!(PaymentService::balance(&events), expected);
    }

    /// Status derivation is total and matches its defining cases exactly.
    #[test]
    fn prop_status_trichotomy(balance in signed_amount(), face in face_amount()) {
        let status = PaymentService::derive_status(balance, face);
        if balance == -face {
            prop_assert_eq!(status, PaymentStatus::Unpaid);
        } else if balance == Decimal::ZERO {
            prop_assert_eq!(status, PaymentStatus::Paid);
        } else {
            prop_assert_eq!(status, PaymentStatus::Mispaid);
        }
    }

    /// A freshly created payment (only its `created` event) is always unpaid.
    #[test]
    fn prop_created_payment_is_unpaid(face in face_amount()) {
        let balance = PaymentService::created_event_amount(face);
        prop_assert_eq!(
            PaymentService::derive_status(balance, face),
            PaymentStatus::Unpaid
        );
    }

    /// Appending computes the new balance additively, and the change flags
    /// track the pre-append baseline.
    #[test]
    fn prop_append_outcome_consistent(
        prior in signed_amount(),
        face in face_amount(),
        amount in signed_amount(),
    ) {
        let outcome = PaymentService::append_outcome(prior, face, amount);

        prop_assert_eq!(outcome.balance, prior + amount);
        prop_assert_eq!(outcome.balance_changed, amount != Decimal::ZERO);
        prop_assert_eq!(outcome.status, PaymentService::derive_status(prior + amount, face));
        prop_assert_eq!(
            outcome.status_changed,
            PaymentService::derive_status(prior, face)
                != PaymentService::derive_status(prior + amount, face)
        );
    }

    /// Zero-amount appends never report a change, whatever the state.
    #[test]
    fn prop_zero_append_is_noop(prior in signed_amount(), face in face_amount()) {
        let outcome = PaymentService::append_outcome(prior, face, Decimal::ZERO);
        prop_assert!(!outcome.balance_changed);
        prop_assert!(!outcome.status_changed);
    }

    /// Face value exactly paid in any split of parts ends at `paid`.
    #[test]
    fn prop_exact_payment_in_parts_reaches_paid(
        face_cents in 2i64..1_000_000i64,
        split in 1i64..1_000_000i64,
    ) {
        let face = Decimal::new(face_cents, 2);
        let first = Decimal::new(split % face_cents, 2);
        let second = face - first;

        let mut balance = PaymentService::created_event_amount(face);
        balance = PaymentService::append_outcome(balance, face, first).balance;
        let outcome = PaymentService::append_outcome(balance, face, second);

        prop_assert_eq!(outcome.balance, Decimal::ZERO);
        prop_assert_eq!(outcome.status, PaymentStatus::Paid);
    }
}
