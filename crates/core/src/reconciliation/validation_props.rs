//! Property-based tests for reconciliation invariants.
//!
//! - Cap invariant: any accepted sequence of registrations keeps the
//!   registered sum at or below the transaction amount.
//! - Rejection leaves prior registrations untouched.
//! - Registration state never moves backwards under accepted registrations.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::ReconciliationService;
use super::types::{normalize_iban, RegistrationState};

/// Strategy for positive registration amounts (0.01 to 200.00).
fn registration_amount() -> impl Strategy<Value = Decimal> {
    (1i64..20_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for signed registration attempts (-200.00 to 200.00),
/// including the zero and negative amounts that must always be rejected.
fn signed_attempt() -> impl Strategy<Value = Decimal> {
    (-20_000i64..20_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for transaction amounts (0.01 to 100.00).
fn transaction_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn state_rank(state: RegistrationState) -> u8 {
    match state {
        RegistrationState::Unregistered => 0,
        RegistrationState::PartiallyRegistered => 1,
        RegistrationState::FullyRegistered => 2,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Replaying any mix of attempted registrations, the accepted ones
    /// never push the registered sum past the transaction amount.
    #[test]
    fn prop_cap_holds_under_any_sequence(
        cap in transaction_amount(),
        attempts in prop::collection::vec(signed_attempt(), 0..20),
    ) {
        let mut registered = Decimal::ZERO;

        for amount in attempts {
            match ReconciliationService::validate_registration("T", cap, registered, amount) {
                Ok(()) => registered += amount,
                Err(_) => {
                    // Rejection must not have changed the running sum.
                }
            }
            prop_assert!(registered <= cap, "registered {registered} exceeds cap {cap}");
            prop_assert!(registered >= Decimal::ZERO, "registered sum went negative");
        }
    }

    /// Zero and negative attempts are rejected in every state.
    #[test]
    fn prop_non_positive_attempts_always_rejected(
        cap in transaction_amount(),
        prior in (0i64..10_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        non_positive in (-20_000i64..=0i64).prop_map(|cents| Decimal::new(cents, 2)),
    ) {
        let result = ReconciliationService::validate_registration("T", cap, prior, non_positive);
        prop_assert!(result.is_err());
    }

    /// An attempt that would exceed the cap is rejected regardless of how
    /// the prior sum was reached.
    #[test]
    fn prop_over_cap_always_rejected(
        cap in transaction_amount(),
        excess in registration_amount(),
    ) {
        let result = ReconciliationService::validate_registration("T", cap, cap, excess);
        prop_assert!(result.is_err());
    }

    /// Registration state is monotone along accepted registrations.
    #[test]
    fn prop_registration_state_monotone(
        cap in transaction_amount(),
        attempts in prop::collection::vec(signed_attempt(), 1..20),
    ) {
        let mut registered = Decimal::ZERO;
        let mut last_rank = state_rank(ReconciliationService::registration_state(registered, cap));

        for amount in attempts {
            if ReconciliationService::validate_registration("T", cap, registered, amount).is_ok() {
                registered += amount;
            }
            let rank = state_rank(ReconciliationService::registration_state(registered, cap));
            prop_assert!(rank >= last_rank, "state went backwards");
            last_rank = rank;
        }
    }

    /// IBAN normalization is idempotent.
    #[test]
    fn prop_normalize_iban_idempotent(raw in "[a-zA-Z0-9 ]{0,40}") {
        let once = normalize_iban(&raw);
        prop_assert_eq!(normalize_iban(&once), once);
    }
}
