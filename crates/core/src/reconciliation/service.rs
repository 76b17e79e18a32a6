//! Bank reconciliation service: registration invariants.
//!
//! Pure logic with no database dependencies. The repository locks the
//! transaction row, sums the already-linked payment events, and asks this
//! service whether the registration is allowed.

use rust_decimal::Decimal;

use super::error::ReconciliationError;
use super::types::{normalize_iban, RegistrationState};

/// Bank reconciliation service.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Validates that an IBAN looks like an IBAN after normalization.
    ///
    /// Full modulo-97 validation belongs to the request validation layer;
    /// the core only refuses values that cannot possibly be account
    /// identities.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::InvalidIban`] for malformed input.
    pub fn validate_iban(iban: &str) -> Result<String, ReconciliationError> {
        let normalized = normalize_iban(iban);

        let plausible = normalized.len() >= 15
            && normalized.len() <= 34
            && normalized
                .chars()
                .take(2)
                .all(|c| c.is_ascii_uppercase())
            && normalized.chars().skip(2).all(|c| c.is_ascii_alphanumeric());

        if plausible {
            Ok(normalized)
        } else {
            Err(ReconciliationError::InvalidIban(iban.to_string()))
        }
    }

    /// Checks the registration cap invariant.
    ///
    /// `prior_sum` is the sum of all payment events already linked to the
    /// transaction; the caller must hold a row-level lock on the
    /// transaction while computing it, or the check races. Registrations
    /// are monotonic and transaction-capped; under-registration is allowed.
    ///
    /// # Errors
    ///
    /// Rejects non-positive amounts (a negative registration would move the
    /// registration state backwards) and any amount that would push the
    /// registered sum past the transaction amount. No mutation has happened
    /// when this fails.
    pub fn validate_registration(
        transaction_id: &str,
        transaction_amount: Decimal,
        prior_sum: Decimal,
        amount: Decimal,
    ) -> Result<(), ReconciliationError> {
        if amount <= Decimal::ZERO {
            return Err(ReconciliationError::NonPositiveAmount);
        }

        if prior_sum + amount > transaction_amount {
            return Err(ReconciliationError::RegistrationExceedsTransaction {
                transaction_id: transaction_id.to_string(),
                transaction_amount,
                registered: prior_sum,
                attempted: amount,
            });
        }

        Ok(())
    }

    /// Derives the registration state of a transaction from the registered
    /// sum and the transaction amount.
    #[must_use]
    pub fn registration_state(
        registered_sum: Decimal,
        transaction_amount: Decimal,
    ) -> RegistrationState {
        if registered_sum == Decimal::ZERO {
            RegistrationState::Unregistered
        } else if registered_sum == transaction_amount {
            RegistrationState::FullyRegistered
        } else {
            RegistrationState::PartiallyRegistered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_iban_normalizes() {
        assert_eq!(
            ReconciliationService::validate_iban("fi21 1234 5600 0007 85").unwrap(),
            "FI2112345600000785"
        );
    }

    #[rstest]
    #[case("")]
    #[case("FI21")]
    #[case("1234 5600 0007 8512 34")]
    #[case("FI21 1234-5600-0007-85")]
    fn test_validate_iban_rejects_malformed(#[case] iban: &str) {
        assert!(matches!(
            ReconciliationService::validate_iban(iban),
            Err(ReconciliationError::InvalidIban(_))
        ));
    }

    #[test]
    fn test_registration_within_cap_is_allowed() {
        assert!(ReconciliationService::validate_registration(
            "T1",
            dec!(10.00),
            dec!(0),
            dec!(5.00)
        )
        .is_ok());
        // Exactly consuming the remainder is fine.
        assert!(ReconciliationService::validate_registration(
            "T1",
            dec!(10.00),
            dec!(5.00),
            dec!(5.00)
        )
        .is_ok());
    }

    #[test]
    fn test_registration_beyond_cap_is_rejected() {
        // 5.00 registered, attempt 10.00 against a 10.00 transaction.
        let result =
            ReconciliationService::validate_registration("T1", dec!(10.00), dec!(5.00), dec!(10.00));
        assert!(matches!(
            result,
            Err(ReconciliationError::RegistrationExceedsTransaction {
                registered,
                attempted,
                ..
            }) if registered == dec!(5.00) && attempted == dec!(10.00)
        ));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-0.01))]
    #[case(dec!(-5.00))]
    fn test_non_positive_registration_is_rejected(#[case] amount: Decimal) {
        assert!(matches!(
            ReconciliationService::validate_registration("T1", dec!(10.00), dec!(0), amount),
            Err(ReconciliationError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_negative_registration_cannot_reopen_a_full_transaction() {
        // A fully registered 10.00 transaction: -5.00 must be rejected, so
        // the state stays fully registered and no headroom appears for a
        // further 5.00.
        assert!(matches!(
            ReconciliationService::validate_registration(
                "T1",
                dec!(10.00),
                dec!(10.00),
                dec!(-5.00)
            ),
            Err(ReconciliationError::NonPositiveAmount)
        ));
        assert_eq!(
            ReconciliationService::registration_state(dec!(10.00), dec!(10.00)),
            RegistrationState::FullyRegistered
        );
        assert!(ReconciliationService::validate_registration(
            "T1",
            dec!(10.00),
            dec!(10.00),
            dec!(5.00)
        )
        .is_err());
    }

    #[rstest]
    #[case(dec!(0), RegistrationState::Unregistered)]
    #[case(dec!(4.00), RegistrationState::PartiallyRegistered)]
    #[case(dec!(10.00), RegistrationState::FullyRegistered)]
    fn test_registration_state(#[case] registered: Decimal, #[case] expected: RegistrationState) {
        assert_eq!(
            ReconciliationService::registration_state(registered, dec!(10.00)),
            expected
        );
    }
}
