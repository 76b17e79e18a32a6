//! Bank reconciliation domain types.
//!
//! Statement input shapes mirror what the upstream wire-format parser
//! produces; this crate never touches raw statement bytes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalizes an IBAN: strips all whitespace and upper-cases.
///
/// Account identity is the normalized IBAN.
#[must_use]
pub fn normalize_iban(iban: &str) -> String {
    iban.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Direction of a bank transaction from the account's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    /// Money in.
    Credit,
    /// Money out.
    Debit,
}

/// A balance snapshot on a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementBalance {
    /// Snapshot date.
    pub date: NaiveDate,
    /// Balance amount.
    pub amount: Decimal,
}

/// One transaction in a statement batch, as parsed upstream.
///
/// The `id` is assigned by the bank, globally unique, and stable across
/// re-delivery; it is what makes import idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionImport {
    /// Upstream transaction ID.
    pub id: String,
    /// Signed amount.
    pub amount: Decimal,
    /// Value date.
    pub date: NaiveDate,
    /// Direction.
    pub direction: TransactionDirection,
    /// Counterparty name.
    pub other_party_name: String,
    /// Counterparty account, when the bank reports one.
    pub other_party_account: Option<String>,
    /// Free-text message.
    pub message: Option<String>,
    /// Payment reference string, when present.
    pub reference: Option<String>,
}

/// A parsed statement ready for import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementImport {
    /// Upstream statement ID.
    pub id: String,
    /// IBAN of the account the statement belongs to.
    pub account_iban: String,
    /// When the bank generated the statement.
    pub generated_at: DateTime<Utc>,
    /// Opening balance.
    pub opening_balance: StatementBalance,
    /// Closing balance.
    pub closing_balance: StatementBalance,
    /// Transaction batch covered by this statement.
    pub transactions: Vec<TransactionImport>,
}

/// Derived registration state of a bank transaction.
///
/// Driven solely by the running sum of linked payment event amounts versus
/// the transaction amount; there is no transition back because payment
/// events are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    /// Nothing registered yet.
    Unregistered,
    /// Part of the amount is registered.
    PartiallyRegistered,
    /// The whole amount is registered.
    FullyRegistered,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("fi21 1234 5600 0007 85", "FI2112345600000785")]
    #[case("FI2112345600000785", "FI2112345600000785")]
    #[case("  de89 3704 0044 0532 0130 00 ", "DE89370400440532013000")]
    fn test_normalize_iban(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_iban(input), expected);
    }

    #[test]
    fn test_direction_serde() {
        assert_eq!(
            serde_json::to_string(&TransactionDirection::Credit).unwrap(),
            "\"credit\""
        );
        let parsed: TransactionDirection = serde_json::from_str("\"debit\"").unwrap();
        assert_eq!(parsed, TransactionDirection::Debit);
    }
}
