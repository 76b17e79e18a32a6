//! Payment ledger domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived payment status.
///
/// The status is a pure function of the payment's balance and face amount;
/// it is never stored. Partial and excess payment deliberately collapse to
/// [`PaymentStatus::Mispaid`] so that exactly three states exist. Overdue
/// semantics are layered on top of this by callers comparing a due date to
/// the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// No net payment events beyond `created`.
    Unpaid,
    /// Balance is exactly zero.
    Paid,
    /// Any other balance: partial, excess, or negative-going-positive.
    Mispaid,
}

impl PaymentStatus {
    /// Stable string form, as used in events and API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Mispaid => "mispaid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment event classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentEventType {
    /// Synthesized once when the payment is created; carries `-face_amount`.
    Created,
    /// A payment against the balance (cash, bank transaction, processor).
    Payment,
    /// Audit marker appended when the payment is credited.
    Credited,
    /// A failed provider attempt.
    Failed,
    /// Anything else (manual corrections, provider noise).
    Other,
}

/// A payment owed by a member, settled through appended events.
///
/// Mutated only by appending [`PaymentEvent`]s; never deleted, only
/// credited. `balance` and `status` are derived, not fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID.
    pub id: Uuid,
    /// Type tag (`cash`, `invoice`, `card`, extensible).
    pub payment_type: String,
    /// Human-readable title.
    pub title: String,
    /// Free-form message shown to the payer.
    pub message: String,
    /// Face value the payer owes.
    pub face_amount: Decimal,
    /// Type-specific opaque payload produced by the registered strategy.
    pub data: serde_json::Value,
    /// Creditor reference in normalized form, when the type carries one.
    pub reference_number: Option<String>,
    /// One-way credited flag.
    pub credited: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An append-only ledger event against a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Event ID.
    pub id: Uuid,
    /// Owning payment.
    pub payment_id: Uuid,
    /// Event classification.
    pub event_type: PaymentEventType,
    /// Signed amount applied to the balance.
    pub amount: Decimal,
    /// When the event happened.
    pub event_time: DateTime<Utc>,
    /// Optional free-form metadata.
    pub data: Option<serde_json::Value>,
    /// Bank transaction backing this event, if it is a registration.
    pub bank_transaction_id: Option<String>,
}

/// Input for creating a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Type tag; must have a registered strategy.
    pub payment_type: String,
    /// Human-readable title.
    pub title: String,
    /// Free-form message shown to the payer.
    pub message: String,
    /// Face value the payer owes (must be positive).
    pub face_amount: Decimal,
    /// Type-specific options bag handed to the strategy.
    pub options: serde_json::Value,
}

/// Input for appending a payment event.
#[derive(Debug, Clone)]
pub struct CreatePaymentEventInput {
    /// Owning payment.
    pub payment_id: Uuid,
    /// Event classification.
    pub event_type: PaymentEventType,
    /// Signed amount applied to the balance.
    pub amount: Decimal,
    /// Event time; defaults to now when absent.
    pub event_time: Option<DateTime<Utc>>,
    /// Bank transaction backing this event, if any.
    pub bank_transaction_id: Option<String>,
    /// Optional free-form metadata.
    pub data: Option<serde_json::Value>,
}
