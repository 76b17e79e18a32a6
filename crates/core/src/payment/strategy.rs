//! Payment-type strategies.
//!
//! The ledger is type-agnostic: everything that differs between `cash`,
//! `invoice`, and `card` payments happens behind [`PaymentStrategy`]. A
//! strategy is asked exactly once per payment, at creation time, to produce
//! the type-specific opaque payload and to perform whatever side effect the
//! external provider needs. New payment types register their own strategy
//! without the ledger learning about them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::reference;

/// Errors raised by payment-type strategies.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The creation options bag was malformed for this type.
    #[error("Invalid payment options: {0}")]
    InvalidOptions(String),

    /// The external payment provider rejected or failed the request.
    #[error("Payment provider error: {0}")]
    Provider(String),
}

/// Creation behavior for one payment type.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Produces the type-specific opaque payload for a freshly created
    /// payment, performing any provider side effect required.
    async fn create_payment(
        &self,
        payment_id: Uuid,
        face_amount: Decimal,
        options: &serde_json::Value,
    ) -> Result<serde_json::Value, StrategyError>;
}

/// Named-variant dispatch table for payment types.
///
/// Injected at construction; never a global.
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn PaymentStrategy>>,
}

impl StrategyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a strategy under a type tag, replacing any previous one.
    pub fn register(&mut self, payment_type: impl Into<String>, strategy: Arc<dyn PaymentStrategy>) {
        self.strategies.insert(payment_type.into(), strategy);
    }

    /// Looks up the strategy for a type tag.
    #[must_use]
    pub fn get(&self, payment_type: &str) -> Option<Arc<dyn PaymentStrategy>> {
        self.strategies.get(payment_type).cloned()
    }

    /// Registered type tags, for diagnostics.
    #[must_use]
    pub fn registered_types(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

/// Strategy for cash payments: no provider, no payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct CashStrategy;

#[async_trait]
impl PaymentStrategy for CashStrategy {
    async fn create_payment(
        &self,
        _payment_id: Uuid,
        _face_amount: Decimal,
        _options: &serde_json::Value,
    ) -> Result<serde_json::Value, StrategyError> {
        Ok(serde_json::json!({}))
    }
}

/// Strategy for invoice payments.
///
/// Assigns each invoice a creditor reference from a running sequence and a
/// due date, either taken from the options bag (`due_date`, ISO 8601 date)
/// or defaulted to the payment term.
#[derive(Debug)]
pub struct InvoiceStrategy {
    next_reference_base: AtomicU64,
    payment_term_days: i64,
}

impl InvoiceStrategy {
    /// Creates an invoice strategy starting its reference sequence at
    /// `first_reference_base`, with a default payment term of 14 days.
    #[must_use]
    pub fn new(first_reference_base: u64) -> Self {
        Self {
            next_reference_base: AtomicU64::new(first_reference_base),
            payment_term_days: 14,
        }
    }

    /// Overrides the default payment term.
    #[must_use]
    pub fn with_payment_term_days(mut self, days: i64) -> Self {
        self.payment_term_days = days;
        self
    }

    fn due_date(&self, options: &serde_json::Value) -> Result<NaiveDate, StrategyError> {
        match options.get("due_date") {
            None | Some(serde_json::Value::Null) => {
                Ok(Utc::now().date_naive() + Duration::days(self.payment_term_days))
            }
            Some(serde_json::Value::String(raw)) => raw
                .parse()
                .map_err(|_| StrategyError::InvalidOptions(format!("bad due_date: {raw}"))),
            Some(other) => Err(StrategyError::InvalidOptions(format!(
                "due_date must be a date string, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl PaymentStrategy for InvoiceStrategy {
    async fn create_payment(
        &self,
        _payment_id: Uuid,
        _face_amount: Decimal,
        options: &serde_json::Value,
    ) -> Result<serde_json::Value, StrategyError> {
        let due_date = self.due_date(options)?;
        let base = self.next_reference_base.fetch_add(1, Ordering::SeqCst);
        let reference_number = reference::generate(base);

        Ok(serde_json::json!({
            "reference_number": reference_number,
            "due_date": due_date,
        }))
    }
}

/// External card-processor seam used by [`CardStrategy`].
///
/// The webhook that later reports the processor's outcome lives outside
/// this crate; it translates provider callbacks into ordinary payment
/// events.
#[async_trait]
pub trait CardProvider: Send + Sync {
    /// Opens a payment intent with the processor, returning its reference.
    async fn create_intent(
        &self,
        payment_id: Uuid,
        amount: Decimal,
    ) -> Result<String, StrategyError>;
}

/// Strategy for card-processor payments.
pub struct CardStrategy {
    provider: Arc<dyn CardProvider>,
}

impl CardStrategy {
    /// Creates a card strategy over a processor client.
    #[must_use]
    pub fn new(provider: Arc<dyn CardProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl PaymentStrategy for CardStrategy {
    async fn create_payment(
        &self,
        payment_id: Uuid,
        face_amount: Decimal,
        _options: &serde_json::Value,
    ) -> Result<serde_json::Value, StrategyError> {
        let intent_id = self.provider.create_intent(payment_id, face_amount).await?;
        Ok(serde_json::json!({ "intent_id": intent_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct StubProvider;

    #[async_trait]
    impl CardProvider for StubProvider {
        async fn create_intent(
            &self,
            payment_id: Uuid,
            _amount: Decimal,
        ) -> Result<String, StrategyError> {
            Ok(format!("intent-{payment_id}"))
        }
    }

    #[tokio::test]
    async fn test_cash_strategy_returns_empty_payload() {
        let data = CashStrategy
            .create_payment(Uuid::new_v4(), dec!(5.00), &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(data, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_invoice_strategy_assigns_sequential_references() {
        let strategy = InvoiceStrategy::new(123_456);

        let first = strategy
            .create_payment(Uuid::new_v4(), dec!(10.00), &serde_json::json!({}))
            .await
            .unwrap();
        let second = strategy
            .create_payment(Uuid::new_v4(), dec!(10.00), &serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(first["reference_number"], "1234561");
        assert_eq!(second["reference_number"], reference::generate(123_457));
        assert!(reference::is_valid(first["reference_number"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn test_invoice_strategy_honors_explicit_due_date() {
        let strategy = InvoiceStrategy::new(1);
        let data = strategy
            .create_payment(
                Uuid::new_v4(),
                dec!(10.00),
                &serde_json::json!({ "due_date": "2026-09-30" }),
            )
            .await
            .unwrap();
        assert_eq!(data["due_date"], "2026-09-30");
    }

    #[tokio::test]
    async fn test_invoice_strategy_rejects_malformed_due_date() {
        let strategy = InvoiceStrategy::new(1);
        let result = strategy
            .create_payment(
                Uuid::new_v4(),
                dec!(10.00),
                &serde_json::json!({ "due_date": "whenever" }),
            )
            .await;
        assert!(matches!(result, Err(StrategyError::InvalidOptions(_))));
    }

    #[tokio::test]
    async fn test_card_strategy_records_provider_intent() {
        let payment_id = Uuid::new_v4();
        let strategy = CardStrategy::new(Arc::new(StubProvider));
        let data = strategy
            .create_payment(payment_id, dec!(25.00), &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(data["intent_id"], format!("intent-{payment_id}"));
    }

    #[test]
    fn test_registry_dispatch() {
        let mut registry = StrategyRegistry::new();
        registry.register("cash", Arc::new(CashStrategy));

        assert!(registry.get("cash").is_some());
        assert!(registry.get("invoice").is_none());
        assert_eq!(registry.registered_types(), vec!["cash"]);
    }
}
