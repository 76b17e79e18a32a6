//! Payment ledger logic.
//!
//! This module implements the payment side of the ledger:
//! - Payment and payment event domain types
//! - Balance and status derivation (the single status state machine)
//! - Event-emission decisions for appends
//! - The payment-type strategy seam
//! - Error types for ledger operations

pub mod error;
pub mod service;
pub mod strategy;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PaymentError;
pub use service::{AppendOutcome, PaymentService};
pub use strategy::{
    CardProvider, CardStrategy, CashStrategy, InvoiceStrategy, PaymentStrategy, StrategyError,
    StrategyRegistry,
};
pub use types::{
    CreatePaymentEventInput, CreatePaymentInput, Payment, PaymentEvent, PaymentEventType,
    PaymentStatus,
};
