//! Core business logic for Velka.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here.
//!
//! # Modules
//!
//! - `payment` - Payment ledger: balance/status state machine and the
//!   payment-type strategy seam
//! - `reconciliation` - Bank statement import rules and registration
//!   invariants
//! - `events` - In-process event bus and the transaction-scoped outbox
//! - `debt` - Debt aggregates and the status projection onto payments
//! - `reference` - Creditor reference numbers (7-3-1 check digit)

pub mod debt;
pub mod events;
pub mod payment;
pub mod reconciliation;
pub mod reference;
