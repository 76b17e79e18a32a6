//! Bank reconciliation logic.
//!
//! This module implements the rules for turning imported bank statements
//! into ledger registrations:
//! - Statement/transaction input shapes (already parsed upstream)
//! - IBAN normalization
//! - The transaction registration cap invariant
//! - The derived registration state of a transaction

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod validation_props;

pub use error::ReconciliationError;
pub use service::ReconciliationService;
pub use types::{
    normalize_iban, RegistrationState, StatementBalance, StatementImport, TransactionDirection,
    TransactionImport,
};
