//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Each mutating method runs in its own database transaction and flushes
//! its outbox to the event bus only after the commit succeeds.

pub mod bank;
pub mod debt;
pub mod payment;


pub use bank::{BankRepository, StatementImportResult};
pub use debt::{CreateDebtInput, DebtComponentInput, DebtRepository, DebtWithComponents};
pub use payment::{PaymentRepository, PaymentView};
