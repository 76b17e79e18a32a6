//! `SeaORM` entity definitions.

pub mod bank_accounts;
pub mod bank_statement_transactions;
pub mod bank_statements;
pub mod bank_transactions;
pub mod debt_components;
pub mod debts;
pub mod members;
pub mod payment_events;
pub mod payments;
pub mod sea_orm_active_enums;
