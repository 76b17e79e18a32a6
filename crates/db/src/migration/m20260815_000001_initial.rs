//! Initial database migration.
//!
//! Creates the enum types and all tables of the ledger schema: members and
//! debts, payments with their append-only event log, and the bank side
//! (accounts, statements, transactions, and the statement coverage link).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: MEMBERS & DEBTS
        // ============================================================
        db.execute_unprepared(MEMBERS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(DEBTS_SQL).await?;
        db.execute_unprepared(DEBT_COMPONENTS_SQL).await?;

        // ============================================================
        // PART 3: BANK RECONCILIATION
        // ============================================================
        db.execute_unprepared(BANK_ACCOUNTS_SQL).await?;
        db.execute_unprepared(BANK_STATEMENTS_SQL).await?;
        db.execute_unprepared(BANK_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(BANK_STATEMENT_TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 4: PAYMENT EVENT LOG
        // ============================================================
        db.execute_unprepared(PAYMENT_EVENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Payment event classification
CREATE TYPE payment_event_type AS ENUM (
    'created',
    'payment',
    'credited',
    'failed',
    'other'
);

-- Bank transaction direction as seen from the monitored account
CREATE TYPE transaction_direction AS ENUM (
    'credit',
    'debit'
);
";

const MEMBERS_SQL: &str = r"
CREATE TABLE members (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    payment_type VARCHAR(50) NOT NULL,
    title VARCHAR(255) NOT NULL,
    message TEXT NOT NULL,
    face_amount DECIMAL(20, 6) NOT NULL CHECK (face_amount > 0),
    data JSONB NOT NULL DEFAULT '{}',
    reference_number VARCHAR(30),
    credited BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Reference lookup during reconciliation; references are normalized
-- before storage so an exact-match index is enough.
CREATE INDEX idx_payments_reference_number
    ON payments(reference_number) WHERE reference_number IS NOT NULL;
";

const DEBTS_SQL: &str = r"
CREATE TABLE debts (
    id UUID PRIMARY KEY,
    member_id UUID NOT NULL REFERENCES members(id),
    payment_id UUID REFERENCES payments(id),
    title VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_debts_member_id ON debts(member_id);
CREATE INDEX idx_debts_payment_id ON debts(payment_id) WHERE payment_id IS NOT NULL;
";

const DEBT_COMPONENTS_SQL: &str = r"
CREATE TABLE debt_components (
    id UUID PRIMARY KEY,
    debt_id UUID NOT NULL REFERENCES debts(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    amount DECIMAL(20, 6) NOT NULL
);

CREATE INDEX idx_debt_components_debt_id ON debt_components(debt_id);
";

const BANK_ACCOUNTS_SQL: &str = r"
CREATE TABLE bank_accounts (
    iban VARCHAR(34) PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const BANK_STATEMENTS_SQL: &str = r"
CREATE TABLE bank_statements (
    id VARCHAR(64) PRIMARY KEY,
    account_iban VARCHAR(34) NOT NULL REFERENCES bank_accounts(iban),
    generated_at TIMESTAMPTZ NOT NULL,
    opening_balance DECIMAL(20, 6) NOT NULL,
    opening_balance_date DATE NOT NULL,
    closing_balance DECIMAL(20, 6) NOT NULL,
    closing_balance_date DATE NOT NULL,
    imported_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_bank_statements_account_iban ON bank_statements(account_iban);
";

const BANK_TRANSACTIONS_SQL: &str = r"
-- Primary key is the upstream bank's transaction ID, stable across
-- re-delivery in overlapping statements.
CREATE TABLE bank_transactions (
    id VARCHAR(64) PRIMARY KEY,
    account_iban VARCHAR(34) NOT NULL REFERENCES bank_accounts(iban),
    amount DECIMAL(20, 6) NOT NULL,
    direction transaction_direction NOT NULL,
    value_date DATE NOT NULL,
    other_party_name VARCHAR(255) NOT NULL,
    other_party_account VARCHAR(34),
    message TEXT,
    reference VARCHAR(30),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_bank_transactions_account_iban ON bank_transactions(account_iban);
CREATE INDEX idx_bank_transactions_reference
    ON bank_transactions(reference) WHERE reference IS NOT NULL;
";

const BANK_STATEMENT_TRANSACTIONS_SQL: &str = r"
-- Coverage link: overlapping statement windows report the same
-- transaction, so this is many-to-many.
CREATE TABLE bank_statement_transactions (
    statement_id VARCHAR(64) NOT NULL REFERENCES bank_statements(id),
    transaction_id VARCHAR(64) NOT NULL REFERENCES bank_transactions(id),
    PRIMARY KEY (statement_id, transaction_id)
);
";

const PAYMENT_EVENTS_SQL: &str = r"
-- Append-only: the application never updates or deletes rows here.
CREATE TABLE payment_events (
    id UUID PRIMARY KEY,
    payment_id UUID NOT NULL REFERENCES payments(id),
    event_type payment_event_type NOT NULL,
    amount DECIMAL(20, 6) NOT NULL,
    event_time TIMESTAMPTZ NOT NULL,
    data JSONB,
    bank_transaction_id VARCHAR(64) REFERENCES bank_transactions(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_payment_events_payment_id ON payment_events(payment_id);
CREATE INDEX idx_payment_events_bank_transaction_id
    ON payment_events(bank_transaction_id) WHERE bank_transaction_id IS NOT NULL;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payment_events CASCADE;
DROP TABLE IF EXISTS bank_statement_transactions CASCADE;
DROP TABLE IF EXISTS bank_transactions CASCADE;
DROP TABLE IF EXISTS bank_statements CASCADE;
DROP TABLE IF EXISTS bank_accounts CASCADE;
DROP TABLE IF EXISTS debt_components CASCADE;
DROP TABLE IF EXISTS debts CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS members CASCADE;
DROP TYPE IF EXISTS payment_event_type;
DROP TYPE IF EXISTS transaction_direction;
";
