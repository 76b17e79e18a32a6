//! Bank reconciliation repository.
//!
//! Owns bank accounts, statements, and transactions; drives registration
//! of transaction amounts against payments through the payment repository.
//! Statement import is idempotent by upstream transaction ID.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use velka_core::events::{EventBus, LedgerEvent, Outbox};
use velka_core::payment::{CreatePaymentEventInput, PaymentError, PaymentEventType};
use velka_core::reconciliation::{
    ReconciliationError, ReconciliationService, RegistrationState, StatementImport,
    TransactionDirection, TransactionImport,
};

use crate::entities::{
    bank_accounts, bank_statement_transactions, bank_statements, bank_transactions, payment_events,
};
use crate::repositories::payment::PaymentRepository;

/// Result of a statement import.
#[derive(Debug, Clone)]
pub struct StatementImportResult {
    /// The statement row (created or re-delivered).
    pub statement: bank_statements::Model,
    /// Every transaction the statement covers, in batch order.
    pub transactions: Vec<bank_transactions::Model>,
}

/// Bank reconciliation repository.
#[derive(Clone)]
pub struct BankRepository {
    db: DatabaseConnection,
    payments: PaymentRepository,
    bus: Arc<EventBus>,
}

impl BankRepository {
    /// Creates a new bank repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, payments: PaymentRepository, bus: Arc<EventBus>) -> Self {
        Self { db, payments, bus }
    }

    /// Creates a bank account keyed by its normalized IBAN.
    ///
    /// # Errors
    ///
    /// Fails on a malformed IBAN or a duplicate account.
    pub async fn create_bank_account(
        &self,
        name: &str,
        iban: &str,
    ) -> Result<bank_accounts::Model, ReconciliationError> {
        let normalized = ReconciliationService::validate_iban(iban)?;

        let existing = bank_accounts::Entity::find_by_id(&normalized)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Err(ReconciliationError::DuplicateAccount(normalized));
        }

        let account = bank_accounts::ActiveModel {
            iban: Set(normalized),
            name: Set(name.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        info!(iban = %account.iban, "bank account created");
        Ok(account)
    }

    /// Imports a parsed bank statement.
    ///
    /// Per transaction in the batch: unknown upstream IDs are inserted and
    /// emit `TransactionObserved`; known IDs are reused verbatim with no
    /// re-emit and no mutation. Either way the transaction is linked to
    /// this statement. Automatic registration is attempted only for newly
    /// observed transactions (re-delivered ones must not register twice)
    /// and only in the credit direction, since outgoing money never
    /// settles a payment; those carrying a resolvable payment reference
    /// are registered for the full transaction amount. An unresolvable
    /// reference is not an error.
    ///
    /// The whole import commits or rolls back as one unit; it fails
    /// outright if the account IBAN is unknown, because statements must
    /// never create orphan accounts.
    pub async fn import_statement(
        &self,
        input: StatementImport,
    ) -> Result<StatementImportResult, ReconciliationError> {
        let iban = ReconciliationService::validate_iban(&input.account_iban)?;

        let txn = self.db.begin().await.map_err(db_err)?;
        let mut outbox = Outbox::new();

        bank_accounts::Entity::find_by_id(&iban)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconciliationError::AccountNotFound(iban.clone()))?;

        let statement = match bank_statements::Entity::find_by_id(&input.id)
            .one(&txn)
            .await
            .map_err(db_err)?
        {
            Some(existing) => {
                debug!(statement_id = %existing.id, "statement re-delivered");
                existing
            }
            None => bank_statements::ActiveModel {
                id: Set(input.id.clone()),
                account_iban: Set(iban.clone()),
                generated_at: Set(input.generated_at.into()),
                opening_balance: Set(input.opening_balance.amount),
                opening_balance_date: Set(input.opening_balance.date),
                closing_balance: Set(input.closing_balance.amount),
                closing_balance_date: Set(input.closing_balance.date),
                imported_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?,
        };

        let mut transactions = Vec::with_capacity(input.transactions.len());
        let mut observed = 0usize;

        for incoming in &input.transactions {
            let (row, newly_observed) =
                Self::observe_transaction_in_txn(&txn, &mut outbox, &iban, incoming).await?;

            Self::link_to_statement_in_txn(&txn, &statement.id, &row.id).await?;

            if newly_observed {
                observed += 1;
                if incoming.direction == TransactionDirection::Credit {
                    self.try_auto_register_in_txn(&txn, &mut outbox, &row).await?;
                }
            }

            transactions.push(row);
        }

        txn.commit().await.map_err(db_err)?;
        self.bus.publish_all(&outbox.into_events());

        info!(
            statement_id = %statement.id,
            account = %iban,
            batch = transactions.len(),
            observed,
            "statement imported"
        );

        Ok(StatementImportResult {
            statement,
            transactions,
        })
    }

    /// Inserts the transaction if its upstream ID is unknown; otherwise
    /// reuses the stored row verbatim.
    async fn observe_transaction_in_txn(
        txn: &DatabaseTransaction,
        outbox: &mut Outbox,
        iban: &str,
        incoming: &TransactionImport,
    ) -> Result<(bank_transactions::Model, bool), ReconciliationError> {
        if let Some(existing) = bank_transactions::Entity::find_by_id(&incoming.id)
            .one(txn)
            .await
            .map_err(db_err)?
        {
            debug!(transaction_id = %existing.id, "transaction already known, reusing");
            return Ok((existing, false));
        }

        let row = bank_transactions::ActiveModel {
            id: Set(incoming.id.clone()),
            account_iban: Set(iban.to_string()),
            amount: Set(incoming.amount),
            direction: Set(incoming.direction.into()),
            value_date: Set(incoming.date),
            other_party_name: Set(incoming.other_party_name.clone()),
            other_party_account: Set(incoming.other_party_account.clone()),
            message: Set(incoming.message.clone()),
            reference: Set(incoming.reference.clone()),
            created_at: Set(Utc::now().into()),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;

        outbox.record(LedgerEvent::TransactionObserved {
            transaction_id: row.id.clone(),
            account_iban: row.account_iban.clone(),
            amount: row.amount,
            reference: row.reference.clone(),
        });

        Ok((row, true))
    }

    /// Links a transaction to a statement; linking twice is a no-op.
    async fn link_to_statement_in_txn(
        txn: &DatabaseTransaction,
        statement_id: &str,
        transaction_id: &str,
    ) -> Result<(), ReconciliationError> {
        let existing = bank_statement_transactions::Entity::find_by_id((
            statement_id.to_string(),
            transaction_id.to_string(),
        ))
        .one(txn)
        .await
        .map_err(db_err)?;

        if existing.is_none() {
            bank_statement_transactions::ActiveModel {
                statement_id: Set(statement_id.to_string()),
                transaction_id: Set(transaction_id.to_string()),
            }
            .insert(txn)
            .await
            .map_err(db_err)?;
        }

        Ok(())
    }

    /// Attempts automatic registration of a newly observed transaction.
    ///
    /// An unresolvable reference leaves the transaction unregistered for
    /// manual handling; that is defined success, not an error.
    async fn try_auto_register_in_txn(
        &self,
        txn: &DatabaseTransaction,
        outbox: &mut Outbox,
        row: &bank_transactions::Model,
    ) -> Result<(), ReconciliationError> {
        let Some(reference) = row.reference.as_deref() else {
            return Ok(());
        };

        let Some(payment) = PaymentRepository::find_by_reference_in_txn(txn, reference).await?
        else {
            debug!(transaction_id = %row.id, reference, "no payment for reference");
            return Ok(());
        };

        self.register_in_txn(txn, outbox, payment.id, &row.id, row.amount)
            .await?;

        info!(
            transaction_id = %row.id,
            payment_id = %payment.id,
            "transaction auto-registered"
        );
        Ok(())
    }

    /// Registers an amount of a bank transaction against a payment.
    ///
    /// The central invariant surface: the sum of all payment events linked
    /// to the transaction never exceeds the transaction amount. Rejection
    /// happens before any write; prior registrations stay untouched.
    ///
    /// # Errors
    ///
    /// Fails on unknown transaction or payment, or when the cap would be
    /// exceeded.
    pub async fn register_transaction(
        &self,
        payment_id: Uuid,
        transaction_id: &str,
        amount: Decimal,
    ) -> Result<payment_events::Model, ReconciliationError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let mut outbox = Outbox::new();

        let event = self
            .register_in_txn(&txn, &mut outbox, payment_id, transaction_id, amount)
            .await?;

        txn.commit().await.map_err(db_err)?;
        self.bus.publish_all(&outbox.into_events());

        Ok(event)
    }

    /// Cap-checked registration inside an already-open transaction.
    ///
    /// Takes a row-level exclusive lock on the bank transaction before
    /// summing linked events, so concurrent registrations against the same
    /// transaction serialize and the cap cannot be raced past.
    async fn register_in_txn(
        &self,
        txn: &DatabaseTransaction,
        outbox: &mut Outbox,
        payment_id: Uuid,
        transaction_id: &str,
        amount: Decimal,
    ) -> Result<payment_events::Model, ReconciliationError> {
        let transaction = bank_transactions::Entity::find_by_id(transaction_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconciliationError::TransactionNotFound(transaction_id.to_string()))?;

        let prior_sum = Self::registered_sum_in_txn(txn, transaction_id).await?;
        ReconciliationService::validate_registration(
            transaction_id,
            transaction.amount,
            prior_sum,
            amount,
        )?;

        let input = CreatePaymentEventInput {
            payment_id,
            event_type: PaymentEventType::Payment,
            amount,
            event_time: None,
            bank_transaction_id: Some(transaction_id.to_string()),
            data: None,
        };

        self.payments
            .append_event_in_txn(txn, outbox, &input)
            .await
            .map_err(|e| match e {
                PaymentError::NotFound(id) => ReconciliationError::PaymentNotFound(id),
                other => ReconciliationError::Payment(other),
            })
    }

    /// Sum of all payment event amounts linked to a transaction.
    async fn registered_sum_in_txn(
        txn: &DatabaseTransaction,
        transaction_id: &str,
    ) -> Result<Decimal, ReconciliationError> {
        let events = payment_events::Entity::find()
            .filter(payment_events::Column::BankTransactionId.eq(transaction_id))
            .all(txn)
            .await
            .map_err(db_err)?;

        Ok(events.iter().map(|e| e.amount).sum())
    }

    /// Every payment event linked to a transaction, for audit display.
    ///
    /// # Errors
    ///
    /// Fails if the transaction does not exist.
    pub async fn get_transaction_registrations(
        &self,
        transaction_id: &str,
    ) -> Result<Vec<payment_events::Model>, ReconciliationError> {
        bank_transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconciliationError::TransactionNotFound(transaction_id.to_string()))?;

        payment_events::Entity::find()
            .filter(payment_events::Column::BankTransactionId.eq(transaction_id))
            .order_by_asc(payment_events::Column::EventTime)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Derived registration state of a transaction.
    ///
    /// # Errors
    ///
    /// Fails if the transaction does not exist.
    pub async fn get_registration_state(
        &self,
        transaction_id: &str,
    ) -> Result<RegistrationState, ReconciliationError> {
        let transaction = bank_transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconciliationError::TransactionNotFound(transaction_id.to_string()))?;

        let registrations = payment_events::Entity::find()
            .filter(payment_events::Column::BankTransactionId.eq(transaction_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let registered: Decimal = registrations.iter().map(|e| e.amount).sum();

        Ok(ReconciliationService::registration_state(
            registered,
            transaction.amount,
        ))
    }

    /// All transactions owned by an account, newest value date first.
    ///
    /// # Errors
    ///
    /// Fails if the account does not exist.
    pub async fn get_account_transactions(
        &self,
        iban: &str,
    ) -> Result<Vec<bank_transactions::Model>, ReconciliationError> {
        let normalized = ReconciliationService::validate_iban(iban)?;

        bank_accounts::Entity::find_by_id(&normalized)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconciliationError::AccountNotFound(normalized.clone()))?;

        bank_transactions::Entity::find()
            .filter(bank_transactions::Column::AccountIban.eq(normalized))
            .order_by_desc(bank_transactions::Column::ValueDate)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// The set of transactions a statement covers.
    ///
    /// # Errors
    ///
    /// Fails if the statement does not exist.
    pub async fn get_statement_transactions(
        &self,
        statement_id: &str,
    ) -> Result<Vec<bank_transactions::Model>, ReconciliationError> {
        let statement = bank_statements::Entity::find_by_id(statement_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconciliationError::StatementNotFound(statement_id.to_string()))?;

        statement
            .find_related(bank_transactions::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

fn db_err(e: DbErr) -> ReconciliationError {
    ReconciliationError::Database(e.to_string())
}
