//! Payment repository: the mutation authority for payment state.
//!
//! Every public procedure runs inside one database transaction. Events are
//! staged in a transaction-scoped outbox and published on the bus only
//! after commit, so a rolled-back call never leaks events.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use velka_core::events::{EventBus, LedgerEvent, Outbox};
use velka_core::payment::{
    CreatePaymentEventInput, CreatePaymentInput, PaymentError, PaymentEventType, PaymentService,
    PaymentStatus, StrategyRegistry,
};
use velka_core::reference;
use velka_shared::notification::{NotificationRequest, Notifier};

use crate::entities::{debts, members, payment_events, payments};

/// A payment together with its derived balance and status.
#[derive(Debug, Clone)]
pub struct PaymentView {
    /// The payment row.
    pub payment: payments::Model,
    /// Sum of all event amounts.
    pub balance: Decimal,
    /// Derived status.
    pub status: PaymentStatus,
    /// Event history, oldest first.
    pub events: Vec<payment_events::Model>,
}

/// Payment repository.
#[derive(Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
    strategies: Arc<StrategyRegistry>,
    bus: Arc<EventBus>,
    notifier: Arc<dyn Notifier>,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    ///
    /// The strategy registry, event bus, and notifier are injected here;
    /// nothing in the ledger reaches for globals.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        strategies: Arc<StrategyRegistry>,
        bus: Arc<EventBus>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            strategies,
            bus,
            notifier,
        }
    }

    /// Creates a payment.
    ///
    /// Persists the payment row, synthesizes the `created` event with the
    /// negated face amount, invokes the registered strategy for the type
    /// to produce the opaque data payload, and emits `PaymentCreated`.
    ///
    /// # Errors
    ///
    /// Fails if the face amount is not positive or the type has no
    /// registered strategy.
    pub async fn create_payment(
        &self,
        input: CreatePaymentInput,
    ) -> Result<PaymentView, PaymentError> {
        PaymentService::validate_face_amount(input.face_amount)?;

        let strategy = self
            .strategies
            .get(&input.payment_type)
            .ok_or_else(|| PaymentError::UnknownPaymentType(input.payment_type.clone()))?;

        let payment_id = Uuid::new_v4();

        // The strategy may talk to an external provider; its side effect
        // happens before the ledger transaction opens.
        let data = strategy
            .create_payment(payment_id, input.face_amount, &input.options)
            .await?;

        let reference_number = data
            .get("reference_number")
            .and_then(serde_json::Value::as_str)
            .map(reference::normalize);

        let now = Utc::now();
        let txn = self.db.begin().await.map_err(db_err)?;
        let mut outbox = Outbox::new();

        let payment = payments::ActiveModel {
            id: Set(payment_id),
            payment_type: Set(input.payment_type.clone()),
            title: Set(input.title.clone()),
            message: Set(input.message.clone()),
            face_amount: Set(input.face_amount),
            data: Set(data),
            reference_number: Set(reference_number),
            credited: Set(false),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let created = payment_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            payment_id: Set(payment_id),
            event_type: Set(PaymentEventType::Created.into()),
            amount: Set(PaymentService::created_event_amount(input.face_amount)),
            event_time: Set(now.into()),
            data: Set(None),
            bank_transaction_id: Set(None),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        outbox.record(LedgerEvent::PaymentCreated { payment_id });

        txn.commit().await.map_err(db_err)?;
        self.bus.publish_all(&outbox.into_events());

        info!(%payment_id, payment_type = %payment.payment_type, "payment created");

        let balance = created.amount;
        let status = PaymentService::derive_status(balance, payment.face_amount);
        Ok(PaymentView {
            payment,
            balance,
            status,
            events: vec![created],
        })
    }

    /// Appends a payment event and emits balance/status change events.
    ///
    /// # Errors
    ///
    /// Fails if the payment does not exist.
    pub async fn create_payment_event(
        &self,
        input: CreatePaymentEventInput,
    ) -> Result<payment_events::Model, PaymentError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let mut outbox = Outbox::new();

        let event = self.append_event_in_txn(&txn, &mut outbox, &input).await?;

        txn.commit().await.map_err(db_err)?;
        self.bus.publish_all(&outbox.into_events());

        Ok(event)
    }

    /// Appends an event inside an already-open transaction.
    ///
    /// The balance/status comparison baseline is the state immediately
    /// before this specific append, recomputed from the stored events, so
    /// zero-amount appends never spuriously fire change events.
    pub(crate) async fn append_event_in_txn(
        &self,
        txn: &DatabaseTransaction,
        outbox: &mut Outbox,
        input: &CreatePaymentEventInput,
    ) -> Result<payment_events::Model, PaymentError> {
        let payment = payments::Entity::find_by_id(input.payment_id)
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(PaymentError::NotFound(input.payment_id))?;

        let prior_balance = Self::balance_in_txn(txn, input.payment_id).await?;
        let outcome =
            PaymentService::append_outcome(prior_balance, payment.face_amount, input.amount);

        let event_time = input.event_time.unwrap_or_else(Utc::now);
        let event = payment_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            payment_id: Set(input.payment_id),
            event_type: Set(input.event_type.into()),
            amount: Set(input.amount),
            event_time: Set(event_time.into()),
            data: Set(input.data.clone()),
            bank_transaction_id: Set(input.bank_transaction_id.clone()),
            created_at: Set(Utc::now().into()),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;

        if outcome.balance_changed {
            outbox.record(LedgerEvent::BalanceChanged {
                payment_id: input.payment_id,
                balance: outcome.balance,
            });
        }
        if outcome.status_changed {
            outbox.record(LedgerEvent::StatusChanged {
                payment_id: input.payment_id,
                status: outcome.status,
            });
        }

        Ok(event)
    }

    /// Credits a payment: a one-way flag flip plus an audit event.
    ///
    /// Preconditions: the payment exists, is not already credited, and
    /// backs at least one debt. The payer's primary email must resolve;
    /// otherwise the whole operation rolls back. Event history is never
    /// reversed.
    ///
    /// # Errors
    ///
    /// Returns an error when any precondition fails.
    pub async fn credit_payment(
        &self,
        payment_id: Uuid,
        reason: &str,
    ) -> Result<payments::Model, PaymentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let payment = payments::Entity::find_by_id(payment_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(PaymentError::NotFound(payment_id))?;

        let backing_debts = debts::Entity::find()
            .filter(debts::Column::PaymentId.eq(payment_id))
            .all(&txn)
            .await
            .map_err(db_err)?;

        let domain = to_domain(&payment);
        PaymentService::validate_credit(&domain, backing_debts.len() as u64)?;

        // Resolve the payer's primary email through the first backing
        // debt's member. Missing email aborts the credit.
        let member = members::Entity::find_by_id(backing_debts[0].member_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(PaymentError::NoPayerEmail(payment_id))?;
        let recipient_email = member
            .email
            .clone()
            .ok_or(PaymentError::NoPayerEmail(payment_id))?;

        let mut active: payments::ActiveModel = payment.into();
        active.credited = Set(true);
        let payment = active.update(&txn).await.map_err(db_err)?;

        let now = Utc::now();
        payment_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            payment_id: Set(payment_id),
            event_type: Set(PaymentEventType::Credited.into()),
            amount: Set(Decimal::ZERO),
            event_time: Set(now.into()),
            data: Set(Some(serde_json::json!({ "reason": reason }))),
            bank_transaction_id: Set(None),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(%payment_id, "payment credited");

        // Fire-and-forget: delivery failures are the collaborator's
        // concern, the credit itself is already durable.
        let request = NotificationRequest {
            template: "payment_credited".to_string(),
            recipient_email,
            payload: serde_json::json!({
                "payment_id": payment_id,
                "title": payment.title,
                "reason": reason,
            }),
            related_debt_ids: backing_debts.iter().map(|d| d.id).collect(),
        };
        if let Err(error) = self.notifier.send_notification(request).await {
            warn!(%payment_id, %error, "credit notification delivery failed");
        }

        Ok(payment)
    }

    /// Loads a payment with its derived balance, status, and history.
    ///
    /// # Errors
    ///
    /// Fails if the payment does not exist.
    pub async fn get_payment(&self, payment_id: Uuid) -> Result<PaymentView, PaymentError> {
        let payment = payments::Entity::find_by_id(payment_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PaymentError::NotFound(payment_id))?;

        let events = payment_events::Entity::find()
            .filter(payment_events::Column::PaymentId.eq(payment_id))
            .order_by_asc(payment_events::Column::EventTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let balance: Decimal = events.iter().map(|e| e.amount).sum();
        let status = PaymentService::derive_status(balance, payment.face_amount);

        Ok(PaymentView {
            payment,
            balance,
            status,
            events,
        })
    }

    /// Finds a payment by creditor reference, leading zeros stripped on
    /// both sides. Returns `None` for blank or unknown references.
    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<payments::Model>, PaymentError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let found = Self::find_by_reference_in_txn(&txn, reference).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(found)
    }

    /// Reference lookup inside an already-open transaction.
    pub(crate) async fn find_by_reference_in_txn(
        txn: &DatabaseTransaction,
        reference: &str,
    ) -> Result<Option<payments::Model>, PaymentError> {
        let normalized = reference::normalize(reference);
        if normalized.is_empty() {
            return Ok(None);
        }

        payments::Entity::find()
            .filter(payments::Column::ReferenceNumber.eq(normalized))
            .one(txn)
            .await
            .map_err(db_err)
    }

    /// Sums the stored event amounts of a payment inside a transaction.
    pub(crate) async fn balance_in_txn(
        txn: &DatabaseTransaction,
        payment_id: Uuid,
    ) -> Result<Decimal, PaymentError> {
        let events = payment_events::Entity::find()
            .filter(payment_events::Column::PaymentId.eq(payment_id))
            .all(txn)
            .await
            .map_err(db_err)?;

        Ok(events.iter().map(|e| e.amount).sum())
    }
}

/// Converts a payment row into the core domain type.
pub(crate) fn to_domain(model: &payments::Model) -> velka_core::payment::Payment {
    velka_core::payment::Payment {
        id: model.id,
        payment_type: model.payment_type.clone(),
        title: model.title.clone(),
        message: model.message.clone(),
        face_amount: model.face_amount,
        data: model.data.clone(),
        reference_number: model.reference_number.clone(),
        credited: model.credited,
        created_at: model.created_at.into(),
    }
}

pub(crate) fn db_err(e: DbErr) -> PaymentError {
    PaymentError::Database(e.to_string())
}
