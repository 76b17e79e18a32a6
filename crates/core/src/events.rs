//! In-process event bus and the transaction-scoped outbox.
//!
//! Ledger procedures never call their observers directly. Mutations record
//! events into an [`Outbox`] bound to the storage transaction; the caller
//! publishes the drained outbox on the [`EventBus`] only after the
//! transaction commits. A rolled-back transaction therefore never leaks
//! events to subscribers, and subscribers always observe state that is
//! already durable.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::payment::PaymentStatus;

/// Events emitted by the ledger and reconciliation components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A payment was created.
    PaymentCreated {
        /// The new payment's ID.
        payment_id: Uuid,
    },
    /// A payment's balance changed.
    BalanceChanged {
        /// The payment whose balance changed.
        payment_id: Uuid,
        /// The balance after the change.
        balance: Decimal,
    },
    /// A payment's derived status changed.
    StatusChanged {
        /// The payment whose status changed.
        payment_id: Uuid,
        /// The status after the change.
        status: PaymentStatus,
    },
    /// A bank transaction was seen for the first time.
    TransactionObserved {
        /// Upstream transaction ID.
        transaction_id: String,
        /// Normalized IBAN of the owning account.
        account_iban: String,
        /// Signed transaction amount.
        amount: Decimal,
        /// Payment reference carried by the transaction, if any.
        reference: Option<String>,
    },
}

/// An event subscriber.
///
/// Delivery is synchronous: `on_event` runs on the publishing call's stack
/// after the triggering transaction has committed.
pub trait Subscriber: Send + Sync {
    /// Called once per published event.
    fn on_event(&self, event: &LedgerEvent);
}

/// In-process observer list.
///
/// Injected through repository constructors, never a global. Tests
/// substitute recording subscribers the same way.
#[derive(Default, Clone)]
pub struct EventBus {
    subscribers: Vec<Arc<dyn Subscriber>>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber. Any number of subscribers may listen.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Delivers one event to every subscriber, in registration order.
    pub fn publish(&self, event: &LedgerEvent) {
        for subscriber in &self.subscribers {
            subscriber.on_event(event);
        }
    }

    /// Delivers a batch of events, preserving their order.
    pub fn publish_all(&self, events: &[LedgerEvent]) {
        for event in events {
            self.publish(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Transaction-scoped event buffer.
///
/// Events recorded here are published only if the owning storage
/// transaction commits; dropping the outbox suppresses them.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<LedgerEvent>,
}

impl Outbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages an event for publication on commit.
    pub fn record(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Consumes the outbox, yielding the staged events in order.
    #[must_use]
    pub fn into_events(self) -> Vec<LedgerEvent> {
        self.events
    }

    /// Number of staged events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing has been staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
