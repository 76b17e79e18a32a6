//! Debt repository.
//!
//! Thin by design: debts own their line items and a pointer to the
//! payment settling them. Status is projected through that payment, never
//! stored, so there is exactly one status state machine in the system.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use velka_core::debt::DebtError;
use velka_core::payment::{PaymentService, PaymentStatus};

use crate::entities::{debt_components, debts, members, payment_events, payments};

/// Input for one debt line item.
#[derive(Debug, Clone)]
pub struct DebtComponentInput {
    /// Line item name.
    pub name: String,
    /// Line item amount.
    pub amount: Decimal,
}

/// Input for creating a debt.
#[derive(Debug, Clone)]
pub struct CreateDebtInput {
    /// The member who owes.
    pub member_id: Uuid,
    /// Human-readable title.
    pub title: String,
    /// Line items; must not be empty.
    pub components: Vec<DebtComponentInput>,
    /// Settling payment, when one already exists.
    pub payment_id: Option<Uuid>,
}

/// A debt with its line items.
#[derive(Debug, Clone)]
pub struct DebtWithComponents {
    /// The debt row.
    pub debt: debts::Model,
    /// Its line items.
    pub components: Vec<debt_components::Model>,
    /// Face value: the sum of component amounts.
    pub face_amount: Decimal,
}

/// Debt repository.
#[derive(Debug, Clone)]
pub struct DebtRepository {
    db: DatabaseConnection,
}

impl DebtRepository {
    /// Creates a new debt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a member.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub async fn create_member(
        &self,
        name: &str,
        email: Option<&str>,
    ) -> Result<members::Model, DebtError> {
        members::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email.map(str::to_string)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)
    }

    /// Creates a debt with its line items.
    ///
    /// # Errors
    ///
    /// Fails if the member (or the referenced payment) does not exist, or
    /// the debt has no components.
    pub async fn create_debt(&self, input: CreateDebtInput) -> Result<DebtWithComponents, DebtError> {
        if input.components.is_empty() {
            return Err(DebtError::NoComponents);
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        members::Entity::find_by_id(input.member_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(DebtError::MemberNotFound(input.member_id))?;

        if let Some(payment_id) = input.payment_id {
            payments::Entity::find_by_id(payment_id)
                .one(&txn)
                .await
                .map_err(db_err)?
                .ok_or(DebtError::PaymentNotFound(payment_id))?;
        }

        let debt = debts::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(input.member_id),
            payment_id: Set(input.payment_id),
            title: Set(input.title.clone()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let mut components = Vec::with_capacity(input.components.len());
        for component in &input.components {
            let row = debt_components::ActiveModel {
                id: Set(Uuid::new_v4()),
                debt_id: Set(debt.id),
                name: Set(component.name.clone()),
                amount: Set(component.amount),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
            components.push(row);
        }

        txn.commit().await.map_err(db_err)?;

        let face_amount = components.iter().map(|c| c.amount).sum();
        Ok(DebtWithComponents {
            debt,
            components,
            face_amount,
        })
    }

    /// Points a debt at the payment settling it.
    ///
    /// # Errors
    ///
    /// Fails if the debt or payment does not exist.
    pub async fn assign_payment(
        &self,
        debt_id: Uuid,
        payment_id: Uuid,
    ) -> Result<debts::Model, DebtError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let debt = debts::Entity::find_by_id(debt_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(DebtError::NotFound(debt_id))?;

        payments::Entity::find_by_id(payment_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(DebtError::PaymentNotFound(payment_id))?;

        let mut active: debts::ActiveModel = debt.into();
        active.payment_id = Set(Some(payment_id));
        let debt = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(debt)
    }

    /// Loads a debt with its line items.
    ///
    /// # Errors
    ///
    /// Fails if the debt does not exist.
    pub async fn get_debt(&self, debt_id: Uuid) -> Result<DebtWithComponents, DebtError> {
        let debt = debts::Entity::find_by_id(debt_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(DebtError::NotFound(debt_id))?;

        let components = debt_components::Entity::find()
            .filter(debt_components::Column::DebtId.eq(debt_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let face_amount = components.iter().map(|c| c.amount).sum();
        Ok(DebtWithComponents {
            debt,
            components,
            face_amount,
        })
    }

    /// Projects a debt's status through its settling payment.
    ///
    /// A debt with no payment is unpaid by definition.
    ///
    /// # Errors
    ///
    /// Fails if the debt does not exist.
    pub async fn get_debt_status(&self, debt_id: Uuid) -> Result<PaymentStatus, DebtError> {
        let debt = debts::Entity::find_by_id(debt_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(DebtError::NotFound(debt_id))?;

        let Some(payment_id) = debt.payment_id else {
            return Ok(velka_core::debt::debt_status(None));
        };

        let payment = payments::Entity::find_by_id(payment_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(DebtError::PaymentNotFound(payment_id))?;

        let events = payment_events::Entity::find()
            .filter(payment_events::Column::PaymentId.eq(payment_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let balance: Decimal = events.iter().map(|e| e.amount).sum();

        Ok(velka_core::debt::debt_status(Some(
            PaymentService::derive_status(balance, payment.face_amount),
        )))
    }
}

fn db_err(e: DbErr) -> DebtError {
    DebtError::Database(e.to_string())
}
