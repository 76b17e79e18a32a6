//! `SeaORM` Entity for the payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payment_type: String,
    pub title: String,
    pub message: String,
    pub face_amount: Decimal,
    pub data: Json,
    pub reference_number: Option<String>,
    pub credited: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment_events::Entity")]
    PaymentEvents,
    #[sea_orm(has_many = "super::debts::Entity")]
    Debts,
}

impl Related<super::payment_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentEvents.def()
    }
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
