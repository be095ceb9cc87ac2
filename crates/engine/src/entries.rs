//! Entries table.
//!
//! One row per ledger entry; `position` keeps the ledger order.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{Entry, EngineError, ResultEngine, Transaction};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub position: i64,
    pub value: i64,
    pub opening_value: i64,
    pub date: NaiveDate,
    pub next_transaction_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_entry(entry: &Entry, user_id: &str, position: i64) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            position: ActiveValue::Set(position),
            value: ActiveValue::Set(entry.value()),
            opening_value: ActiveValue::Set(entry.opening_value()),
            date: ActiveValue::Set(entry.date),
            next_transaction_id: ActiveValue::Set(entry.next_transaction_id()),
        }
    }
}

/// Rebuild an entry from its row and its (id ordered) transactions.
pub(crate) fn into_entry(model: Model, transactions: Vec<Transaction>) -> ResultEngine<Entry> {
    let id = Uuid::parse_str(&model.id)
        .map_err(|_| EngineError::Corrupted(format!("invalid entry id {}", model.id)))?;
    Entry::from_parts(
        id,
        model.date,
        model.value,
        model.opening_value,
        model.next_transaction_id,
        transactions,
    )
}
