//! Transactions table.
//!
//! Keyed by `(entry_id, id)`: transaction ids are only unique inside their
//! entry.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, Transaction, TransactionKind};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub entry_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub kind: String,
    pub label: String,
    pub cost: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entries::Entity",
        from = "Column::EntryId",
        to = "super::entries::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_transaction(tx: &Transaction, entry_id: &str) -> Self {
        Self {
            entry_id: ActiveValue::Set(entry_id.to_string()),
            id: ActiveValue::Set(tx.id),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            label: ActiveValue::Set(tx.label.clone()),
            cost: ActiveValue::Set(tx.cost),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = TransactionKind::try_from(model.kind.as_str()).map_err(|_| {
            EngineError::Corrupted(format!(
                "transaction {} of entry {} has kind {}",
                model.id, model.entry_id, model.kind
            ))
        })?;
        Ok(Self {
            id: model.id,
            kind,
            label: model.label,
            cost: model.cost,
        })
    }
}
