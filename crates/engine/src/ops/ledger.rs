use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    Entry, EntryRef, EngineError, Ledger, ResultEngine, Transaction, TransactionKind, entries,
    transactions, users,
};

use super::{Engine, with_tx};

impl Engine {
    /// Return the user's entries in ledger order.
    ///
    /// A user who never added funds has an empty ledger, not an error.
    pub async fn entries(&self, user_id: &str) -> ResultEngine<Vec<Entry>> {
        Ok(self.load_ledger(user_id).await?.into_entries())
    }

    /// Load the whole ledger together with its storage version.
    pub async fn load_ledger(&self, user_id: &str) -> ResultEngine<Ledger> {
        with_tx!(self, |db_tx| { self.read_ledger(&db_tx, user_id).await })
    }

    /// Replace the stored ledger with `ledger`.
    ///
    /// Fails with [`EngineError::Conflict`] when the stored ledger is no longer
    /// at the version `ledger` was loaded at; nothing is written in that case.
    /// On success the ledger's version is advanced.
    pub async fn save_ledger(&self, user_id: &str, ledger: &mut Ledger) -> ResultEngine<()> {
        let _writer = self.writer(user_id).await;
        let version = with_tx!(self, |db_tx| {
            self.write_ledger(&db_tx, user_id, ledger).await
        })?;
        ledger.set_version(version);
        Ok(())
    }

    /// Append an entry funded with `value`, dated `date`.
    pub async fn add_entry(
        &self,
        user_id: &str,
        value: i64,
        date: NaiveDate,
    ) -> ResultEngine<Vec<Entry>> {
        let entries = self
            .mutate_ledger(user_id, |ledger| {
                ledger.add_entry(value, date)?;
                Ok(())
            })
            .await?;
        tracing::info!(user_id, value, %date, "budget entry added");
        Ok(entries)
    }

    /// Apply an `add` or `remove` transaction to an entry.
    pub async fn add_transaction(
        &self,
        user_id: &str,
        entry: EntryRef,
        kind: TransactionKind,
        label: &str,
        cost: i64,
    ) -> ResultEngine<Vec<Entry>> {
        let mut transaction_id = 0;
        let entries = self
            .mutate_ledger(user_id, |ledger| {
                transaction_id = ledger.add_transaction(entry, kind, label, cost)?;
                Ok(())
            })
            .await?;
        tracing::info!(
            user_id,
            %entry,
            transaction_id,
            kind = kind.as_str(),
            cost,
            "transaction added"
        );
        Ok(entries)
    }

    /// Remove an entry and all of its transactions.
    pub async fn delete_entry(&self, user_id: &str, entry: EntryRef) -> ResultEngine<Vec<Entry>> {
        let entries = self
            .mutate_ledger(user_id, |ledger| {
                ledger.delete_entry(entry)?;
                Ok(())
            })
            .await?;
        tracing::info!(user_id, %entry, "budget entry deleted");
        Ok(entries)
    }

    /// Remove a transaction, reverting its effect on the entry value.
    pub async fn delete_transaction(
        &self,
        user_id: &str,
        entry: EntryRef,
        transaction_id: i64,
    ) -> ResultEngine<Vec<Entry>> {
        let entries = self
            .mutate_ledger(user_id, |ledger| {
                ledger.delete_transaction(entry, transaction_id)?;
                Ok(())
            })
            .await?;
        tracing::info!(user_id, %entry, transaction_id, "transaction deleted");
        Ok(entries)
    }

    /// Load, change and store a ledger as one unit.
    ///
    /// `mutate` works on an in-memory copy; if it fails nothing is written.
    async fn mutate_ledger<F>(&self, user_id: &str, mutate: F) -> ResultEngine<Vec<Entry>>
    where
        F: FnOnce(&mut Ledger) -> ResultEngine<()>,
    {
        let _writer = self.writer(user_id).await;
        with_tx!(self, |db_tx| {
            let mut ledger = self.read_ledger(&db_tx, user_id).await?;
            mutate(&mut ledger)?;
            self.write_ledger(&db_tx, user_id, &ledger).await?;
            Ok(ledger.into_entries())
        })
    }

    async fn read_ledger<C: ConnectionTrait>(&self, db: &C, user_id: &str) -> ResultEngine<Ledger> {
        let user = self.require_user(db, user_id).await?;

        let entry_models = entries::Entity::find()
            .filter(entries::Column::UserId.eq(user_id))
            .order_by_asc(entries::Column::Position)
            .all(db)
            .await?;

        let mut by_entry: HashMap<String, Vec<Transaction>> = HashMap::new();
        if !entry_models.is_empty() {
            let entry_ids: Vec<String> = entry_models.iter().map(|m| m.id.clone()).collect();
            let tx_models = transactions::Entity::find()
                .filter(transactions::Column::EntryId.is_in(entry_ids))
                .order_by_asc(transactions::Column::EntryId)
                .order_by_asc(transactions::Column::Id)
                .all(db)
                .await?;
            for model in tx_models {
                by_entry
                    .entry(model.entry_id.clone())
                    .or_default()
                    .push(Transaction::try_from(model)?);
            }
        }

        let entries = entry_models
            .into_iter()
            .map(|model| {
                let txs = by_entry.remove(&model.id).unwrap_or_default();
                entries::into_entry(model, txs)
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Ledger::from_parts(entries, user.ledger_version))
    }

    /// Rewrite every row of the ledger and return the new version.
    async fn write_ledger(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        ledger: &Ledger,
    ) -> ResultEngine<i64> {
        ledger.verify()?;

        let loaded_version = ledger.version();
        let version = loaded_version + 1;
        let bumped = users::Entity::update_many()
            .col_expr(users::Column::LedgerVersion, Expr::value(version))
            .filter(users::Column::Id.eq(user_id))
            .filter(users::Column::LedgerVersion.eq(loaded_version))
            .exec(db)
            .await?;
        if bumped.rows_affected == 0 {
            self.require_user(db, user_id).await?;
            tracing::warn!(user_id, loaded_version, "stale ledger save rejected");
            return Err(EngineError::Conflict(format!(
                "ledger of user {user_id} moved past version {loaded_version}"
            )));
        }

        let stored_ids: Vec<String> = entries::Entity::find()
            .filter(entries::Column::UserId.eq(user_id))
            .all(db)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        if !stored_ids.is_empty() {
            transactions::Entity::delete_many()
                .filter(transactions::Column::EntryId.is_in(stored_ids))
                .exec(db)
                .await?;
            entries::Entity::delete_many()
                .filter(entries::Column::UserId.eq(user_id))
                .exec(db)
                .await?;
        }

        let entry_rows: Vec<entries::ActiveModel> = (0_i64..)
            .zip(ledger.entries())
            .map(|(position, entry)| entries::ActiveModel::from_entry(entry, user_id, position))
            .collect();
        let tx_rows: Vec<transactions::ActiveModel> = ledger
            .entries()
            .iter()
            .flat_map(|entry| {
                let entry_id = entry.id.to_string();
                entry
                    .transactions()
                    .iter()
                    .map(move |tx| transactions::ActiveModel::from_transaction(tx, &entry_id))
            })
            .collect();

        if !entry_rows.is_empty() {
            entries::Entity::insert_many(entry_rows)
                .exec_without_returning(db)
                .await?;
        }
        if !tx_rows.is_empty() {
            transactions::Entity::insert_many(tx_rows)
                .exec_without_returning(db)
                .await?;
        }

        Ok(version)
    }
}
