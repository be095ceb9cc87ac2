//! Ledger primitives.
//!
//! A [`Ledger`] is the ordered list of a user's entries. Every change to an
//! entry goes through it, so an entry's value always equals its opening value
//! plus the signed costs of the transactions it still holds.

use core::fmt;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{ensure_positive, normalize_required_text},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionKind {
    Add,
    Remove,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    /// Effect of `cost` on the owning entry's value.
    pub fn signed(self, cost: i64) -> i64 {
        match self {
            Self::Add => cost,
            Self::Remove => -cost,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Unique inside the owning entry only.
    pub id: i64,
    pub kind: TransactionKind,
    pub label: String,
    pub cost: i64,
}

/// One funded balance line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub id: Uuid,
    pub date: NaiveDate,
    value: i64,
    opening_value: i64,
    transactions: Vec<Transaction>,
    next_transaction_id: i64,
}

impl Entry {
    fn new(value: i64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            value,
            opening_value: value,
            transactions: Vec::new(),
            next_transaction_id: 1,
        }
    }

    /// Rebuild an entry from stored fields, rejecting data that breaks the
    /// balance or id rules.
    pub(crate) fn from_parts(
        id: Uuid,
        date: NaiveDate,
        value: i64,
        opening_value: i64,
        next_transaction_id: i64,
        transactions: Vec<Transaction>,
    ) -> ResultEngine<Self> {
        let ids_increase = transactions.windows(2).all(|pair| pair[0].id < pair[1].id);
        let max_id = transactions.iter().map(|tx| tx.id).max().unwrap_or(0);
        if !ids_increase || next_transaction_id <= max_id {
            return Err(EngineError::Corrupted(format!(
                "transaction ids of entry {id} are out of order"
            )));
        }

        let entry = Self {
            id,
            date,
            value,
            opening_value,
            transactions,
            next_transaction_id,
        };
        entry.ensure_balanced()?;
        Ok(entry)
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Value the entry was created with.
    pub fn opening_value(&self) -> i64 {
        self.opening_value
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, transaction_id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == transaction_id)
    }

    /// Id the next transaction applied to this entry will receive.
    pub fn next_transaction_id(&self) -> i64 {
        self.next_transaction_id
    }

    /// Value implied by the opening value and the transactions still present.
    pub fn expected_value(&self) -> Option<i64> {
        self.transactions
            .iter()
            .try_fold(self.opening_value, |acc, tx| {
                acc.checked_add(tx.kind.signed(tx.cost))
            })
    }

    pub fn is_balanced(&self) -> bool {
        self.expected_value() == Some(self.value)
    }

    fn ensure_balanced(&self) -> ResultEngine<()> {
        if !self.is_balanced() {
            return Err(EngineError::Corrupted(format!(
                "entry {} holds {} but its transactions imply {:?}",
                self.id,
                self.value,
                self.expected_value()
            )));
        }
        Ok(())
    }

    fn push_transaction(
        &mut self,
        kind: TransactionKind,
        label: String,
        cost: i64,
    ) -> ResultEngine<i64> {
        let value = self
            .value
            .checked_add(kind.signed(cost))
            .ok_or_else(|| EngineError::InvalidInput("entry value out of range".to_string()))?;
        let id = self.next_transaction_id;
        let next_id = id
            .checked_add(1)
            .ok_or_else(|| EngineError::InvalidInput("transaction ids exhausted".to_string()))?;

        self.transactions.push(Transaction {
            id,
            kind,
            label,
            cost,
        });
        self.value = value;
        self.next_transaction_id = next_id;
        Ok(id)
    }

    fn remove_transaction(&mut self, transaction_id: i64) -> ResultEngine<Transaction> {
        let position = self
            .transactions
            .iter()
            .position(|tx| tx.id == transaction_id)
            .ok_or_else(|| EngineError::NotFound(format!("transaction {transaction_id}")))?;
        let tx = &self.transactions[position];
        let value = self
            .value
            .checked_sub(tx.kind.signed(tx.cost))
            .ok_or_else(|| EngineError::InvalidInput("entry value out of range".to_string()))?;

        self.value = value;
        Ok(self.transactions.remove(position))
    }
}

/// Addresses an entry either by its position in the ledger or by its id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryRef {
    Index(i64),
    Id(Uuid),
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// The ordered list of a user's entries, as loaded from storage.
///
/// `version` is the storage version the ledger was loaded at; saving checks it
/// so that a stale copy cannot overwrite newer data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<Entry>,
    version: i64,
}

impl Ledger {
    pub(crate) fn from_parts(entries: Vec<Entry>, version: i64) -> Self {
        Self { entries, version }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    pub fn entry(&self, entry: EntryRef) -> ResultEngine<&Entry> {
        let position = self.position(entry)?;
        Ok(&self.entries[position])
    }

    fn position(&self, entry: EntryRef) -> ResultEngine<usize> {
        match entry {
            EntryRef::Index(index) => usize::try_from(index)
                .ok()
                .filter(|position| *position < self.entries.len())
                .ok_or_else(|| {
                    EngineError::InvalidIndex(format!(
                        "{index} is outside 0..{}",
                        self.entries.len()
                    ))
                }),
            EntryRef::Id(id) => self
                .entries
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| EngineError::NotFound(format!("entry {id}"))),
        }
    }

    /// Append a new entry holding `value`, dated `date`.
    pub fn add_entry(&mut self, value: i64, date: NaiveDate) -> ResultEngine<Uuid> {
        ensure_positive(value, "value")?;
        let entry = Entry::new(value, date);
        let id = entry.id;
        self.entries.push(entry);
        Ok(id)
    }

    /// Apply a transaction to an entry and return the id it received.
    pub fn add_transaction(
        &mut self,
        entry: EntryRef,
        kind: TransactionKind,
        label: &str,
        cost: i64,
    ) -> ResultEngine<i64> {
        let label = normalize_required_text(label, "label")?;
        ensure_positive(cost, "cost")?;
        let position = self.position(entry)?;
        self.entries[position].push_transaction(kind, label, cost)
    }

    /// Remove an entry together with its transactions.
    pub fn delete_entry(&mut self, entry: EntryRef) -> ResultEngine<Entry> {
        let position = self.position(entry)?;
        Ok(self.entries.remove(position))
    }

    /// Remove a transaction and revert its effect on the entry value.
    pub fn delete_transaction(
        &mut self,
        entry: EntryRef,
        transaction_id: i64,
    ) -> ResultEngine<Transaction> {
        let position = self.position(entry)?;
        self.entries[position].remove_transaction(transaction_id)
    }

    /// Check every entry against its transactions.
    pub fn verify(&self) -> ResultEngine<()> {
        self.entries.iter().try_for_each(Entry::ensure_balanced)
    }
}
