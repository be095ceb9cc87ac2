//! Budget ledger engine.
//!
//! The engine owns every user's ledger: an ordered list of entries, each with
//! a balance and the transactions applied to it. Ledgers are loaded, changed
//! in memory and written back as a whole inside one database transaction.

pub use error::EngineError;
pub use grouping::{DayGroup, MonthGroup, group_by_month, month_key};
pub use ledger::{Entry, EntryRef, Ledger, Transaction, TransactionKind};
pub use ops::{Engine, EngineBuilder};
pub use users::User;

mod entries;
mod error;
mod grouping;
mod ledger;
mod ops;
mod password;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
