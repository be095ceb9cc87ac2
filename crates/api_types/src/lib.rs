//! JSON bodies exchanged with the budget server.

use serde::{Deserialize, Serialize};

pub mod budget {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Add,
        Remove,
    }

    /// Body of `POST /budget/{userId}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryNew {
        pub value: i64,
    }

    /// Body of the add-transaction routes.
    ///
    /// `type` and `purchase` are accepted as older names of `kind` and `label`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        #[serde(alias = "type")]
        pub kind: TransactionKind,
        #[serde(alias = "purchase")]
        pub label: String,
        pub cost: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Transaction {
        /// Unique inside its entry only.
        pub id: i64,
        pub kind: TransactionKind,
        pub label: String,
        pub cost: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Entry {
        pub id: Uuid,
        pub value: i64,
        pub date: NaiveDate,
        pub transactions: Vec<Transaction>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DayGroup {
        pub date: NaiveDate,
        pub entries: Vec<Entry>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MonthGroup {
        /// `YYYY-MM`
        pub month: String,
        pub days: Vec<DayGroup>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    /// Answer to a successful register or login.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Authenticated {
        pub status: String,
        pub user_id: String,
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

/// Body of every error response.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine readable, e.g. `invalid_index`.
    pub kind: String,
    pub error: String,
}
