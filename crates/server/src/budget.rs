//! Budget API endpoints

use std::num::IntErrorKind;

use api_types::budget::{
    DayGroup, Entry, EntryNew, MonthGroup, Transaction, TransactionKind as ApiKind,
    TransactionNew,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use chrono::Utc;
use engine::{EngineError, EntryRef};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

type Entries = Result<Json<Vec<Entry>>, ServerError>;

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Add => ApiKind::Add,
        engine::TransactionKind::Remove => ApiKind::Remove,
    }
}

fn engine_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Add => engine::TransactionKind::Add,
        ApiKind::Remove => engine::TransactionKind::Remove,
    }
}

fn map_entry(entry: &engine::Entry) -> Entry {
    Entry {
        id: entry.id,
        value: entry.value(),
        date: entry.date,
        transactions: entry
            .transactions()
            .iter()
            .map(|tx| Transaction {
                id: tx.id,
                kind: map_kind(tx.kind),
                label: tx.label.clone(),
                cost: tx.cost,
            })
            .collect(),
    }
}

/// Read a positional entry reference from its path segment.
///
/// A number too large for `i64` is outside the ledger like any other
/// out-of-range index; anything else that is not a number is malformed input.
fn entry_index(raw: &str) -> Result<EntryRef, ServerError> {
    match raw.parse::<i64>() {
        Ok(index) => Ok(EntryRef::Index(index)),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(
                EngineError::InvalidIndex(format!("{raw} is not a ledger position")).into(),
            ),
            _ => Err(ServerError::BadRequest(format!(
                "invalid entry index {raw}: {err}"
            ))),
        },
    }
}

fn map_entries(entries: &[engine::Entry]) -> Json<Vec<Entry>> {
    Json(entries.iter().map(map_entry).collect())
}

/// Handle requests for listing the user's entries
pub async fn get(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
) -> Entries {
    let Path(user_id) = path?;
    let entries = state.engine.entries(&user_id).await?;
    Ok(map_entries(&entries))
}

/// Handle requests for the entries bucketed by month, then by day
pub async fn grouped(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<MonthGroup>>, ServerError> {
    let Path(user_id) = path?;
    let entries = state.engine.entries(&user_id).await?;

    let months = engine::group_by_month(&entries)
        .into_iter()
        .map(|month| MonthGroup {
            month: month.month,
            days: month
                .days
                .into_iter()
                .map(|day| DayGroup {
                    date: day.date,
                    entries: day.entries.into_iter().map(map_entry).collect(),
                })
                .collect(),
        })
        .collect();

    Ok(Json(months))
}

/// Handle requests for funding a new entry, dated today (UTC)
pub async fn entry_new(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<EntryNew>, JsonRejection>,
) -> Entries {
    let Path(user_id) = path?;
    let Json(payload) = payload?;
    let entries = state
        .engine
        .add_entry(&user_id, payload.value, Utc::now().date_naive())
        .await?;
    Ok(map_entries(&entries))
}

async fn add_transaction(
    state: &ServerState,
    user_id: &str,
    entry: EntryRef,
    payload: TransactionNew,
) -> Entries {
    let entries = state
        .engine
        .add_transaction(
            user_id,
            entry,
            engine_kind(payload.kind),
            &payload.label,
            payload.cost,
        )
        .await?;
    Ok(map_entries(&entries))
}

pub async fn transaction_new(
    State(state): State<ServerState>,
    path: Result<Path<(String, String)>, PathRejection>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Entries {
    let Path((user_id, raw_index)) = path?;
    let entry = entry_index(&raw_index)?;
    let Json(payload) = payload?;
    add_transaction(&state, &user_id, entry, payload).await
}

pub async fn transaction_new_by_id(
    State(state): State<ServerState>,
    path: Result<Path<(String, Uuid)>, PathRejection>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Entries {
    let Path((user_id, entry_id)) = path?;
    let Json(payload) = payload?;
    add_transaction(&state, &user_id, EntryRef::Id(entry_id), payload).await
}

pub async fn entry_delete(
    State(state): State<ServerState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Entries {
    let Path((user_id, raw_index)) = path?;
    let entry = entry_index(&raw_index)?;
    let entries = state
        .engine
        .delete_entry(&user_id, entry)
        .await?;
    Ok(map_entries(&entries))
}

pub async fn entry_delete_by_id(
    State(state): State<ServerState>,
    path: Result<Path<(String, Uuid)>, PathRejection>,
) -> Entries {
    let Path((user_id, entry_id)) = path?;
    let entries = state
        .engine
        .delete_entry(&user_id, EntryRef::Id(entry_id))
        .await?;
    Ok(map_entries(&entries))
}

pub async fn transaction_delete(
    State(state): State<ServerState>,
    path: Result<Path<(String, String, i64)>, PathRejection>,
) -> Entries {
    let Path((user_id, raw_index, transaction_id)) = path?;
    let entry = entry_index(&raw_index)?;
    let entries = state
        .engine
        .delete_transaction(&user_id, entry, transaction_id)
        .await?;
    Ok(map_entries(&entries))
}

pub async fn transaction_delete_by_id(
    State(state): State<ServerState>,
    path: Result<Path<(String, Uuid, i64)>, PathRejection>,
) -> Entries {
    let Path((user_id, entry_id, transaction_id)) = path?;
    let entries = state
        .engine
        .delete_transaction(&user_id, EntryRef::Id(entry_id), transaction_id)
        .await?;
    Ok(map_entries(&entries))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::*;

    #[test]
    fn entry_index_accepts_any_i64() {
        assert_eq!(entry_index("0").ok(), Some(EntryRef::Index(0)));
        assert_eq!(entry_index("-1").ok(), Some(EntryRef::Index(-1)));
    }

    #[test]
    fn overflowing_index_is_an_invalid_index() {
        for raw in ["99999999999999999999", "-99999999999999999999"] {
            let Err(ServerError::Engine(err)) = entry_index(raw) else {
                panic!("{raw} was not rejected as an engine error");
            };
            assert_eq!(err.kind(), "invalid_index");
        }
    }

    #[test]
    fn non_numeric_index_is_bad_input() {
        let Err(err) = entry_index("abc") else {
            panic!("abc accepted");
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
