use api_types::ErrorBody;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use server::{ServerState, router, run_with_listener};

mod budget;
mod server;
mod user;

pub mod types {
    pub mod budget {
        pub use api_types::budget::{
            DayGroup, Entry, EntryNew, MonthGroup, Transaction, TransactionKind, TransactionNew,
        };
    }

    pub mod user {
        pub use api_types::user::{Authenticated, Login, Register};
    }

    pub use api_types::{ErrorBody, Health};
}

pub enum ServerError {
    Engine(EngineError),
    BadRequest(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidInput(_)
        | EngineError::InvalidIndex(_)
        | EngineError::ExistingKey(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Corrupted(_) | EngineError::PasswordHash(_) | EngineError::Unavailable(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Unavailable(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        err @ (EngineError::Corrupted(_) | EngineError::PasswordHash(_)) => {
            tracing::error!("{err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, error) = match self {
            ServerError::Engine(err) => {
                let kind = err.kind();
                (status_for_engine_error(&err), kind, message_for_engine_error(err))
            }
            ServerError::BadRequest(err) => (StatusCode::BAD_REQUEST, "invalid_input", err),
        };

        if status.is_client_error() {
            tracing::info!(%status, kind, "request rejected: {error}");
        }

        let body = ErrorBody {
            kind: kind.to_string(),
            error,
        };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}
