//! Account endpoints: registration and login.

use api_types::user::{Authenticated, Login, Register};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

fn success(user_id: String) -> Authenticated {
    Authenticated {
        status: "Success".to_string(),
        user_id,
    }
}

/// Handle requests for creating a new account
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<Register>, JsonRejection>,
) -> Result<(StatusCode, Json<Authenticated>), ServerError> {
    let Json(payload) = payload?;
    let user_id = state
        .engine
        .register_user(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(success(user_id))))
}

/// Handle login requests, answering with the user id to use on budget routes
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<Login>, JsonRejection>,
) -> Result<Json<Authenticated>, ServerError> {
    let Json(payload) = payload?;
    tracing::info!(email = %payload.email, "login attempt");
    let user_id = state
        .engine
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(success(user_id)))
}
