use axum::{
    Json, Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};

use std::sync::Arc;

use crate::{budget, user};
use api_types::Health;
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Log every incoming request before it reaches its handler.
async fn log_request(request: Request, next: Next) -> Response {
    tracing::info!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "OK".to_string(),
    })
}

/// Build the application router around `engine`.
///
/// Budget routes exist twice: addressed by entry position (`entry`,
/// `transaction`) and by stable entry id (`entries`).
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/health", get(health))
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .route(
            "/budget/{user_id}",
            get(budget::get).post(budget::entry_new),
        )
        .route("/budget/{user_id}/grouped", get(budget::grouped))
        .route(
            "/budget/{user_id}/entry/{entry_index}",
            delete(budget::entry_delete),
        )
        .route(
            "/budget/{user_id}/transaction/{entry_index}",
            post(budget::transaction_new),
        )
        .route(
            "/budget/{user_id}/transaction/{entry_index}/{transaction_id}",
            delete(budget::transaction_delete),
        )
        .route(
            "/budget/{user_id}/entries/{entry_id}",
            delete(budget::entry_delete_by_id),
        )
        .route(
            "/budget/{user_id}/entries/{entry_id}/transactions",
            post(budget::transaction_new_by_id),
        )
        .route(
            "/budget/{user_id}/entries/{entry_id}/transactions/{transaction_id}",
            delete(budget::transaction_delete_by_id),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested, draining connections");
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await
}
