//! HTTP routing.
//!
//! # Responsibility
//! - Map the route table onto person and task use cases.
//! - Run blocking SQLite work off the async runtime.
//!
//! # Invariants
//! - Each request checks out one pooled connection and builds its
//!   repositories and services on it; nothing is cached across requests.

mod persons;
mod tasks;

use crate::error::ApiError;
use crate::request_log::log_requests;
use crate::state::AppState;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rusqlite::Connection;
use serde_json::{json, Value};

/// Builds the application router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/persons", post(persons::register))
        .route("/persons/search", post(persons::search))
        .route(
            "/persons/{id}",
            get(persons::get_person)
                .put(persons::update_person)
                .delete(persons::delete_person),
        )
        .route("/persons/{id}/tasks", post(tasks::create_task))
        .route("/persons/{id}/tasks/report", post(tasks::report))
        .route("/tasks/{id}", get(tasks::get_task))
        .route("/tasks/{id}/start", put(tasks::start_task))
        .route("/tasks/{id}/stop", put(tasks::stop_task))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Runs `op` on a pooled connection inside `spawn_blocking`.
pub(crate) async fn with_conn<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = state.pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = pool
            .get()
            .map_err(|err| ApiError::storage(format!("database connection unavailable: {err}")))?;
        op(&*conn)
    })
    .await
    .map_err(|err| ApiError::storage(format!("database task failed: {err}")))?
}
