//! Sample todo application served by the test server.

pub mod controller;
pub mod dto;
pub mod error;

use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub http: reqwest::Client,
    pub upstream_url: String,
}

impl AppState {
    pub fn new(db: DatabaseConnection, upstream_url: impl Into<String>) -> Self {
        Self {
            db,
            http: reqwest::Client::new(),
            upstream_url: upstream_url.into(),
        }
    }
}

/// Build the application router.
///
/// # Registered Endpoints
/// - `GET /api/health` - Liveness check
/// - `GET /api/todos` / `POST /api/todos` - List and create todos
/// - `GET /api/todos/{id}` / `DELETE /api/todos/{id}` - Fetch and delete a todo
/// - `POST /api/todos/{id}/complete` - Mark a todo done, notifying in the background
/// - `GET /api/quote` - Proxy to the upstream quote service
/// - `GET /api/whoami` - Requires the test bearer token
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(controller::health))
        .route(
            "/api/todos",
            get(controller::list_todos).post(controller::create_todo),
        )
        .route(
            "/api/todos/{id}",
            get(controller::get_todo).delete(controller::delete_todo),
        )
        .route("/api/todos/{id}/complete", post(controller::complete_todo))
        .route("/api/quote", get(controller::get_quote))
        .route("/api/whoami", get(controller::whoami))
        .with_state(state)
}
