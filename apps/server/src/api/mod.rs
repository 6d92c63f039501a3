//! API endpoints.

mod extract;
pub mod lists;
pub mod login;
pub mod todos;

use axum::{
    extract::State,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use todo_store::StoreProvider;

use crate::state::SharedState;

pub use extract::{ApiJson, ApiPath};

/// Request body carrying a list, item or visitor name.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

impl NameRequest {
    /// Returns the name without surrounding whitespace.
    pub fn trimmed(&self) -> &str {
        self.name.trim()
    }
}

/// Response carrying only a flash message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Creates the API router with all endpoints.
pub fn create_router<P: StoreProvider + 'static>() -> Router<SharedState<P>> {
    Router::new()
        // List endpoints
        .route("/api/lists", get(lists::list_lists::<P>).post(lists::create_list::<P>))
        .route(
            "/api/lists/{list_id}",
            get(lists::get_list::<P>)
                .patch(lists::rename_list::<P>)
                .delete(lists::delete_list::<P>),
        )
        .route("/api/lists/{list_id}/complete_all", post(todos::complete_all::<P>))
        // Todo endpoints
        .route("/api/lists/{list_id}/todos", post(todos::create_todo::<P>))
        .route(
            "/api/lists/{list_id}/todos/{todo_id}",
            patch(todos::update_todo::<P>).delete(todos::delete_todo::<P>),
        )
        // Login endpoints
        .route("/api/login", get(login::current_user::<P>).post(login::log_in::<P>))
        // Health check
        .route("/health", get(health_check::<P>))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: String,
}

/// Health check endpoint.
async fn health_check<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        storage: state.config.storage.to_string(),
    })
}
