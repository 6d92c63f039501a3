//! Todo lists server
//!
//! A JSON API over named todo lists. Lists live either in a per-session
//! in-memory store or in PostgreSQL, selected at startup.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use axum::Router;
use todo_store::StoreProvider;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::session::SESSION_HEADER;
use crate::state::{create_shared_state, SharedState};

/// Creates the application router with all routes configured.
pub fn create_app<P: StoreProvider + 'static>(state: SharedState<P>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([axum::http::HeaderName::from_static(SESSION_HEADER)]);

    api::create_router()
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::session::session_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration and store provider.
pub fn create_state<P: StoreProvider>(config: Config, provider: P) -> SharedState<P> {
    create_shared_state(config, provider)
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
