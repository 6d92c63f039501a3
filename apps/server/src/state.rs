//! Application state.

use std::sync::Arc;

use todo_store::StoreProvider;

use crate::config::Config;
use crate::middleware::session::SessionId;

/// Shared application state.
pub struct AppState<P: StoreProvider> {
    /// Server configuration.
    pub config: Config,
    /// Source of per-session todo stores.
    pub provider: P,
}

impl<P: StoreProvider> AppState<P> {
    /// Creates new application state.
    pub fn new(config: Config, provider: P) -> Self {
        Self { config, provider }
    }

    /// Returns the todo store serving a session.
    pub async fn store(&self, session: &SessionId) -> P::Store {
        self.provider.store_for(session.as_str()).await
    }
}

/// Type alias for shared state.
pub type SharedState<P> = Arc<AppState<P>>;

/// Creates shared state from config and store provider.
pub fn create_shared_state<P: StoreProvider>(config: Config, provider: P) -> SharedState<P> {
    Arc::new(AppState::new(config, provider))
}
