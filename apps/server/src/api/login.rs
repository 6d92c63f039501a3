//! Anonymous login endpoints.

use axum::{extract::State, Json};
use entities::LoginRecord;
use serde::Serialize;
use todo_store::{LoginStore, StoreProvider};

use super::{ApiJson, NameRequest};
use crate::error::{ServerError, ServerResult};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct LoginView {
    pub name: String,
    pub logged_in_at: String,
}

impl From<&LoginRecord> for LoginView {
    fn from(record: &LoginRecord) -> Self {
        Self {
            name: record.name.clone(),
            logged_in_at: record.display_time(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: LoginView,
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user: Option<LoginView>,
}

/// Records a login under the given name.
pub async fn log_in<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
    ApiJson(request): ApiJson<NameRequest>,
) -> ServerResult<Json<LoginResponse>> {
    let name = request.trimmed();
    if name.is_empty() {
        return Err(ServerError::InvalidRequest("Name is required".to_string()));
    }

    let record = state.provider.logins().record_login(name).await?;
    tracing::info!(name = %record.name, "Recorded login");

    Ok(Json(LoginResponse {
        message: format!("Welcome, {}!", record.name),
        user: LoginView::from(&record),
    }))
}

/// Returns the most recent login.
pub async fn current_user<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
) -> ServerResult<Json<CurrentUserResponse>> {
    let record = state.provider.logins().current_user().await?;

    Ok(Json(CurrentUserResponse {
        user: record.as_ref().map(LoginView::from),
    }))
}
