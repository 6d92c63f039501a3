//! Todo list API endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use entities::{ordered_by_status, Completable, ListId, ListSummary, TodoItem, TodoList};
use serde::Serialize;
use todo_store::{validate_list_name, StoreProvider, TodoStore};

use super::{ApiJson, ApiPath, MessageResponse, NameRequest};
use crate::error::{ServerError, ServerResult};
use crate::middleware::session::SessionId;
use crate::state::SharedState;

/// A list as shown on the index page.
#[derive(Debug, Serialize)]
pub struct ListOverview {
    pub id: ListId,
    pub name: String,
    pub todos_count: usize,
    pub incomplete_count: usize,
    pub complete: bool,
}

impl From<&ListSummary> for ListOverview {
    fn from(summary: &ListSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name.clone(),
            todos_count: summary.todos_count,
            incomplete_count: summary.incomplete_count,
            complete: summary.is_complete(),
        }
    }
}

/// A list with its items, incomplete items first.
#[derive(Debug, Serialize)]
pub struct ListDetail {
    pub id: ListId,
    pub name: String,
    pub complete: bool,
    pub todos_count: usize,
    pub incomplete_count: usize,
    pub todos: Vec<TodoItem>,
}

impl From<&TodoList> for ListDetail {
    fn from(list: &TodoList) -> Self {
        Self {
            id: list.id,
            name: list.name.clone(),
            complete: list.is_complete(),
            todos_count: list.todos_count(),
            incomplete_count: list.incomplete_count(),
            todos: list.ordered_todos().into_iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListsResponse {
    pub lists: Vec<ListOverview>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub list: ListDetail,
}

/// Lists every todo list, incomplete lists first.
pub async fn list_lists<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
    Extension(session): Extension<SessionId>,
) -> ServerResult<Json<ListsResponse>> {
    let store = state.store(&session).await;
    let summaries = store.list_summaries().await?;

    Ok(Json(ListsResponse {
        lists: ordered_by_status(&summaries)
            .into_iter()
            .map(ListOverview::from)
            .collect(),
    }))
}

/// Creates a new list.
pub async fn create_list<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
    Extension(session): Extension<SessionId>,
    ApiJson(request): ApiJson<NameRequest>,
) -> ServerResult<(StatusCode, Json<ListResponse>)> {
    let name = request.trimmed();
    let store = state.store(&session).await;

    let summaries = store.list_summaries().await?;
    validate_list_name(&summaries, name, None)?;

    let list = store.add_list(name).await?;
    tracing::info!(list_id = list.id, "Created list");

    Ok((
        StatusCode::CREATED,
        Json(ListResponse {
            message: Some("The list has been created.".to_string()),
            list: ListDetail::from(&list),
        }),
    ))
}

/// Gets a list with its items.
pub async fn get_list<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
    Extension(session): Extension<SessionId>,
    ApiPath(list_id): ApiPath<ListId>,
) -> ServerResult<Json<ListResponse>> {
    let store = state.store(&session).await;
    let list = store
        .find_list(list_id)
        .await?
        .ok_or_else(ServerError::list_not_found)?;

    Ok(Json(ListResponse {
        message: None,
        list: ListDetail::from(&list),
    }))
}

/// Renames a list.
pub async fn rename_list<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
    Extension(session): Extension<SessionId>,
    ApiPath(list_id): ApiPath<ListId>,
    ApiJson(request): ApiJson<NameRequest>,
) -> ServerResult<Json<ListResponse>> {
    let name = request.trimmed();
    let store = state.store(&session).await;

    if store.find_list(list_id).await?.is_none() {
        return Err(ServerError::list_not_found());
    }

    let summaries = store.list_summaries().await?;
    validate_list_name(&summaries, name, Some(list_id))?;

    store.update_list_name(list_id, name).await?;
    tracing::info!(list_id, "Renamed list");

    let list = store
        .find_list(list_id)
        .await?
        .ok_or_else(ServerError::list_not_found)?;

    Ok(Json(ListResponse {
        message: Some("The list has been updated.".to_string()),
        list: ListDetail::from(&list),
    }))
}

/// Deletes a list and its items.
pub async fn delete_list<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
    Extension(session): Extension<SessionId>,
    ApiPath(list_id): ApiPath<ListId>,
) -> ServerResult<Json<MessageResponse>> {
    let store = state.store(&session).await;

    if !store.delete_list(list_id).await? {
        return Err(ServerError::list_not_found());
    }
    tracing::info!(list_id, "Deleted list");

    Ok(MessageResponse::new("The list has been deleted."))
}
