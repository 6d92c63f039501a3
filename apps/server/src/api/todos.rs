//! Todo item API endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use entities::{ListId, TodoId, TodoItem, TodoStatus};
use serde::{Deserialize, Serialize};
use todo_store::{validate_item_name, StoreProvider, TodoStore};

use super::{ApiJson, ApiPath, MessageResponse, NameRequest};
use crate::error::{ServerError, ServerResult};
use crate::middleware::session::SessionId;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    /// `"complete"` or `"incomplete"`.
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub message: String,
    pub todo: TodoItem,
}

/// Adds an item to a list.
pub async fn create_todo<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
    Extension(session): Extension<SessionId>,
    ApiPath(list_id): ApiPath<ListId>,
    ApiJson(request): ApiJson<NameRequest>,
) -> ServerResult<(StatusCode, Json<TodoResponse>)> {
    let name = request.trimmed();
    let store = state.store(&session).await;

    let list = store
        .find_list(list_id)
        .await?
        .ok_or_else(ServerError::list_not_found)?;
    validate_item_name(&list.todos, name)?;

    let todo = store.add_todo_to_list(list_id, name).await?;
    tracing::info!(list_id, todo_id = todo.id, "Added todo");

    Ok((
        StatusCode::CREATED,
        Json(TodoResponse {
            message: "The item has been added.".to_string(),
            todo,
        }),
    ))
}

/// Marks an item complete or incomplete.
pub async fn update_todo<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
    Extension(session): Extension<SessionId>,
    ApiPath((list_id, todo_id)): ApiPath<(ListId, TodoId)>,
    ApiJson(request): ApiJson<UpdateTodoRequest>,
) -> ServerResult<Json<TodoResponse>> {
    let status = TodoStatus::parse(request.status.trim()).ok_or_else(|| {
        ServerError::InvalidRequest(format!("Unknown todo status: {}", request.status))
    })?;

    let store = state.store(&session).await;
    store.update_todo_status(list_id, todo_id, status).await?;
    tracing::info!(list_id, todo_id, status = status.as_str(), "Updated todo");

    let todo = store
        .find_todo_from_list(list_id, todo_id)
        .await?
        .ok_or_else(ServerError::todo_not_found)?;

    Ok(Json(TodoResponse {
        message: "The todo item has been updated.".to_string(),
        todo,
    }))
}

/// Deletes an item from a list.
pub async fn delete_todo<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
    Extension(session): Extension<SessionId>,
    ApiPath((list_id, todo_id)): ApiPath<(ListId, TodoId)>,
) -> ServerResult<Json<MessageResponse>> {
    let store = state.store(&session).await;

    if !store.delete_todo_from_list(list_id, todo_id).await? {
        if store.find_list(list_id).await?.is_none() {
            return Err(ServerError::list_not_found());
        }
        return Err(ServerError::todo_not_found());
    }
    tracing::info!(list_id, todo_id, "Deleted todo");

    Ok(MessageResponse::new("The todo item has been deleted."))
}

/// Marks every item of a list complete.
pub async fn complete_all<P: StoreProvider + 'static>(
    State(state): State<SharedState<P>>,
    Extension(session): Extension<SessionId>,
    ApiPath(list_id): ApiPath<ListId>,
) -> ServerResult<Json<MessageResponse>> {
    let store = state.store(&session).await;
    store.complete_all_todos(list_id).await?;
    tracing::info!(list_id, "Completed all todos");

    Ok(MessageResponse::new("The todo items have been updated."))
}
