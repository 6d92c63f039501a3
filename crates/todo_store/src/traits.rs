//! Todo store trait definitions.

use async_trait::async_trait;
use entities::{ListId, ListSummary, LoginRecord, TodoId, TodoItem, TodoList, TodoStatus};

use crate::TodoStoreResult;

/// Persistence contract shared by the session and database backends.
///
/// Operations addressing a list or item that does not exist report
/// [`TodoStoreError::NotFound`](crate::TodoStoreError::NotFound); lookups
/// return `None` and deletes return `false` instead.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Lists every todo list with its items, in id order.
    async fn all_lists(&self) -> TodoStoreResult<Vec<TodoList>>;

    /// Lists every todo list with item counts instead of items.
    async fn list_summaries(&self) -> TodoStoreResult<Vec<ListSummary>> {
        let lists = self.all_lists().await?;
        Ok(lists.iter().map(TodoList::summary).collect())
    }

    /// Gets a todo list by ID.
    async fn find_list(&self, list_id: ListId) -> TodoStoreResult<Option<TodoList>>;

    /// Creates a new empty todo list.
    async fn add_list(&self, name: &str) -> TodoStoreResult<TodoList>;

    /// Deletes a todo list together with its items.
    ///
    /// Returns false if there was no such list.
    async fn delete_list(&self, list_id: ListId) -> TodoStoreResult<bool>;

    /// Renames a todo list.
    async fn update_list_name(&self, list_id: ListId, new_name: &str) -> TodoStoreResult<()>;

    /// Appends a new incomplete item to a list.
    async fn add_todo_to_list(&self, list_id: ListId, name: &str) -> TodoStoreResult<TodoItem>;

    /// Gets a single item of a list.
    async fn find_todo_from_list(
        &self,
        list_id: ListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<Option<TodoItem>>;

    /// Deletes an item from a list.
    ///
    /// Returns false if there was no such item.
    async fn delete_todo_from_list(&self, list_id: ListId, todo_id: TodoId)
        -> TodoStoreResult<bool>;

    /// Sets the status of a single item.
    async fn update_todo_status(
        &self,
        list_id: ListId,
        todo_id: TodoId,
        status: TodoStatus,
    ) -> TodoStoreResult<()>;

    /// Marks every item of a list as complete.
    async fn complete_all_todos(&self, list_id: ListId) -> TodoStoreResult<()>;
}

/// Storage for the anonymous login log.
#[async_trait]
pub trait LoginStore: Send + Sync {
    /// Records a login under the given name.
    async fn record_login(&self, name: &str) -> TodoStoreResult<LoginRecord>;

    /// Returns the most recent login, if any.
    async fn current_user(&self) -> TodoStoreResult<Option<LoginRecord>>;
}

/// Hands out the todo store that serves a given session.
///
/// The session backend keeps one store per session id; the database backend
/// serves every session from the same tables.
#[async_trait]
pub trait StoreProvider: Send + Sync {
    /// Store handle used for a single request.
    type Store: TodoStore + 'static;
    /// Login log shared by all sessions.
    type Logins: LoginStore + 'static;

    /// Returns the store for a session, creating it on first use.
    async fn store_for(&self, session_id: &str) -> Self::Store;

    /// Returns the login log.
    fn logins(&self) -> &Self::Logins;
}
