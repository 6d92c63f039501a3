//! PostgreSQL todo store.
//!
//! Lists and items live in the `lists` and `todos` tables and are queried on
//! every call. Ids come from `SERIAL` sequences, so they are never reused and
//! concurrent writers cannot collide. Item ids are unique across all lists
//! rather than numbered per list.

mod schema;

use std::{collections::HashMap, fmt::Debug};

use async_trait::async_trait;
use entities::{ListId, ListSummary, LoginRecord, TodoId, TodoItem, TodoList, TodoStatus};
use sqlx::{postgres::PgPoolOptions, PgPool};

use self::schema::{ListRow, ListSummaryRow, LoginRow, TodoRow, SCHEMA_STATEMENTS};
use crate::{LoginStore, StoreProvider, TodoStore, TodoStoreError, TodoStoreResult};

const SELECT_LISTS: &str = "SELECT id, name FROM lists ORDER BY id";

const SELECT_TODOS: &str = "SELECT id, name, completed, lists_id FROM todos ORDER BY lists_id, id";

const SELECT_LIST_SUMMARIES: &str = r#"
    SELECT lists.id, lists.name,
           COUNT(todos.id) AS todos_count,
           COUNT(todos.id) FILTER (WHERE NOT todos.completed) AS incomplete_count
    FROM lists
    LEFT JOIN todos ON todos.lists_id = lists.id
    GROUP BY lists.id, lists.name
    ORDER BY lists.id
"#;

const SELECT_LIST: &str = "SELECT id, name FROM lists WHERE id = $1";

const SELECT_LIST_TODOS: &str =
    "SELECT id, name, completed, lists_id FROM todos WHERE lists_id = $1 ORDER BY id";

const LIST_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM lists WHERE id = $1)";

const INSERT_LIST: &str = "INSERT INTO lists (name) VALUES ($1) RETURNING id, name";

const DELETE_LIST_TODOS: &str = "DELETE FROM todos WHERE lists_id = $1";

const DELETE_LIST: &str = "DELETE FROM lists WHERE id = $1";

const RENAME_LIST: &str = "UPDATE lists SET name = $1 WHERE id = $2";

const INSERT_TODO: &str = r#"
    INSERT INTO todos (name, lists_id) VALUES ($1, $2)
    RETURNING id, name, completed, lists_id
"#;

const SELECT_TODO: &str =
    "SELECT id, name, completed, lists_id FROM todos WHERE id = $1 AND lists_id = $2";

const DELETE_TODO: &str = "DELETE FROM todos WHERE id = $1 AND lists_id = $2";

const UPDATE_TODO_STATUS: &str = "UPDATE todos SET completed = $1 WHERE id = $2 AND lists_id = $3";

const COMPLETE_ALL_TODOS: &str = "UPDATE todos SET completed = true WHERE lists_id = $1";

const INSERT_LOGIN: &str = "INSERT INTO logins (name, logged_in_at) VALUES ($1, $2)";

const SELECT_CURRENT_LOGIN: &str =
    "SELECT name, logged_in_at FROM logins ORDER BY logged_in_at DESC, id DESC LIMIT 1";

/// Logs a statement and its parameters before it is sent.
fn log_query(statement: &str, params: &dyn Debug) {
    tracing::debug!(statement = statement.trim(), params = ?params, "Executing query");
}

/// Turns a unique index violation into an `AlreadyExists` error.
fn conflict_or_database(err: sqlx::Error, entity_type: &'static str, name: &str) -> TodoStoreError {
    let is_unique_violation = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());

    if is_unique_violation {
        TodoStoreError::already_exists(entity_type, name)
    } else {
        TodoStoreError::Database(err)
    }
}

/// PostgreSQL-backed todo store (for deployments that keep data across restarts)
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and create the schema if it is missing
    pub async fn connect(database_url: &str, max_connections: u32) -> TodoStoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.init().await?;

        Ok(store)
    }

    /// Initialize the database tables
    pub async fn init(&self) -> TodoStoreResult<()> {
        for statement in SCHEMA_STATEMENTS {
            log_query(statement, &());
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn list_exists(&self, list_id: ListId) -> TodoStoreResult<bool> {
        log_query(LIST_EXISTS, &(list_id,));
        let exists: bool = sqlx::query_scalar(LIST_EXISTS)
            .bind(list_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl TodoStore for PostgresStore {
    async fn all_lists(&self) -> TodoStoreResult<Vec<TodoList>> {
        log_query(SELECT_LISTS, &());
        let list_rows: Vec<ListRow> = sqlx::query_as(SELECT_LISTS)
            .fetch_all(&self.pool)
            .await?;

        log_query(SELECT_TODOS, &());
        let todo_rows: Vec<TodoRow> = sqlx::query_as(SELECT_TODOS)
            .fetch_all(&self.pool)
            .await?;

        let mut todos_by_list: HashMap<ListId, Vec<TodoItem>> = HashMap::new();
        for row in todo_rows {
            todos_by_list.entry(row.lists_id).or_default().push(row.into());
        }

        Ok(list_rows
            .into_iter()
            .map(|row| {
                let todos = todos_by_list.remove(&row.id).unwrap_or_default();
                row.into_list(todos)
            })
            .collect())
    }

    async fn list_summaries(&self) -> TodoStoreResult<Vec<ListSummary>> {
        log_query(SELECT_LIST_SUMMARIES, &());
        let rows: Vec<ListSummaryRow> = sqlx::query_as(SELECT_LIST_SUMMARIES)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ListSummary::from).collect())
    }

    async fn find_list(&self, list_id: ListId) -> TodoStoreResult<Option<TodoList>> {
        log_query(SELECT_LIST, &(list_id,));
        let row: Option<ListRow> = sqlx::query_as(SELECT_LIST)
            .bind(list_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        log_query(SELECT_LIST_TODOS, &(list_id,));
        let todo_rows: Vec<TodoRow> = sqlx::query_as(SELECT_LIST_TODOS)
            .bind(list_id)
            .fetch_all(&self.pool)
            .await?;

        let todos = todo_rows.into_iter().map(TodoItem::from).collect();
        Ok(Some(row.into_list(todos)))
    }

    async fn add_list(&self, name: &str) -> TodoStoreResult<TodoList> {
        log_query(INSERT_LIST, &(name,));
        let row: ListRow = sqlx::query_as(INSERT_LIST)
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_or_database(e, "TodoList", name))?;

        Ok(row.into_list(Vec::new()))
    }

    async fn delete_list(&self, list_id: ListId) -> TodoStoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        log_query(DELETE_LIST_TODOS, &(list_id,));
        sqlx::query(DELETE_LIST_TODOS)
            .bind(list_id)
            .execute(&mut *tx)
            .await?;

        log_query(DELETE_LIST, &(list_id,));
        let result = sqlx::query(DELETE_LIST)
            .bind(list_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_list_name(&self, list_id: ListId, new_name: &str) -> TodoStoreResult<()> {
        log_query(RENAME_LIST, &(new_name, list_id));
        let result = sqlx::query(RENAME_LIST)
            .bind(new_name)
            .bind(list_id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_database(e, "TodoList", new_name))?;

        if result.rows_affected() == 0 {
            return Err(TodoStoreError::not_found("TodoList", list_id));
        }
        Ok(())
    }

    async fn add_todo_to_list(&self, list_id: ListId, name: &str) -> TodoStoreResult<TodoItem> {
        log_query(INSERT_TODO, &(name, list_id));
        let row: TodoRow = sqlx::query_as(INSERT_TODO)
            .bind(name)
            .bind(list_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let is_missing_list = e
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_foreign_key_violation());
                if is_missing_list {
                    TodoStoreError::not_found("TodoList", list_id)
                } else {
                    conflict_or_database(e, "TodoItem", name)
                }
            })?;

        Ok(row.into())
    }

    async fn find_todo_from_list(
        &self,
        list_id: ListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<Option<TodoItem>> {
        log_query(SELECT_TODO, &(todo_id, list_id));
        let row: Option<TodoRow> = sqlx::query_as(SELECT_TODO)
            .bind(todo_id)
            .bind(list_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(TodoItem::from))
    }

    async fn delete_todo_from_list(
        &self,
        list_id: ListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<bool> {
        log_query(DELETE_TODO, &(todo_id, list_id));
        let result = sqlx::query(DELETE_TODO)
            .bind(todo_id)
            .bind(list_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_todo_status(
        &self,
        list_id: ListId,
        todo_id: TodoId,
        status: TodoStatus,
    ) -> TodoStoreResult<()> {
        let completed = status.is_complete();
        log_query(UPDATE_TODO_STATUS, &(completed, todo_id, list_id));
        let result = sqlx::query(UPDATE_TODO_STATUS)
            .bind(completed)
            .bind(todo_id)
            .bind(list_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            if !self.list_exists(list_id).await? {
                return Err(TodoStoreError::not_found("TodoList", list_id));
            }
            return Err(TodoStoreError::not_found("TodoItem", todo_id));
        }
        Ok(())
    }

    async fn complete_all_todos(&self, list_id: ListId) -> TodoStoreResult<()> {
        log_query(COMPLETE_ALL_TODOS, &(list_id,));
        let result = sqlx::query(COMPLETE_ALL_TODOS)
            .bind(list_id)
            .execute(&self.pool)
            .await?;

        // Nothing updated: either an empty list or no list at all
        if result.rows_affected() == 0 && !self.list_exists(list_id).await? {
            return Err(TodoStoreError::not_found("TodoList", list_id));
        }
        Ok(())
    }
}

#[async_trait]
impl LoginStore for PostgresStore {
    async fn record_login(&self, name: &str) -> TodoStoreResult<LoginRecord> {
        let record = LoginRecord::new(name);

        log_query(INSERT_LOGIN, &(name, record.logged_in_at));
        sqlx::query(INSERT_LOGIN)
            .bind(&record.name)
            .bind(record.logged_in_at)
            .execute(&self.pool)
            .await?;

        Ok(record)
    }

    async fn current_user(&self) -> TodoStoreResult<Option<LoginRecord>> {
        log_query(SELECT_CURRENT_LOGIN, &());
        let row: Option<LoginRow> = sqlx::query_as(SELECT_CURRENT_LOGIN)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(LoginRecord::from))
    }
}

#[async_trait]
impl StoreProvider for PostgresStore {
    type Store = PostgresStore;
    type Logins = PostgresStore;

    async fn store_for(&self, _session_id: &str) -> PostgresStore {
        self.clone()
    }

    fn logins(&self) -> &PostgresStore {
        self
    }
}
