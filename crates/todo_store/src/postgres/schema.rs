use chrono::{DateTime, Utc};
use entities::{ListId, ListSummary, LoginRecord, TodoId, TodoItem, TodoList, TodoStatus};
use sqlx::FromRow;

/// Statements creating the schema, run on every connect.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS lists (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_lists_name_lower
    ON lists (LOWER(name))
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS todos (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT false,
        lists_id INTEGER NOT NULL REFERENCES lists (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_todos_list_name_lower
    ON todos (lists_id, LOWER(name))
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS logins (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        logged_in_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Database row for a list
#[derive(Debug, FromRow)]
pub struct ListRow {
    pub id: ListId,
    pub name: String,
}

impl ListRow {
    pub fn into_list(self, todos: Vec<TodoItem>) -> TodoList {
        TodoList::new(self.id, self.name).with_todos(todos)
    }
}

/// Database row for a todo
#[derive(Debug, FromRow)]
pub struct TodoRow {
    pub id: TodoId,
    pub name: String,
    pub completed: bool,
    pub lists_id: ListId,
}

impl From<TodoRow> for TodoItem {
    fn from(row: TodoRow) -> Self {
        TodoItem::new(row.id, row.name).with_status(TodoStatus::from_completed(row.completed))
    }
}

/// Database row for the aggregated list query
#[derive(Debug, FromRow)]
pub struct ListSummaryRow {
    pub id: ListId,
    pub name: String,
    pub todos_count: i64,
    pub incomplete_count: i64,
}

impl From<ListSummaryRow> for ListSummary {
    fn from(row: ListSummaryRow) -> Self {
        ListSummary {
            id: row.id,
            name: row.name,
            todos_count: usize::try_from(row.todos_count).unwrap_or_default(),
            incomplete_count: usize::try_from(row.incomplete_count).unwrap_or_default(),
        }
    }
}

/// Database row for a login
#[derive(Debug, FromRow)]
pub struct LoginRow {
    pub name: String,
    pub logged_in_at: DateTime<Utc>,
}

impl From<LoginRow> for LoginRecord {
    fn from(row: LoginRow) -> Self {
        LoginRecord {
            name: row.name,
            logged_in_at: row.logged_in_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_row_conversion() {
        let row = TodoRow {
            id: 3,
            name: "Milk".to_string(),
            completed: true,
            lists_id: 1,
        };

        let item = TodoItem::from(row);
        assert_eq!(item.id, 3);
        assert_eq!(item.status, TodoStatus::Complete);
    }

    #[test]
    fn test_summary_row_conversion() {
        let row = ListSummaryRow {
            id: 1,
            name: "Groceries".to_string(),
            todos_count: 4,
            incomplete_count: 1,
        };

        let summary = ListSummary::from(row);
        assert_eq!(summary.todos_count, 4);
        assert_eq!(summary.incomplete_count, 1);
    }
}
