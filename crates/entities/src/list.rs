//! TodoList entity definitions and derived state.

use serde::{Deserialize, Serialize};

use crate::{TodoId, TodoItem, TodoStatus};

/// Identifier of a todo list.
pub type ListId = i32;

/// A named, ordered collection of todo items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    /// Unique identifier.
    pub id: ListId,
    /// Display name.
    pub name: String,
    /// Items in insertion order.
    pub todos: Vec<TodoItem>,
}

impl TodoList {
    /// Creates a new empty list.
    pub fn new(id: ListId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            todos: Vec::new(),
        }
    }

    /// Sets the items of this list.
    pub fn with_todos(mut self, todos: Vec<TodoItem>) -> Self {
        self.todos = todos;
        self
    }

    /// Looks up an item by id.
    pub fn todo(&self, todo_id: TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|item| item.id == todo_id)
    }

    /// Looks up an item by id for modification.
    pub fn todo_mut(&mut self, todo_id: TodoId) -> Option<&mut TodoItem> {
        self.todos.iter_mut().find(|item| item.id == todo_id)
    }

    /// Number of items in the list.
    pub fn todos_count(&self) -> usize {
        self.todos.len()
    }

    /// Number of items that are not complete yet.
    pub fn incomplete_count(&self) -> usize {
        self.todos
            .iter()
            .filter(|item| item.status == TodoStatus::Incomplete)
            .count()
    }

    /// Items with incomplete ones first, see [`ordered_by_status`].
    pub fn ordered_todos(&self) -> Vec<&TodoItem> {
        ordered_by_status(&self.todos)
    }

    /// Aggregated view of this list.
    pub fn summary(&self) -> ListSummary {
        ListSummary {
            id: self.id,
            name: self.name.clone(),
            todos_count: self.todos_count(),
            incomplete_count: self.incomplete_count(),
        }
    }
}

/// A list without its items, as produced by an aggregate query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    /// List identifier.
    pub id: ListId,
    /// List name.
    pub name: String,
    /// Total number of items.
    pub todos_count: usize,
    /// Number of incomplete items.
    pub incomplete_count: usize,
}

/// Anything that can be shown as done or not done.
pub trait Completable {
    /// Returns true when the entry counts as done.
    fn is_complete(&self) -> bool;
}

impl Completable for TodoItem {
    fn is_complete(&self) -> bool {
        self.status.is_complete()
    }
}

/// A list is complete when it has at least one item and every item is
/// complete.
impl Completable for TodoList {
    fn is_complete(&self) -> bool {
        !self.todos.is_empty() && self.todos.iter().all(Completable::is_complete)
    }
}

impl Completable for ListSummary {
    fn is_complete(&self) -> bool {
        self.todos_count > 0 && self.incomplete_count == 0
    }
}

/// Returns the entries with every incomplete one before every complete one.
///
/// Relative order inside each group is preserved.
pub fn ordered_by_status<T: Completable>(entries: &[T]) -> Vec<&T> {
    let incomplete = entries.iter().filter(|entry| !entry.is_complete());
    let complete = entries.iter().filter(|entry| entry.is_complete());
    incomplete.chain(complete).collect()
}
