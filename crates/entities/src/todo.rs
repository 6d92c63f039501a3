//! TodoItem entity definitions.

use serde::{Deserialize, Serialize};

/// Identifier of a todo item, unique within its owning list.
pub type TodoId = i32;

/// Status of a TodoItem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Still to be done.
    #[default]
    Incomplete,
    /// Done.
    Complete,
}

impl TodoStatus {
    /// Converts the status to a string for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Complete => "complete",
        }
    }

    /// Parses a status from a string.
    ///
    /// The empty string is accepted as `Incomplete`, which is what the
    /// classic form posts for an unchecked item.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" | "incomplete" => Some(Self::Incomplete),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    /// Returns true for `Complete`.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Maps the `completed` database column to a status.
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            Self::Complete
        } else {
            Self::Incomplete
        }
    }
}

/// A single entry in a todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Identifier, unique within the owning list.
    pub id: TodoId,
    /// Display name.
    pub name: String,
    /// Current status.
    pub status: TodoStatus,
}

impl TodoItem {
    /// Creates a new incomplete todo item.
    pub fn new(id: TodoId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: TodoStatus::Incomplete,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TodoStatus) -> Self {
        self.status = status;
        self
    }
}
