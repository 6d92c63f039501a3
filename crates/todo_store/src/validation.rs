//! Name validation for lists and todo items.
//!
//! Both checks are pure: they look at the candidate and the entries that
//! already exist and never touch a store.

use entities::{ListId, ListSummary, TodoItem, TodoList};
use thiserror::Error;

/// Longest accepted list or item name, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Reasons a list or item name is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("The list name must be between 1 and 100 characters.")]
    ListNameLength,

    #[error("The list name must be unique.")]
    ListNameTaken,

    #[error("The todo item must be between 1 and 100 characters.")]
    ItemNameLength,

    #[error("The todo item must be unique.")]
    ItemNameTaken,
}

/// An entry with an id and a user-visible name.
pub trait Named {
    /// Entry id.
    fn id(&self) -> i32;
    /// Entry name.
    fn name(&self) -> &str;
}

impl Named for TodoList {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ListSummary {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for TodoItem {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn has_valid_length(name: &str) -> bool {
    (1..=MAX_NAME_LENGTH).contains(&name.chars().count())
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Checks a new name for a list.
///
/// When renaming, pass the id of the list being renamed so that keeping
/// its current name is not reported as a duplicate.
pub fn validate_list_name<L: Named>(
    existing_lists: &[L],
    candidate: &str,
    renaming: Option<ListId>,
) -> Result<(), NameError> {
    if !has_valid_length(candidate) {
        return Err(NameError::ListNameLength);
    }

    let taken = existing_lists
        .iter()
        .filter(|list| Some(list.id()) != renaming)
        .any(|list| same_name(list.name(), candidate));

    if taken {
        Err(NameError::ListNameTaken)
    } else {
        Ok(())
    }
}

/// Checks the name of an item about to be added to a list.
pub fn validate_item_name<I: Named>(
    existing_items: &[I],
    candidate: &str,
) -> Result<(), NameError> {
    if !has_valid_length(candidate) {
        return Err(NameError::ItemNameLength);
    }

    if existing_items
        .iter()
        .any(|item| same_name(item.name(), candidate))
    {
        return Err(NameError::ItemNameTaken);
    }

    Ok(())
}
