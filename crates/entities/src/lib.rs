//! Core entity definitions for the todo lists service.
//!
//! This crate defines the data types shared by the stores and the server:
//! lists, their items, and the anonymous login record, together with the
//! derived state (completion, counts, status ordering) computed from them.

mod list;
mod login;
mod todo;

pub use list::*;
pub use login::*;
pub use todo::*;
