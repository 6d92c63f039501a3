//! Todo list storage
//!
//! This crate provides a storage abstraction for todo lists and their items.
//! It supports a per-session in-memory backend (for single-process mode) and
//! PostgreSQL (for data shared by every visitor and kept across restarts).

mod error;
mod ids;
mod postgres;
mod session;
mod traits;
mod validation;

pub use error::*;
pub use ids::next_id;
pub use postgres::PostgresStore;
pub use session::*;
pub use traits::*;
pub use validation::*;
