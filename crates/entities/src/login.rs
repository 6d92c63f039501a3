//! Login record entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An anonymous login, identified only by the name the visitor typed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRecord {
    /// Name given at login.
    pub name: String,
    /// When the login happened.
    pub logged_in_at: DateTime<Utc>,
}

impl LoginRecord {
    /// Creates a login record stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logged_in_at: Utc::now(),
        }
    }

    /// Login time in the `dd/mm/YYYY HH:MM` form shown to users.
    pub fn display_time(&self) -> String {
        self.logged_in_at.format("%d/%m/%Y %H:%M").to_string()
    }
}
