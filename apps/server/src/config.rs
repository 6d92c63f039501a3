//! Server configuration.

use std::{env, fmt, str::FromStr, time::Duration};

/// Where todo lists are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// One in-memory store per session.
    Session,
    /// Shared PostgreSQL tables.
    Database,
}

impl FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "session" => Ok(Self::Session),
            "database" | "postgres" => Ok(Self::Database),
            other => anyhow::bail!("Unknown storage kind: {other}"),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => f.write_str("session"),
            Self::Database => f.write_str("database"),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Storage backend.
    pub storage: StorageKind,
    /// Database URL (required for database storage).
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub database_max_connections: u32,
    /// How long an untouched session keeps its lists. `None` keeps them forever.
    pub session_idle_timeout: Option<Duration>,
    /// Log level.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4567,
            storage: StorageKind::Session,
            database_url: None,
            database_max_connections: 5,
            session_idle_timeout: Some(Duration::from_secs(24 * 60 * 60)),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        let storage = match lookup("TODOS_STORAGE") {
            Some(value) => value.parse()?,
            None if database_url.is_some() => StorageKind::Database,
            None => StorageKind::Session,
        };

        if storage == StorageKind::Database && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required for database storage");
        }

        let port = match lookup("TODOS_SERVER_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid TODOS_SERVER_PORT: {port}"))?,
            None => defaults.port,
        };

        let database_max_connections = match lookup("TODOS_DATABASE_MAX_CONNECTIONS") {
            Some(max) => max
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid TODOS_DATABASE_MAX_CONNECTIONS: {max}"))?,
            None => defaults.database_max_connections,
        };

        // Zero disables expiry.
        let session_idle_timeout = match lookup("TODOS_SESSION_IDLE_SECS") {
            Some(secs) => match secs.parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => anyhow::bail!("Invalid TODOS_SESSION_IDLE_SECS: {secs}"),
            },
            None => defaults.session_idle_timeout,
        };

        Ok(Self {
            host: lookup("TODOS_SERVER_HOST").unwrap_or(defaults.host),
            port,
            storage,
            database_url,
            database_max_connections,
            session_idle_timeout,
            log_level: lookup("TODOS_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
