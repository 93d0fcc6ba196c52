//! Settings types.
//!
//! Every struct uses `#[serde(default)]` so a partial settings file only has
//! to name the values it changes.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TodoSettings {
    /// HTTP listener.
    pub server: ServerSettings,
    /// Database location and pool sizing.
    pub database: DatabaseSettings,
    /// CORS policy for browser clients.
    pub cors: CorsSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl TodoSettings {
    /// Reject values that would make startup fail later in a less obvious way.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(SettingsError::InvalidValue(
                "database.poolSize must be at least 1".to_string(),
            ));
        }
        if self.database.path.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "database.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

/// `SQLite` settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file path (`:memory:` for a throwaway database).
    pub path: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// Busy timeout applied to every connection, in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "todo.db".to_string(),
            pool_size: 16,
            busy_timeout_ms: 30_000,
        }
    }
}

/// CORS settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CorsSettings {
    /// Origins allowed to call the API.
    pub allow_origins: Vec<String>,
    /// Request headers allowed on cross-origin calls.
    pub allow_headers: Vec<String>,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allow_origins: vec!["http://localhost:3000".to_string()],
            allow_headers: vec![
                "Origin".to_string(),
                "Content-Type".to_string(),
                "Accept".to_string(),
            ],
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
    /// Append log lines to this file instead of stderr.
    pub file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}
