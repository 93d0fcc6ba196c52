//! Server configuration.

use serde::{Deserialize, Serialize};
use todo_settings::TodoSettings;

/// Listener and CORS configuration for [`TodoServer`](crate::TodoServer).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub allow_origins: Vec<String>,
    /// Request headers allowed by the CORS layer.
    pub allow_headers: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let cors = todo_settings::CorsSettings::default();
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            allow_origins: cors.allow_origins,
            allow_headers: cors.allow_headers,
        }
    }
}

impl ServerConfig {
    /// Take the `server` and `cors` sections of loaded settings.
    pub fn from_settings(settings: &TodoSettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            allow_origins: settings.cors.allow_origins.clone(),
            allow_headers: settings.cors.allow_headers.clone(),
        }
    }

    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
