//! # todo
//!
//! Task service binary: loads settings, opens the `SQLite` database and
//! serves the HTTP API until interrupted.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use todo_server::{ServerConfig, TodoServer};
use todo_settings::{DEFAULT_SETTINGS_FILE, TodoSettings};
use todo_store::{ConnectionConfig, TaskRepository};

/// Task service.
#[derive(Parser, Debug)]
#[command(name = "todo", about = "Task CRUD and search over HTTP")]
struct Cli {
    /// Settings file (JSON).
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings).
    #[arg(long)]
    db_path: Option<String>,
}

impl Cli {
    /// Command-line flags win over file and environment.
    fn apply(&self, settings: &mut TodoSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(path) = &self.db_path {
            settings.database.path.clone_from(path);
        }
    }
}

fn load_settings(cli: &Cli) -> Result<TodoSettings> {
    let mut settings = todo_settings::load_settings_from_path(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    cli.apply(&mut settings);
    Ok(settings)
}

fn open_repository(settings: &TodoSettings) -> Result<TaskRepository> {
    let config = ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: settings.database.busy_timeout_ms,
    };
    TaskRepository::open(&settings.database.path, &config)
        .with_context(|| format!("Failed to open database at {}", settings.database.path))
}

fn init_logging(settings: &TodoSettings) -> Result<()> {
    let file = settings.logging.file.as_deref().map(Path::new);
    todo_core::logging::init_subscriber(&settings.logging.level, settings.logging.json, file)
        .with_context(|| {
            format!(
                "Failed to open log file {}",
                settings.logging.file.as_deref().unwrap_or_default()
            )
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    init_logging(&settings)?;

    // The table must exist before the listener accepts traffic.
    let repo = open_repository(&settings)?;
    tracing::info!(path = %settings.database.path, "database ready");

    let server = TodoServer::new(ServerConfig::from_settings(&settings), repo);
    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("todo service listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().shutdown();
    handle
        .await
        .context("Server task panicked")?
        .context("Server error")?;

    tracing::info!("Shutdown complete");
    Ok(())
}
