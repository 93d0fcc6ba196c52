//! `TodoServer`: Axum HTTP server over the task repository.

use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use todo_store::TaskRepository;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers;
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Task persistence.
    pub repo: TaskRepository,
    /// When the server started.
    pub start_time: Instant,
}

/// The HTTP server.
pub struct TodoServer {
    config: ServerConfig,
    repo: TaskRepository,
    shutdown: ShutdownCoordinator,
    start_time: Instant,
}

impl TodoServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, repo: TaskRepository) -> Self {
        Self {
            config,
            repo,
            shutdown: ShutdownCoordinator::new(),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            repo: self.repo.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route(
                "/task/{id}",
                get(handlers::get_task)
                    .put(handlers::update_task)
                    .delete(handlers::delete_task),
            )
            .route("/task", post(handlers::create_task))
            .route("/tasks", get(handlers::list_tasks))
            .route("/tasks/search", get(handlers::search_tasks))
            .route("/health", get(handlers::health))
            .layer(cors_layer(&self.config))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind the configured address and serve in a background task.
    ///
    /// Returns the bound address and the serving task, which completes after
    /// [`ShutdownCoordinator::shutdown`] once in-flight requests have drained.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<std::io::Result<()>>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        info!(%addr, "todo server listening");

        let router = self.router();
        let shutdown = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            let signal = shutdown.clone();
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.wait().await })
                .await;
            if shutdown.is_shutting_down() {
                info!("todo server stopped");
            } else {
                warn!("todo server stopped without a shutdown request");
            }
            result
        });
        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }
}

/// CORS policy from the configured origins and headers.
///
/// Entries that are not valid header values are skipped with a warning.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let headers: Vec<HeaderName> = config
        .allow_headers
        .iter()
        .filter_map(|header| match HeaderName::try_from(header.as_str()) {
            Ok(name) => Some(name),
            Err(_) => {
                warn!(header = %header, "ignoring invalid CORS header");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_headers(headers)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
}
