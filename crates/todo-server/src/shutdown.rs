//! Graceful shutdown via `CancellationToken`.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Signals the HTTP listener to stop accepting connections and drain.
#[derive(Clone, Debug, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initiate shutdown. Idempotent.
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            info!("shutdown requested");
        }
        self.token.cancel();
    }

    /// Whether a shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once [`shutdown`](Self::shutdown) has been called.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}
