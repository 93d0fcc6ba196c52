//! # todo-server
//!
//! Axum HTTP API over [`todo_store::TaskRepository`].
//!
//! - **[`server`]**: [`TodoServer`], router assembly, CORS and access logging
//! - **[`handlers`]**: one handler per route
//! - **[`error`]**: [`ApiError`] and its HTTP status mapping
//! - **[`health`]**: `/health` response
//! - **[`shutdown`]**: graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, TodoServer};
pub use shutdown::ShutdownCoordinator;
