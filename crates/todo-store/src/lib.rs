//! # todo-store
//!
//! `SQLite` persistence for tasks.
//!
//! - **[`connection`]**: `r2d2` pool with per-connection pragmas.
//! - **[`schema`]**: idempotent creation of the `tasks` table.
//! - **[`pagination`]**: total `page`/`perPage` normalization.
//! - **[`query`]**: typed search filters and the parameterized statement builder.
//! - **[`repository`]**: [`TaskRepository`], one transaction per operation.

#![deny(unsafe_code)]

pub mod connection;
pub mod error;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod schema;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection};
pub use error::{Result, StoreError};
pub use query::{BuiltQuery, Filter, SearchQuery};
pub use repository::TaskRepository;
