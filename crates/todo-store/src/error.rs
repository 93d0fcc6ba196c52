//! Error types for the task store.
//!
//! Driver and pool failures are carried through unchanged in
//! [`StoreError::Sqlite`] and [`StoreError::Pool`]. Not-found is never an
//! error here: lookups return an empty `Vec` and deletes report zero rows.

use thiserror::Error;

/// Errors that can occur during task store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error (execution, scan, begin/commit).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Creating the `tasks` table failed.
    #[error("schema error: {message}")]
    Schema {
        /// Which step failed and why.
        message: String,
    },

    /// A search filter value could not be converted to its column type.
    #[error("invalid value for search filter {key}: {value:?}")]
    InvalidFilter {
        /// Filter key as supplied by the caller.
        key: String,
        /// Offending value.
        value: String,
    },

    /// Filesystem error while preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
