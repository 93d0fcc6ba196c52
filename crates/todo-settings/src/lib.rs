//! # todo-settings
//!
//! Configuration for the todo service, loaded from three layers (in priority
//! order):
//! 1. **Compiled defaults**: [`TodoSettings::default()`]
//! 2. **Settings file**: JSON, deep-merged over the defaults
//! 3. **Environment variables**: `TODO_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{DEFAULT_SETTINGS_FILE, deep_merge, load_settings_from_path};
pub use types::{CorsSettings, DatabaseSettings, LoggingSettings, ServerSettings, TodoSettings};
