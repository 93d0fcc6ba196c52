//! # todo-core
//!
//! Foundation types shared by every crate in the todo service.
//!
//! - [`task::Task`]: the single persisted entity
//! - [`search`]: canonical search parameter names and the defaults the HTTP
//!   layer fills in before a search reaches the store
//! - [`logging`]: `tracing` subscriber setup

#![deny(unsafe_code)]

pub mod logging;
pub mod search;
pub mod task;

pub use task::Task;
