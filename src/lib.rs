//! Live Cache - A concurrent in-memory cache kept in sync with a remote document
//!
//! [`Cache`] is a generic key-value map safe for any number of concurrent
//! readers and writers. [`LiveCache`] fills one from a document change feed
//! and signals when the first snapshot has landed.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod sync;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, Cacheable};
pub use config::Config;
pub use error::{ApiError, SyncError};
pub use sync::{LiveCache, SyncHandle};
