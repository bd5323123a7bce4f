//! Background Tasks Module
//!
//! Contains the tasks that run alongside the server.
//!
//! # Tasks
//! - Live sync: applies change-feed snapshots to the cache

mod sync;

pub use sync::spawn_sync_task;
