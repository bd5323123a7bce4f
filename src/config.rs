//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::sync::{FeedConfig, MismatchPolicy};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote document the cache mirrors
    pub feed: FeedConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Newline-delimited JSON snapshot source; stdin when unset
    pub feed_path: Option<PathBuf>,
    /// How often a followed snapshot file is checked for new lines
    pub feed_poll_interval: Duration,
    /// What to do with fields whose value has the wrong type
    pub mismatch_policy: MismatchPolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PROJECT_ID` - Remote project identifier (default: local)
    /// - `COLLECTION` - Collection holding the watched document (default: cache)
    /// - `DOCUMENT` - Watched document identifier (default: entries)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `FEED_PATH` - Snapshot file to follow for appended lines (default: stdin)
    /// - `FEED_POLL_MS` - Poll interval for `FEED_PATH` in milliseconds (default: 500)
    /// - `MISMATCH_POLICY` - `fail-fast` or `skip` (default: fail-fast)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            feed: FeedConfig {
                project_id: env::var("PROJECT_ID").unwrap_or(defaults.feed.project_id),
                collection: env::var("COLLECTION").unwrap_or(defaults.feed.collection),
                document: env::var("DOCUMENT").unwrap_or(defaults.feed.document),
            },
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            feed_path: env::var("FEED_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            feed_poll_interval: env::var("FEED_POLL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.feed_poll_interval),
            mismatch_policy: env::var("MISMATCH_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.mismatch_policy),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig {
                project_id: "local".to_string(),
                collection: "cache".to_string(),
                document: "entries".to_string(),
            },
            server_port: 3000,
            feed_path: None,
            feed_poll_interval: Duration::from_millis(500),
            mismatch_policy: MismatchPolicy::FailFast,
        }
    }
}
