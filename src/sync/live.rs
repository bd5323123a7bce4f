//! Live Cache
//!
//! A string-keyed cache paired with the remote document it mirrors.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::Cache;
use crate::error::SyncError;
use crate::sync::{ChangeFeed, FeedConfig, MismatchPolicy};
use crate::tasks::spawn_sync_task;

// == Live Cache ==
/// Cache mirroring the fields of one remote document.
///
/// Field names become keys and field values, decoded as `V`, become values.
#[derive(Debug)]
pub struct LiveCache<V> {
    config: FeedConfig,
    policy: MismatchPolicy,
    cache: Arc<Cache<String, V>>,
}

impl<V> LiveCache<V>
where
    V: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Creates an empty live cache for the document named by `config`.
    pub fn new(config: FeedConfig) -> Self {
        Self::with_cache(config, Arc::new(Cache::new()))
    }

    /// Creates a live cache that fills an existing shared cache.
    pub fn with_cache(config: FeedConfig, cache: Arc<Cache<String, V>>) -> Self {
        Self {
            config,
            policy: MismatchPolicy::default(),
            cache,
        }
    }

    /// Sets the policy for fields whose value does not decode as `V`.
    pub fn with_policy(mut self, policy: MismatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn policy(&self) -> MismatchPolicy {
        self.policy
    }

    /// Shared handle to the underlying cache.
    pub fn cache(&self) -> &Arc<Cache<String, V>> {
        &self.cache
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key)
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        self.cache.set(key.into(), value)
    }

    // == Listen ==
    /// Subscribes the cache to `feed` and waits until the first snapshot has
    /// been applied.
    ///
    /// Later snapshots keep being applied in the background through the
    /// returned [`SyncHandle`]. If the feed fails or ends before delivering a
    /// snapshot, that error is returned instead.
    pub async fn listen<F>(&self, feed: F) -> Result<SyncHandle, SyncError>
    where
        F: ChangeFeed + 'static,
    {
        let (ready_tx, ready_rx) = oneshot::channel();
        let handle = spawn_sync_task(
            self.cache.clone(),
            feed,
            self.policy,
            self.config.path(),
            ready_tx,
        );

        if ready_rx.await.is_ok() {
            info!(document = %self.config, entries = self.cache.len(), "Live cache ready");
            return Ok(SyncHandle {
                handle: Some(handle),
            });
        }

        // The task dropped the ready sender without firing it, so it has ended.
        match handle.await? {
            Ok(()) => Err(SyncError::FeedClosed),
            Err(err) => Err(err),
        }
    }
}

// == Sync Handle ==
/// Handle to a running subscription.
#[derive(Debug)]
pub struct SyncHandle {
    /// Taken by the first `wait` that sees the task end
    handle: Option<JoinHandle<Result<(), SyncError>>>,
}

impl SyncHandle {
    /// Stops applying snapshots. Entries already applied stay in the cache.
    pub fn abort(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the subscription to end and returns how it ended.
    ///
    /// The outcome is reported once; later calls return
    /// `Err(SyncError::FeedClosed)` immediately.
    pub async fn wait(&mut self) -> Result<(), SyncError> {
        let handle = self.handle.as_mut().ok_or(SyncError::FeedClosed)?;
        let outcome = handle.await;
        self.handle = None;
        outcome?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde::Deserialize;
    use serde_json::{json, Map, Value};
    use tokio::io::AsyncWriteExt;

    use crate::sync::{ChannelFeed, DocumentSnapshot, JsonLinesFeed};

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Sample {
        #[serde(rename = "string-1", default)]
        string1: String,
        #[serde(rename = "string-2", default)]
        string2: String,
    }

    fn config() -> FeedConfig {
        FeedConfig {
            project_id: "holy-diver".to_string(),
            collection: "ezcx-cache-testing".to_string(),
            document: "maps".to_string(),
        }
    }

    fn snapshot(value: Value) -> DocumentSnapshot {
        let data: Map<String, Value> = serde_json::from_value(value).unwrap();
        DocumentSnapshot::new(config().path(), data)
    }

    #[tokio::test]
    async fn test_listen_returns_after_first_snapshot() {
        let live: LiveCache<Sample> = LiveCache::new(config());
        let (sender, feed) = ChannelFeed::new(4);

        sender
            .send(Ok(snapshot(json!({
                "sample-1": {"string-1": "a", "string-2": "b"},
                "sample-2": {"string-1": "c"}
            }))))
            .await
            .unwrap();

        let mut sync = live.listen(feed).await.unwrap();

        let sample = live.get("sample-1").unwrap();
        assert_eq!(sample.string1, "a");
        assert_eq!(sample.string2, "b");
        assert!(live.get("sample-2").is_some());
        assert!(live.get("sample-3").is_none());

        sender
            .send(Ok(snapshot(json!({"sample-3": {"string-2": "d"}}))))
            .await
            .unwrap();
        drop(sender);

        assert!(sync.wait().await.is_ok());
        assert_eq!(live.get("sample-3").unwrap().string2, "d");
        assert_eq!(live.cache().len(), 3);
    }

    #[tokio::test]
    async fn test_listen_fails_on_type_mismatch() {
        let live: LiveCache<u64> = LiveCache::new(config());
        let (sender, feed) = ChannelFeed::new(4);

        sender
            .send(Ok(snapshot(json!({"count": 1, "name": "not a number"}))))
            .await
            .unwrap();

        let result = live.listen(feed).await;
        assert!(matches!(result, Err(SyncError::TypeMismatch { ref field, .. }) if field == "name"));
        assert!(live.cache().is_empty());
    }

    #[tokio::test]
    async fn test_listen_skips_mismatched_fields() {
        let live: LiveCache<u64> =
            LiveCache::new(config()).with_policy(MismatchPolicy::SkipAndLog);
        let (sender, feed) = ChannelFeed::new(4);

        sender
            .send(Ok(snapshot(json!({"count": 1, "name": "not a number"}))))
            .await
            .unwrap();

        let sync = live.listen(feed).await.unwrap();
        assert_eq!(live.get("count"), Some(1));
        assert_eq!(live.get("name"), None);

        sync.abort();
        drop(sender);
    }

    #[tokio::test]
    async fn test_listen_reports_closed_feed() {
        let live: LiveCache<Value> = LiveCache::new(config());
        let (sender, feed) = ChannelFeed::new(1);
        drop(sender);

        assert!(matches!(live.listen(feed).await, Err(SyncError::FeedClosed)));
    }

    #[tokio::test]
    async fn test_listen_reports_transport_error() {
        let live: LiveCache<Value> = LiveCache::new(config());
        let (sender, feed) = ChannelFeed::new(1);
        sender
            .send(Err(SyncError::Transport("permission denied".to_string())))
            .await
            .unwrap();

        assert!(matches!(live.listen(feed).await, Err(SyncError::Transport(_))));
    }

    #[tokio::test]
    async fn test_listen_from_json_lines() {
        let input = "{\"greeting\": \"hello\"}\n{\"greeting\": \"hi\", \"farewell\": \"bye\"}\n";
        let live: LiveCache<String> = LiveCache::new(config());

        let mut sync = live
            .listen(JsonLinesFeed::new(input.as_bytes(), config().path()))
            .await
            .unwrap();
        sync.wait().await.unwrap();

        assert_eq!(live.get("greeting"), Some("hi".to_string()));
        assert_eq!(live.get("farewell"), Some("bye".to_string()));
        assert!(sync.is_finished());
    }

    #[tokio::test]
    async fn test_wait_after_completion_does_not_panic() {
        let live: LiveCache<i64> = LiveCache::new(config());
        let (sender, feed) = ChannelFeed::new(1);
        sender.send(Ok(snapshot(json!({"n": 1})))).await.unwrap();

        let mut sync = live.listen(feed).await.unwrap();
        drop(sender);

        assert!(sync.wait().await.is_ok());
        assert!(matches!(sync.wait().await, Err(SyncError::FeedClosed)));
        assert!(sync.is_finished());
        sync.abort();
    }

    #[tokio::test]
    async fn test_listen_keeps_following_appended_file() {
        let path = std::env::temp_dir().join(format!(
            "live_cache_listen_{}.jsonl",
            std::process::id()
        ));
        tokio::fs::write(&path, "{\"a\": 1}\n").await.unwrap();

        let live: LiveCache<i64> = LiveCache::new(config());
        let feed = JsonLinesFeed::open(&path, config().path())
            .await
            .unwrap()
            .follow(Duration::from_millis(5));
        let sync = live.listen(feed).await.unwrap();
        assert_eq!(live.get("a"), Some(1));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!sync.is_finished());

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .await
            .unwrap();
        file.write_all(b"{\"b\": 2}\n").await.unwrap();
        file.flush().await.unwrap();

        let applied = tokio::time::timeout(Duration::from_secs(5), async {
            while live.get("b").is_none() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(applied.is_ok());
        assert!(!sync.is_finished());

        sync.abort();
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_writes_share_the_cache() {
        let shared = Arc::new(Cache::new());
        let live: LiveCache<i64> = LiveCache::with_cache(config(), shared.clone());

        live.set("local", 7);
        assert_eq!(shared.get("local"), Some(7));
        assert_eq!(live.policy(), MismatchPolicy::FailFast);
        assert_eq!(live.config().document, "maps");
    }
}
