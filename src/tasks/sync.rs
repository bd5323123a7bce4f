//! Live Sync Task
//!
//! Background task that applies every snapshot from a change feed to a cache.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cache::Cacheable;
use crate::error::SyncError;
use crate::sync::{decode_fields, ChangeFeed, MismatchPolicy};

/// Spawns a background task that mirrors `feed` into `cache`.
///
/// Each snapshot is decoded according to `policy`, then written with one
/// `set` per field; entries become visible individually as they are applied.
/// After the first snapshot is applied, `ready` fires exactly once.
///
/// The task ends with:
/// - `Err` as soon as the feed or decoding fails (fail-fast; the cache keeps
///   whatever was applied before)
/// - `Err(SyncError::FeedClosed)` if the feed ends before its first snapshot
/// - `Ok(())` if the feed ends after the cache became ready
///
/// # Example
/// ```ignore
/// let (ready_tx, ready_rx) = oneshot::channel();
/// let handle = spawn_sync_task(cache.clone(), feed, MismatchPolicy::FailFast, path, ready_tx);
/// ready_rx.await?;
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sync_task<C, F, V>(
    cache: Arc<C>,
    mut feed: F,
    policy: MismatchPolicy,
    document: String,
    ready: oneshot::Sender<()>,
) -> JoinHandle<Result<(), SyncError>>
where
    C: Cacheable<String, V> + ?Sized + 'static,
    F: ChangeFeed + 'static,
    V: DeserializeOwned + Send + 'static,
{
    tokio::spawn(async move {
        info!(document = %document, policy = %policy, "Starting live sync");

        let mut ready = Some(ready);
        let mut applied_snapshots: u64 = 0;

        loop {
            let snapshot = match feed.next().await {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) if ready.is_some() => {
                    warn!(document = %document, "Change feed closed before the first snapshot");
                    return Err(SyncError::FeedClosed);
                }
                Ok(None) => {
                    info!(document = %document, applied_snapshots, "Change feed closed");
                    return Ok(());
                }
                Err(err) => {
                    error!(document = %document, error = %err, "Live sync aborted");
                    return Err(err);
                }
            };

            let read_time = snapshot.read_time;
            let fields = match decode_fields::<V>(&snapshot.document, snapshot.data, policy) {
                Ok(fields) => fields,
                Err(err) => {
                    error!(document = %document, error = %err, "Live sync aborted");
                    return Err(err);
                }
            };

            let count = fields.len();
            for (key, value) in fields {
                cache.set(key, value);
            }
            applied_snapshots += 1;
            debug!(document = %document, fields = count, read_time = %read_time, "Applied snapshot");

            if let Some(ready) = ready.take() {
                info!(document = %document, fields = count, "Cache populated");
                // The listener may have given up waiting; nothing else to notify.
                let _ = ready.send(());
            }
        }
    })
}
