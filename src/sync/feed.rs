//! Change Feed Module
//!
//! Sources of successive snapshots of one watched document.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Stdin};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, trace};

use crate::error::SyncError;

// == Feed Config ==
/// Identifies the remote document a cache mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub project_id: String,
    pub collection: String,
    pub document: String,
}

impl FeedConfig {
    /// Full resource path of the watched document.
    pub fn path(&self) -> String {
        format!(
            "projects/{}/documents/{}/{}",
            self.project_id, self.collection, self.document
        )
    }
}

impl fmt::Display for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// == Document Snapshot ==
/// Full field map of the watched document at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    /// Path of the document this snapshot was read from
    pub document: String,
    /// Field name to raw field value
    pub data: Map<String, Value>,
    /// When the snapshot was read
    pub read_time: DateTime<Utc>,
}

impl DocumentSnapshot {
    /// Creates a snapshot stamped with the current time.
    pub fn new(document: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            document: document.into(),
            data,
            read_time: Utc::now(),
        }
    }
}

// == Change Feed Trait ==
/// A subscription to a document's changes.
#[async_trait]
pub trait ChangeFeed: Send {
    /// Waits for the next snapshot.
    ///
    /// `Ok(None)` means the feed has ended and will yield nothing more.
    async fn next(&mut self) -> Result<Option<DocumentSnapshot>, SyncError>;
}

#[async_trait]
impl<F> ChangeFeed for Box<F>
where
    F: ChangeFeed + ?Sized,
{
    async fn next(&mut self) -> Result<Option<DocumentSnapshot>, SyncError> {
        (**self).next().await
    }
}

// == Channel Feed ==
/// Sending half of a [`ChannelFeed`]. Sending an `Err` simulates a transport failure.
pub type FeedSender = mpsc::Sender<Result<DocumentSnapshot, SyncError>>;

/// Feed backed by an in-process channel; ends when every sender is dropped.
#[derive(Debug)]
pub struct ChannelFeed {
    receiver: mpsc::Receiver<Result<DocumentSnapshot, SyncError>>,
}

impl ChannelFeed {
    /// Creates a feed and the sender that drives it.
    pub fn new(buffer: usize) -> (FeedSender, Self) {
        let (sender, receiver) = mpsc::channel(buffer);
        (sender, Self { receiver })
    }
}

#[async_trait]
impl ChangeFeed for ChannelFeed {
    async fn next(&mut self) -> Result<Option<DocumentSnapshot>, SyncError> {
        self.receiver.recv().await.transpose()
    }
}

// == JSON Lines Feed ==
/// Feed reading one JSON object per line; each object is the document's
/// complete field map. Blank lines are ignored.
///
/// By default the feed ends at end of input. After [`follow`](Self::follow)
/// it instead waits for more lines to be appended, like `tail -f`, and only
/// hands over a line once its terminating newline has been written.
#[derive(Debug)]
pub struct JsonLinesFeed<R> {
    reader: BufReader<R>,
    /// Bytes of the line currently being read, possibly incomplete
    buffer: String,
    document: String,
    line_number: usize,
    /// Poll interval at end of input; `None` ends the feed there
    follow: Option<Duration>,
}

impl<R> JsonLinesFeed<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, document: impl Into<String>) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: String::new(),
            document: document.into(),
            line_number: 0,
            follow: None,
        }
    }

    /// Keeps waiting for appended lines at end of input, checking again every
    /// `poll_interval`. The feed then only ends on error.
    pub fn follow(mut self, poll_interval: Duration) -> Self {
        self.follow = Some(poll_interval);
        self
    }

    /// Reads the next complete line into `buffer`.
    ///
    /// Returns false once input is exhausted and the feed does not follow.
    async fn fill_line(&mut self) -> Result<bool, SyncError> {
        loop {
            let read = self.reader.read_line(&mut self.buffer).await?;
            if self.buffer.ends_with('\n') {
                return Ok(true);
            }

            match self.follow {
                Some(interval) => {
                    if read == 0 {
                        sleep(interval).await;
                    }
                }
                // Unterminated last line still counts
                None if read == 0 => return Ok(!self.buffer.is_empty()),
                None => {}
            }
        }
    }
}

impl JsonLinesFeed<File> {
    /// Reads snapshots from the file at `path`. Combine with
    /// [`follow`](Self::follow) to keep applying snapshots appended later.
    pub async fn open(path: impl AsRef<Path>, document: impl Into<String>) -> Result<Self, SyncError> {
        let file = File::open(path.as_ref()).await?;
        debug!(path = %path.as_ref().display(), "Opened snapshot file");
        Ok(Self::new(file, document))
    }
}

impl JsonLinesFeed<Stdin> {
    /// Reads snapshots from standard input until it is closed.
    pub fn stdin(document: impl Into<String>) -> Self {
        Self::new(tokio::io::stdin(), document)
    }
}

#[async_trait]
impl<R> ChangeFeed for JsonLinesFeed<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next(&mut self) -> Result<Option<DocumentSnapshot>, SyncError> {
        while self.fill_line().await? {
            let raw = std::mem::take(&mut self.buffer);
            self.line_number += 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(line)
                .map_err(|e| SyncError::Decode(format!("line {}: {}", self.line_number, e)))?;

            return match value {
                Value::Object(data) => {
                    trace!(line = self.line_number, fields = data.len(), "Read snapshot");
                    Ok(Some(DocumentSnapshot::new(self.document.clone(), data)))
                }
                other => Err(SyncError::Decode(format!(
                    "line {}: expected a JSON object, got {}",
                    self.line_number,
                    json_kind(&other)
                ))),
            };
        }
        Ok(None)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
