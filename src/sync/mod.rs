//! Live Sync Module
//!
//! Keeps a cache synchronized with a remote document's change feed.
//!
//! A [`ChangeFeed`] yields successive [`DocumentSnapshot`]s of one document.
//! [`LiveCache::listen`] applies each snapshot's fields to the cache in the
//! background and returns once the first one has landed.

mod decode;
mod feed;
mod live;

pub use decode::{decode_fields, MismatchPolicy};
pub use feed::{ChangeFeed, ChannelFeed, DocumentSnapshot, FeedConfig, FeedSender, JsonLinesFeed};
pub use live::{LiveCache, SyncHandle};
