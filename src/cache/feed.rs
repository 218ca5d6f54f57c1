//! Feed snapshots rebuilt from index contents.
//!
//! The snapshot is a plain serializable struct; turning it into RSS/Atom
//! XML is the HTTP layer's problem. Rebuilds are eager on
//! [`Signal::Updated`] because feeds are requested far more often than
//! content changes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::index::{Index, Signal};

#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub created: DateTime<Utc>,
    /// Summary HTML.
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<FeedAuthor>,
    pub created: DateTime<Utc>,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedAuthor {
    pub name: String,
    pub email: String,
}

/// Site-level feed settings, from [`crate::Settings`].
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub base_url: String,
    pub title: String,
    pub description: String,
    pub author_name: String,
    pub author_email: String,
    pub display_author: bool,
}

/// Build a feed snapshot from the index's current entries.
///
/// Entry order is the index's order, so callers sort before notifying.
/// Drafts and hidden entries are excluded.
pub fn feed_from_index(index: &Index, opts: &FeedOptions) -> Feed {
    let view = index.read();
    let base = opts.base_url.trim_end_matches('/');

    let items: Vec<FeedItem> = view
        .entries()
        .iter()
        .filter(|e| e.visible && !e.draft)
        .map(|e| FeedItem {
            title: e.title.clone(),
            link: format!("{base}{}", e.path),
            description: e.description.clone(),
            created: e.date,
            content: e.summary.clone(),
        })
        .collect();

    Feed {
        title: opts.title.clone(),
        link: opts.base_url.clone(),
        description: opts.description.clone(),
        author: opts.display_author.then(|| FeedAuthor {
            name: opts.author_name.clone(),
            email: opts.author_email.clone(),
        }),
        created: items.first().map(|i| i.created).unwrap_or_default(),
        items,
    }
}

/// Eagerly maintained feed snapshots, keyed by index name.
pub struct FeedCache {
    opts: FeedOptions,
    feeds: RwLock<HashMap<String, Feed>>,
}

impl FeedCache {
    pub fn new(opts: FeedOptions) -> Self {
        Self {
            opts,
            feeds: RwLock::new(HashMap::new()),
        }
    }

    /// Current snapshot for an index, if one has been built.
    pub fn get(&self, index_name: &str) -> Option<Feed> {
        self.feeds.read().get(index_name).cloned()
    }

    /// Rebuild the snapshot for an index now.
    pub fn rebuild(&self, index: &Index) {
        let feed = feed_from_index(index, &self.opts);
        self.feeds
            .write()
            .insert(index.name().to_string(), feed);
    }

    /// Build the initial snapshot and keep it fresh on every
    /// [`Signal::Updated`].
    pub fn spawn_rebuilder(self: &Arc<Self>, index: &Arc<Index>) -> JoinHandle<()> {
        self.rebuild(index);
        let cache = Arc::clone(self);
        let index = Arc::clone(index);
        let mut rx = index.broker().subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(Signal::Updated) => {
                        crate::debug_event!("feed", "rebuilding", "{}", index.name());
                        cache.rebuild(&index);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(_)) => cache.rebuild(&index),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
