//! Entry and signal types shared across the index subsystem.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One piece of published content (a page or blog post).
///
/// `id` is the stable identifier, conventionally the source file path
/// relative to the content directory. `path` is the routable URL path; the
/// index prefixes it with its own root path exactly once, at insert or
/// update time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub short_title: String,
    pub author: String,
    pub path: String,
    pub date: DateTime<Utc>,
    pub sort_order: i64,
    /// Front-matter keys not claimed by a recognized field.
    pub metadata: BTreeMap<String, serde_yaml::Value>,
    pub visible: bool,
    pub draft: bool,
    pub hide_author: bool,
    pub hide_title: bool,
    pub tags: Vec<String>,
    /// Rendered HTML up to the `<!--more-->` marker, or the full body.
    pub summary: String,
    /// Full rendered HTML body.
    pub body: String,
    /// Plain-text description for feeds and meta tags.
    pub description: String,
    /// Source file name, used by the admin editor for raw re-reads.
    pub file_name: String,
}

/// How an index orders its entries when [`crate::Index::sort`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Ascending by `sort_order` (pages).
    SortOrder,
    /// Descending by `date`, newest first (blog).
    Date,
}

/// Change signals flowing through an index's broker.
///
/// Signals carry no payload; the broker they arrive on identifies the index
/// they refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The index's contents changed; derived state is stale.
    Updated,
    /// The watcher requests a rescan of the content directory.
    Scanned,
    /// Clear a cache entirely (used by the template cache).
    Reset,
}
