//! Caches derived from index contents.
//!
//! Each cache subscribes to an index's broker and treats its stored output
//! as stale when [`crate::Signal::Updated`] arrives. Recomputation is lazy
//! (tag cloud, templates) or eager (feed), matching how cheap the rebuild
//! is relative to how often the output is served.

mod feed;
mod tag_cloud;
mod templates;

pub use feed::{Feed, FeedCache, FeedItem, FeedOptions};
pub use tag_cloud::{tag_counts, TagCloudCache};
pub use templates::TemplateCache;
