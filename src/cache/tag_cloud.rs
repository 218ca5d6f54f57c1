//! Tag cloud generation with per-index caching.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::index::{Index, Signal};

/// Text size buckets, smallest to largest.
const SIZE_CLASSES: [&str; 8] = [
    "text-xs", "text-sm", "text-base", "text-lg", "text-xl", "text-2xl", "text-3xl", "text-4xl",
];

/// Count tag occurrences across all entries of an index.
pub fn tag_counts(index: &Index) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in index.read().entries() {
        for tag in &entry.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Lazily rebuilt HTML tag clouds, keyed by index name.
pub struct TagCloudCache {
    /// Link prefix for tag filter URLs.
    root_path: String,
    clouds: RwLock<HashMap<String, String>>,
}

impl TagCloudCache {
    pub fn new(root_path: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            clouds: RwLock::new(HashMap::new()),
        }
    }

    /// Get the cloud for an index, rendering and caching it on a miss.
    pub fn html_for(&self, index: &Index) -> String {
        if let Some(cached) = self.clouds.read().get(index.name()) {
            return cached.clone();
        }
        let html = self.render(index);
        self.clouds
            .write()
            .insert(index.name().to_string(), html.clone());
        html
    }

    /// Drop all cached clouds.
    pub fn clear(&self) {
        self.clouds.write().clear();
    }

    fn render(&self, index: &Index) -> String {
        let counts = tag_counts(index);
        let max = counts.values().copied().max().unwrap_or(0);
        if max == 0 {
            return String::new();
        }

        // count is at least 1, so the bucket index stays in range.
        let size_class =
            |count: usize| SIZE_CLASSES[((count - 1) * SIZE_CLASSES.len()) / max];

        let mut html = String::new();
        for (tag, count) in &counts {
            let _ = writeln!(
                html,
                r#"<span class="{}"><a data-hx-boost="true" href="{}?tag={tag}">{tag}</a></span>"#,
                size_class(*count),
                self.root_path,
            );
        }
        html
    }

    /// Clear the cache whenever the index reports a content change.
    pub fn spawn_invalidator(self: &Arc<Self>, index: &Arc<Index>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        let mut rx = index.broker().subscribe();
        let name = index.name().to_string();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(Signal::Updated) => {
                        crate::debug_event!("tag-cloud", "invalidated", "{name}");
                        cache.clear();
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(_)) => cache.clear(),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexEntry, SortMode};

    fn tagged_index() -> Index {
        let idx = Index::new("blog", "/blog", SortMode::Date);
        for (id, tags) in [
            ("a", vec!["rust", "web"]),
            ("b", vec!["rust"]),
            ("c", vec!["rust", "owls"]),
        ] {
            idx.add_entry(IndexEntry {
                id: id.into(),
                slug: id.into(),
                tags: tags.into_iter().map(String::from).collect(),
                ..Default::default()
            })
            .unwrap();
        }
        idx
    }

    #[test]
    fn counts_tags_across_entries() {
        let counts = tag_counts(&tagged_index());
        assert_eq!(counts.get("rust"), Some(&3));
        assert_eq!(counts.get("web"), Some(&1));
        assert_eq!(counts.get("owls"), Some(&1));
    }

    #[test]
    fn renders_sorted_tags_with_scaled_sizes() {
        let cache = TagCloudCache::new("/");
        let html = cache.html_for(&tagged_index());

        // Alphabetical order: owls, rust, web.
        let owls = html.find("owls").unwrap();
        let rust = html.find(">rust<").unwrap();
        assert!(owls < rust);
        // The most frequent tag lands in a larger bucket than a singleton.
        assert!(html.contains(r#"href="/?tag=rust""#));
        assert!(html.contains("text-xs"));
    }

    #[test]
    fn empty_index_renders_nothing() {
        let idx = Index::new("blog", "/", SortMode::Date);
        let cache = TagCloudCache::new("/");
        assert!(cache.html_for(&idx).is_empty());
    }

    #[tokio::test]
    async fn updates_on_either_index_clear_a_shared_cache() {
        use std::time::Duration;

        let pages = Arc::new(Index::new("pages", "/page", SortMode::SortOrder));
        let blog = Arc::new(Index::new("blog", "/blog", SortMode::Date));
        let cache = Arc::new(TagCloudCache::new("/"));
        let _pages_task = cache.spawn_invalidator(&pages);
        let _blog_task = cache.spawn_invalidator(&blog);

        for index in [&pages, &blog] {
            index
                .add_entry(IndexEntry {
                    id: "a.md".into(),
                    slug: "a".into(),
                    tags: vec!["stale".into()],
                    ..Default::default()
                })
                .unwrap();
            cache.html_for(index);
        }

        // A pages-only change must not leave the pages cloud stale.
        pages.broker().publish(Signal::Updated);
        wait_for_clear(&cache, &pages).await;

        cache.html_for(&pages);
        cache.html_for(&blog);
        blog.broker().publish(Signal::Updated);
        wait_for_clear(&cache, &blog).await;

        async fn wait_for_clear(cache: &TagCloudCache, index: &Index) {
            for _ in 0..50 {
                if cache.clouds.read().get(index.name()).is_none() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            panic!("cloud for {} was not invalidated", index.name());
        }
    }

    #[test]
    fn cache_is_reused_until_cleared() {
        let idx = tagged_index();
        let cache = TagCloudCache::new("/");
        let first = cache.html_for(&idx);

        // New content is invisible until the cache is cleared.
        idx.add_entry(IndexEntry {
            id: "d".into(),
            slug: "d".into(),
            tags: vec!["fresh".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(cache.html_for(&idx), first);

        cache.clear();
        assert!(cache.html_for(&idx).contains("fresh"));
    }
}
