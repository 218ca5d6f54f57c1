//! Create-or-get registry of indices, keyed by name.
//!
//! Constructed once at startup and passed through the composition root to
//! whatever needs to resolve an index by name (the admin layer, mostly).
//! There is deliberately no process-wide global.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::entry::SortMode;
use super::store::Index;

/// Registry of [`Index`] instances, one per content group.
#[derive(Default)]
pub struct IndexRegistry {
    indices: RwLock<HashMap<String, Arc<Index>>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index under `name`, or return the existing one.
    ///
    /// A second create under the same name is a wiring mistake, not a
    /// runtime failure: it is logged and the original instance (with its
    /// original root path and sort mode) is returned.
    pub fn create(
        &self,
        name: &str,
        root_path: impl Into<String>,
        sort_mode: SortMode,
    ) -> Arc<Index> {
        let mut indices = self.indices.write();
        if let Some(existing) = indices.get(name) {
            tracing::error!("[registry] index already exists: {name}");
            return Arc::clone(existing);
        }
        let index = Arc::new(Index::new(name, root_path, sort_mode));
        indices.insert(name.to_string(), Arc::clone(&index));
        index
    }

    pub fn get(&self, name: &str) -> Option<Arc<Index>> {
        self.indices.read().get(name).map(Arc::clone)
    }

    /// Names of all registered indices, sorted for stable listings.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indices.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get() {
        let registry = IndexRegistry::new();
        let idx = registry.create("pages", "/page", SortMode::SortOrder);
        assert_eq!(idx.name(), "pages");

        let found = registry.get("pages").unwrap();
        assert!(Arc::ptr_eq(&idx, &found));
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn second_create_returns_existing_instance() {
        let registry = IndexRegistry::new();
        let first = registry.create("blog", "/blog", SortMode::Date);
        let second = registry.create("blog", "/elsewhere", SortMode::SortOrder);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.root_path(), "/blog");
        assert_eq!(second.sort_mode(), SortMode::Date);
    }

    #[test]
    fn names_are_sorted() {
        let registry = IndexRegistry::new();
        registry.create("pages", "/page", SortMode::SortOrder);
        registry.create("blog", "/blog", SortMode::Date);
        assert_eq!(registry.names(), ["blog", "pages"]);
    }
}
