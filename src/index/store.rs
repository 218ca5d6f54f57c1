//! The lock-guarded entry store behind each content group.

use std::collections::HashMap;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::broker::Broker;

use super::entry::{IndexEntry, Signal, SortMode};
use super::error::IndexError;

/// Capacity of the per-index signal broker. Signals are coalescable, so a
/// small backlog is plenty.
const BROKER_CAPACITY: usize = 16;

/// Ordered, thread-safe collection of [`IndexEntry`] for one content group.
///
/// All mutating operations take an exclusive lock covering the ordered
/// sequence and both lookup maps, so readers never observe them out of
/// sync. Individual calls are atomic; a batch of calls is not, so a reader
/// between two writes may see a partially applied batch.
///
/// Mutations do not publish anything themselves. Callers sort and publish
/// [`Signal::Updated`] once per batch.
pub struct Index {
    name: String,
    root_path: String,
    sort_mode: SortMode,
    inner: RwLock<Inner>,
    broker: Broker<Signal>,
}

#[derive(Default)]
struct Inner {
    entries: Vec<IndexEntry>,
    /// id -> position in `entries`.
    by_id: HashMap<String, usize>,
    /// slug -> id. Slug collisions are last-write-wins (logged).
    by_slug: HashMap<String, String>,
}

impl Inner {
    fn rebuild_positions(&mut self) {
        for (pos, entry) in self.entries.iter().enumerate() {
            self.by_id.insert(entry.id.clone(), pos);
        }
    }

    fn map_slug(&mut self, name: &str, entry: &IndexEntry) {
        if let Some(other) = self.by_slug.get(&entry.slug) {
            if other != &entry.id {
                tracing::warn!(
                    "[{name}] slug collision: {} now resolves to {} (was {other})",
                    entry.slug,
                    entry.id
                );
            }
        }
        self.by_slug.insert(entry.slug.clone(), entry.id.clone());
    }
}

impl Index {
    /// Create an empty index. `root_path` is prefixed onto every entry's
    /// path at insert/update time.
    pub fn new(name: impl Into<String>, root_path: impl Into<String>, sort_mode: SortMode) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
            sort_mode,
            inner: RwLock::new(Inner::default()),
            broker: Broker::new(BROKER_CAPACITY),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// The broker carrying this index's change signals.
    pub fn broker(&self) -> &Broker<Signal> {
        &self.broker
    }

    /// Add a new entry.
    ///
    /// Fails if the id is empty or already present. On success the entry's
    /// path has been prefixed with the index root path.
    pub fn add_entry(&self, mut entry: IndexEntry) -> Result<(), IndexError> {
        if entry.id.is_empty() {
            return Err(IndexError::EmptyId);
        }
        let mut inner = self.inner.write();
        if inner.by_id.contains_key(&entry.id) {
            return Err(IndexError::DuplicateId { id: entry.id });
        }
        entry.path = format!("{}{}", self.root_path, entry.path);
        inner.map_slug(&self.name, &entry);
        let pos = inner.entries.len();
        inner.by_id.insert(entry.id.clone(), pos);
        inner.entries.push(entry);
        Ok(())
    }

    /// Replace an existing entry in place, keeping its position in the
    /// ordered sequence.
    pub fn update_entry(&self, mut entry: IndexEntry) -> Result<(), IndexError> {
        if entry.id.is_empty() {
            return Err(IndexError::EmptyId);
        }
        let mut inner = self.inner.write();
        let Some(&pos) = inner.by_id.get(&entry.id) else {
            return Err(IndexError::NotFound { id: entry.id });
        };
        entry.path = format!("{}{}", self.root_path, entry.path);

        // Drop the old slug mapping unless another entry has since claimed it.
        let old_slug = inner.entries[pos].slug.clone();
        if old_slug != entry.slug && inner.by_slug.get(&old_slug) == Some(&entry.id) {
            inner.by_slug.remove(&old_slug);
        }
        inner.map_slug(&self.name, &entry);
        inner.entries[pos] = entry;
        Ok(())
    }

    /// Remove an entry by id.
    pub fn delete_entry(&self, id: &str) -> Result<(), IndexError> {
        let mut inner = self.inner.write();
        let Some(pos) = inner.by_id.remove(id) else {
            return Err(IndexError::NotFound { id: id.to_string() });
        };
        tracing::info!("[{}] deleting entry: {id}", self.name);
        let removed = inner.entries.remove(pos);
        if inner.by_slug.get(&removed.slug) == Some(&removed.id) {
            inner.by_slug.remove(&removed.slug);
        }
        // Entries after the removed slot shifted down by one.
        for p in inner.by_id.values_mut() {
            if *p > pos {
                *p -= 1;
            }
        }
        Ok(())
    }

    /// Look up an entry by id. Absence is not an error.
    pub fn get_entry(&self, id: &str) -> Option<IndexEntry> {
        let inner = self.inner.read();
        inner.by_id.get(id).map(|&pos| inner.entries[pos].clone())
    }

    /// Look up an entry by slug.
    pub fn get_entry_by_slug(&self, slug: &str) -> Option<IndexEntry> {
        let inner = self.inner.read();
        let id = inner.by_slug.get(slug)?;
        inner.by_id.get(id).map(|&pos| inner.entries[pos].clone())
    }

    /// Snapshot of all entries in their current order.
    pub fn entries(&self) -> Vec<IndexEntry> {
        self.inner.read().entries.clone()
    }

    pub fn count(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Reorder entries according to the configured sort mode.
    ///
    /// Not triggered by CRUD; callers invoke this once after a batch of
    /// mutations. Both modes sort stably.
    pub fn sort(&self) {
        let mut inner = self.inner.write();
        match self.sort_mode {
            SortMode::SortOrder => inner.entries.sort_by_key(|e| e.sort_order),
            SortMode::Date => inner.entries.sort_by(|a, b| b.date.cmp(&a.date)),
        }
        inner.by_id.clear();
        inner.rebuild_positions();
    }

    /// Take a read guard for multi-step consistent reads.
    ///
    /// Writers are blocked while the guard is held; keep the scope short.
    pub fn read(&self) -> IndexReadGuard<'_> {
        IndexReadGuard {
            guard: self.inner.read(),
        }
    }
}

/// Shared-lock view over an index, for callers that need several reads to
/// observe one consistent state.
pub struct IndexReadGuard<'a> {
    guard: RwLockReadGuard<'a, Inner>,
}

impl IndexReadGuard<'_> {
    pub fn entries(&self) -> &[IndexEntry] {
        &self.guard.entries
    }

    pub fn get_entry(&self, id: &str) -> Option<&IndexEntry> {
        self.guard.by_id.get(id).map(|&pos| &self.guard.entries[pos])
    }

    pub fn get_entry_by_slug(&self, slug: &str) -> Option<&IndexEntry> {
        let id = self.guard.by_slug.get(slug)?;
        self.guard.by_id.get(id).map(|&pos| &self.guard.entries[pos])
    }

    pub fn count(&self) -> usize {
        self.guard.entries.len()
    }
}
