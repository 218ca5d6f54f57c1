//! The reconciler: diffs markdown files on disk against previously indexed
//! state and applies add/update/delete to the owning index.
//!
//! A scan runs once at startup and again whenever the file watcher
//! publishes [`Signal::Scanned`]. Between scans the scanner remembers each
//! file's modification time; only new or changed files are reconverted.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use walkdir::WalkDir;

use crate::index::{Index, IndexEntry, Signal};

use super::markdown::{self, Document};
use super::MARKDOWN_EXTENSION;

/// Counters from one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files touched this pass (converted or deleted).
    pub scanned: usize,
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ScanStats {
    /// Whether the index was mutated and dependents should be notified.
    pub fn changed(&self) -> bool {
        self.added + self.updated + self.deleted > 0
    }
}

/// Errors that abort a scan invocation.
///
/// Per-file problems never surface here; they are logged and the file is
/// retried on the next scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Keeps one index in agreement with one content directory.
pub struct Scanner {
    index: Arc<Index>,
    content_dir: PathBuf,
    /// Relative path -> last observed modification time. Guarded
    /// independently of the index lock; only scan logic touches it.
    seen: Mutex<HashMap<PathBuf, SystemTime>>,
}

impl Scanner {
    pub fn new(index: Arc<Index>, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            index,
            content_dir: content_dir.into(),
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn index(&self) -> &Arc<Index> {
        &self.index
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Walk the content directory and reconcile the index with it.
    ///
    /// A walk error aborts this invocation; everything already applied
    /// stays applied. The caller sorts and publishes
    /// [`Signal::Updated`] when the returned stats report changes.
    pub fn scan(&self) -> Result<ScanStats, ScanError> {
        let mut stats = ScanStats::default();
        let mut walked: HashSet<PathBuf> = HashSet::new();

        for entry in WalkDir::new(&self.content_dir) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MARKDOWN_EXTENSION) {
                continue;
            }
            // Walked paths are tracked relative to the content dir.
            let rel = path
                .strip_prefix(&self.content_dir)
                .unwrap_or(path)
                .to_path_buf();

            let mod_time = match std::fs::metadata(path).and_then(|m| m.modified()) {
                Ok(t) => t,
                Err(e) => {
                    // Gone or unreadable between walk and stat; the delete
                    // pass below will pick it up if it was indexed.
                    tracing::warn!(
                        "[{}] cannot stat {}: {e}",
                        self.index.name(),
                        rel.display()
                    );
                    continue;
                }
            };

            walked.insert(rel.clone());

            let previous = self.seen.lock().get(&rel).copied();
            match previous {
                Some(t) if t == mod_time => {} // unchanged, already indexed
                Some(_) => {
                    if self.convert_and_apply(path, &rel, true) {
                        self.seen.lock().insert(rel, mod_time);
                        stats.scanned += 1;
                        stats.updated += 1;
                    }
                }
                None => {
                    if self.convert_and_apply(path, &rel, false) {
                        self.seen.lock().insert(rel, mod_time);
                        stats.scanned += 1;
                        stats.added += 1;
                    }
                }
            }
        }

        // Anything previously seen but not walked this pass is gone.
        let deleted: Vec<PathBuf> = {
            let seen = self.seen.lock();
            seen.keys().filter(|p| !walked.contains(*p)).cloned().collect()
        };
        for rel in deleted {
            crate::debug_event!(self.index.name(), "removing deleted file", "{}", rel.display());
            if let Err(e) = self.index.delete_entry(&rel.to_string_lossy()) {
                tracing::warn!(
                    "[{}] delete failed for {}: {e}",
                    self.index.name(),
                    rel.display()
                );
            }
            self.seen.lock().remove(&rel);
            stats.scanned += 1;
            stats.deleted += 1;
        }

        Ok(stats)
    }

    /// Convert one file and apply it to the index. Returns whether the file
    /// was successfully indexed; on failure it is logged and left unseen so
    /// the next scan retries it.
    fn convert_and_apply(&self, path: &Path, rel: &Path, is_update: bool) -> bool {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(
                    "[{}] error reading {}: {e}",
                    self.index.name(),
                    rel.display()
                );
                return false;
            }
        };
        let doc = match markdown::convert(&contents) {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(
                    "[{}] error converting {}: {e}",
                    self.index.name(),
                    rel.display()
                );
                return false;
            }
        };

        let entry = self.entry_from_document(rel, doc);
        let result = if is_update {
            self.index.update_entry(entry)
        } else {
            self.index.add_entry(entry)
        };
        if let Err(e) = result {
            tracing::warn!(
                "[{}] error indexing {}: {e}",
                self.index.name(),
                rel.display()
            );
            return false;
        }
        crate::debug_event!(self.index.name(), "indexed", "{}", rel.display());
        true
    }

    /// Map a converted document onto an index entry.
    fn entry_from_document(&self, rel: &Path, doc: Document) -> IndexEntry {
        let rel_str = rel.to_string_lossy().to_string();
        let stem = rel_str
            .strip_suffix(&format!(".{MARKDOWN_EXTENSION}"))
            .unwrap_or(&rel_str)
            .to_string();

        let fm = doc.front_matter;
        let title = fm.title.unwrap_or_else(|| stem.clone());
        let short_title = fm.short_title.unwrap_or_else(|| title.clone());
        let slug = markdown::slugify(&title);
        let path = format!("/{slug}");

        IndexEntry {
            id: rel_str.clone(),
            slug,
            title,
            short_title,
            author: fm.author,
            path,
            date: fm.date,
            sort_order: fm.sort_order,
            metadata: fm.extras,
            visible: fm.visible,
            draft: fm.draft,
            hide_author: fm.hide_author,
            hide_title: fm.hide_title,
            tags: fm.tags,
            summary: doc.summary,
            body: doc.body,
            description: fm.description,
            file_name: rel_str,
        }
    }

    /// React to rescan requests for the lifetime of the process.
    ///
    /// Subscribes to the index's broker; each [`Signal::Scanned`] runs a
    /// scan on a blocking task, and any change sorts the index and
    /// publishes [`Signal::Updated`] for dependent caches.
    pub async fn run_rescans(self: Arc<Self>) {
        let mut rx = self.index.broker().subscribe();
        loop {
            match rx.recv().await {
                Ok(Signal::Scanned) => {
                    let scanner = Arc::clone(&self);
                    let result =
                        tokio::task::spawn_blocking(move || scanner.scan()).await;
                    match result {
                        Ok(Ok(stats)) if stats.changed() => {
                            crate::log_event!(
                                self.index.name(),
                                "rescan",
                                "{} new, {} updated, {} deleted",
                                stats.added,
                                stats.updated,
                                stats.deleted
                            );
                            self.index.sort();
                            self.index.broker().publish(Signal::Updated);
                        }
                        Ok(Ok(_)) => {
                            crate::debug_event!(self.index.name(), "rescan", "no changes");
                        }
                        Ok(Err(e)) => {
                            tracing::error!("[{}] scan failed: {e}", self.index.name());
                        }
                        Err(e) => {
                            tracing::error!("[{}] scan task panicked: {e}", self.index.name());
                        }
                    }
                }
                Ok(_) => {} // not for us
                Err(RecvError::Lagged(n)) => {
                    // Missed rescan requests coalesce into the next one.
                    tracing::warn!("[{}] rescan loop lagged by {n}", self.index.name());
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
