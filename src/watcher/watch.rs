//! The notify-based watch loop behind live re-indexing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use walkdir::WalkDir;

use crate::index::{Index, Signal};

use super::debouncer::Debouncer;
use super::error::WatchError;

/// How often the loop polls the debouncer between events.
const POLL_INTERVAL_MS: u64 = 100;

/// Watches one content directory tree and publishes [`Signal::Scanned`]
/// on the owning index's broker after each quiet period.
///
/// Watches are registered per directory; directories created while
/// running are picked up from their create events. The loop runs for the
/// process lifetime; steady-state errors are logged and do not stop it.
pub struct ContentWatcher {
    index: Arc<Index>,
    root: PathBuf,
    debouncer: Debouncer,
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    watcher: notify::RecommendedWatcher,
}

impl ContentWatcher {
    /// Set up watches for `root` and every subdirectory under it.
    ///
    /// Failing to watch the root is fatal to this watcher; a subdirectory
    /// that cannot be watched is logged and skipped.
    pub fn new(
        root: impl Into<PathBuf>,
        index: Arc<Index>,
        debounce_ms: u64,
    ) -> Result<Self, WatchError> {
        let root = root.into();

        let (tx, rx) = mpsc::channel(100);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        watcher
            .watch(&root, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: root.clone(),
                reason: e.to_string(),
            })?;

        for entry in WalkDir::new(&root).min_depth(1) {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {
                    if let Err(e) = watcher.watch(entry.path(), RecursiveMode::NonRecursive) {
                        tracing::warn!(
                            "[watcher] failed to watch {}: {e}",
                            entry.path().display()
                        );
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("[watcher] error walking {}: {e}", root.display());
                }
            }
        }

        Ok(Self {
            index,
            root,
            debouncer: Debouncer::new(debounce_ms),
            event_rx: rx,
            watcher,
        })
    }

    /// Run the event loop for the process lifetime.
    pub async fn watch(mut self) {
        crate::log_event!("watcher", "started", "{}", self.root.display());

        loop {
            tokio::select! {
                maybe = self.event_rx.recv() => match maybe {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => {
                        tracing::error!("[watcher] event error: {e}");
                    }
                    None => break,
                },

                _ = sleep(Duration::from_millis(POLL_INTERVAL_MS)) => {
                    if self.debouncer.take_ready() {
                        crate::log_event!(
                            self.index.name(),
                            "requesting rescan",
                            "{}",
                            self.root.display()
                        );
                        self.index.broker().publish(Signal::Scanned);
                    }
                }
            }
        }

        crate::debug_event!("watcher", "stopped", "{}", self.root.display());
    }

    fn handle_event(&mut self, event: Event) {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            return;
        }

        for path in &event.paths {
            // A path that disappeared between event and stat is a removal;
            // it still counts toward the debounced rescan.
            if matches!(event.kind, EventKind::Create(_)) && path.is_dir() {
                self.watch_new_directory(path);
            }
        }

        self.debouncer.record();
    }

    fn watch_new_directory(&mut self, path: &Path) {
        crate::log_event!("watcher", "watching new directory", "{}", path.display());
        if let Err(e) = self.watcher.watch(path, RecursiveMode::NonRecursive) {
            tracing::error!("[watcher] failed to watch {}: {e}", path.display());
        }
    }
}
