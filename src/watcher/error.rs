//! Error types for the content watcher.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher setup.
///
/// Setup failures are fatal to that watcher instance, never to the
/// process; steady-state event errors are logged inside the watch loop.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("cannot watch path {}: {reason}", path.display())]
    PathWatchFailed { path: PathBuf, reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
