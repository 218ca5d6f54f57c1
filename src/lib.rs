pub mod broker;
pub mod cache;
pub mod config;
pub mod content;
pub mod index;
pub mod logging;
pub mod watcher;

pub use broker::Broker;
pub use config::Settings;
pub use content::{ScanStats, Scanner, SourceStore};
pub use index::{Index, IndexEntry, IndexError, IndexRegistry, Signal, SortMode};
pub use watcher::{ContentWatcher, Debouncer, WatchError};
