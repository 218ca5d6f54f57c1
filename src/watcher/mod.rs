//! File-system watching for live re-indexing.
//!
//! A [`ContentWatcher`] turns bursts of low-level filesystem events into a
//! single coarse "rescan requested" signal on the owning index's broker:
//!
//! ```text
//! notify events ──> Debouncer (quiet period) ──> Signal::Scanned
//! ```
//!
//! Editors and sync tools produce several events per logical save;
//! debouncing avoids redundant rescans and markdown reconversion.

mod debouncer;
mod error;
mod watch;

pub use debouncer::Debouncer;
pub use error::WatchError;
pub use watch::ContentWatcher;
