//! In-memory content index: one ordered, lockable collection of entries per
//! content group ("pages", "blog"), with id and slug lookup.
//!
//! The index is the authoritative store the rest of the system reads from.
//! The reconciler mutates it as markdown files change on disk; dependent
//! caches subscribe to its broker and invalidate on [`Signal::Updated`].

mod entry;
mod error;
mod registry;
mod store;

pub use entry::{IndexEntry, Signal, SortMode};
pub use error::IndexError;
pub use registry::IndexRegistry;
pub use store::{Index, IndexReadGuard};
