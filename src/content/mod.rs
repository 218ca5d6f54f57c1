//! Markdown content handling: front-matter parsing, conversion to HTML,
//! and the reconciler that keeps an [`crate::Index`] in agreement with the
//! files on disk.

mod front_matter;
mod markdown;
mod scanner;
mod source;

pub use front_matter::FrontMatter;
pub use markdown::{ConvertError, Document, convert, render_html, slugify};
pub use scanner::{ScanError, ScanStats, Scanner};
pub use source::{SourceError, SourceStore};

/// File extension the reconciler and source store consider content.
pub const MARKDOWN_EXTENSION: &str = "md";
