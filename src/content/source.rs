//! Raw-source access for the admin editor.
//!
//! The editor reads an entry's `file_name` to fetch markdown for editing
//! and writes changes straight back to disk. Nothing here mutates the
//! index: the watcher notices the write and the next scan re-indexes it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use super::markdown::slugify;
use super::MARKDOWN_EXTENSION;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("no such file: {file}")]
    NotFound { file: String },

    #[error("file already exists: {file}")]
    AlreadyExists { file: String },

    #[error("file name escapes the content directory: {file}")]
    InvalidFileName { file: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Filesystem access to one content directory's raw markdown.
pub struct SourceStore {
    dir: PathBuf,
}

impl SourceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a file's raw markdown.
    pub fn load(&self, file_name: &str) -> Result<String, SourceError> {
        let path = self.resolve(file_name)?;
        std::fs::read_to_string(path).map_err(|e| self.not_found_or(e, file_name))
    }

    /// Overwrite an existing file. Saving a file that was never indexed is
    /// refused so typos do not create strays.
    pub fn save(&self, file_name: &str, contents: &str) -> Result<(), SourceError> {
        let path = self.resolve(file_name)?;
        if !path.is_file() {
            return Err(SourceError::NotFound {
                file: file_name.to_string(),
            });
        }
        std::fs::write(&path, contents)?;
        crate::log_event!("source", "saved", "{}", path.display());
        Ok(())
    }

    /// Create a draft skeleton named `YYYY-MM-DD-<slug>.md` and return the
    /// file name.
    pub fn create(&self, title: &str, author: &str) -> Result<String, SourceError> {
        let date = Local::now().format("%Y-%m-%d").to_string();
        let file_name = format!("{date}-{}.{MARKDOWN_EXTENSION}", slugify(title));
        let path = self.resolve(&file_name)?;
        if path.exists() {
            return Err(SourceError::AlreadyExists { file: file_name });
        }
        let skeleton =
            format!("---\ntitle: {title}\ndate: {date}\nauthor: {author}\ndraft: true\n---\n");
        std::fs::write(&path, skeleton)?;
        crate::log_event!("source", "created", "{}", path.display());
        Ok(file_name)
    }

    fn resolve(&self, file_name: &str) -> Result<PathBuf, SourceError> {
        let rel = Path::new(file_name);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(SourceError::InvalidFileName {
                file: file_name.to_string(),
            });
        }
        Ok(self.dir.join(rel))
    }

    fn not_found_or(&self, e: std::io::Error, file_name: &str) -> SourceError {
        if e.kind() == ErrorKind::NotFound {
            SourceError::NotFound {
                file: file_name.to_string(),
            }
        } else {
            SourceError::Io(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_and_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("post.md"), "original").unwrap();
        let store = SourceStore::new(dir.path());

        assert_eq!(store.load("post.md").unwrap(), "original");
        store.save("post.md", "edited").unwrap();
        assert_eq!(store.load("post.md").unwrap(), "edited");
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let store = SourceStore::new(TempDir::new().unwrap().path());
        assert!(matches!(
            store.load("ghost.md"),
            Err(SourceError::NotFound { .. })
        ));
    }

    #[test]
    fn save_refuses_unknown_file() {
        let store = SourceStore::new(TempDir::new().unwrap().path());
        assert!(matches!(
            store.save("new.md", "content"),
            Err(SourceError::NotFound { .. })
        ));
    }

    #[test]
    fn create_writes_draft_skeleton_once() {
        let dir = TempDir::new().unwrap();
        let store = SourceStore::new(dir.path());

        let file = store.create("My First Post", "Ola").unwrap();
        assert!(file.ends_with("-my-first-post.md"));
        let contents = store.load(&file).unwrap();
        assert!(contents.contains("title: My First Post"));
        assert!(contents.contains("draft: true"));

        assert!(matches!(
            store.create("My First Post", "Ola"),
            Err(SourceError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn parent_traversal_is_rejected() {
        let store = SourceStore::new(TempDir::new().unwrap().path());
        assert!(matches!(
            store.load("../outside.md"),
            Err(SourceError::InvalidFileName { .. })
        ));
    }
}
