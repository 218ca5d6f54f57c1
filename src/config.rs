//! Layered configuration for the server core.
//!
//! Values resolve defaults → `hubro.toml` → environment. Environment
//! variables use the `HUBRO_` prefix with double underscores between
//! nested levels:
//! - `HUBRO_BLOG_DIR=./content/blog` sets `blog_dir`
//! - `HUBRO_WATCH__DEBOUNCE_MS=250` sets `watch.debounce_ms`
//! - `HUBRO_LOGGING__DEFAULT=debug` sets `logging.default`

use std::collections::HashMap;
use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Public base URL of the site; its path component becomes the root
    /// path prefixed onto every routed entry.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// URL prefix applied to all content routes.
    #[serde(default = "default_root_path")]
    pub root_path: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,

    /// Directory of standalone pages (sorted by sortOrder).
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,

    /// Directory of blog posts (sorted by date).
    #[serde(default = "default_blog_dir")]
    pub blog_dir: PathBuf,

    #[serde(default = "default_true")]
    pub feeds_enabled: bool,

    #[serde(default = "default_false")]
    pub display_author_in_feed: bool,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Quiet period before a burst of file events triggers one rescan.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level.
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `watcher = "debug"`.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_root_path() -> String {
    "/".to_string()
}

fn default_title() -> String {
    "Hubro".to_string()
}

fn default_description() -> String {
    "Hubro is a simple blog engine".to_string()
}

fn default_author_name() -> String {
    "Anonymous".to_string()
}

fn default_author_email() -> String {
    "anonymous@example.org".to_string()
}

fn default_pages_dir() -> PathBuf {
    PathBuf::from("./pages")
}

fn default_blog_dir() -> PathBuf {
    PathBuf::from("./blog")
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            root_path: default_root_path(),
            title: default_title(),
            description: default_description(),
            author_name: default_author_name(),
            author_email: default_author_email(),
            pages_dir: default_pages_dir(),
            blog_dir: default_blog_dir(),
            feeds_enabled: true,
            display_author_in_feed: false,
            watch: WatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from a specific file.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("HUBRO_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Path component of the base URL, used when `root_path` is left at
    /// its default.
    pub fn resolved_root_path(&self) -> String {
        if self.root_path != default_root_path() {
            return self.root_path.clone();
        }
        match url_path(&self.base_url) {
            Some(path) if !path.is_empty() => path,
            _ => self.root_path.clone(),
        }
    }
}

/// Extract the path from a URL without pulling in a URL crate: everything
/// after the authority, up to any query or fragment.
fn url_path(url: &str) -> Option<String> {
    let after_scheme = url.split_once("://").map(|(_, rest)| rest)?;
    let path_start = after_scheme.find('/')?;
    let path = &after_scheme[path_start..];
    let path = path.split(['?', '#']).next().unwrap_or(path);
    Some(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.watch.debounce_ms, 500);
        assert_eq!(settings.root_path, "/");
        assert!(settings.feeds_enabled);
    }

    #[test]
    fn root_path_falls_back_to_base_url_path() {
        let mut settings = Settings::default();
        settings.base_url = "https://example.org/blog/".to_string();
        assert_eq!(settings.resolved_root_path(), "/blog/");

        settings.root_path = "/explicit/".to_string();
        assert_eq!(settings.resolved_root_path(), "/explicit/");
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hubro.toml");
        std::fs::write(
            &path,
            "title = \"My Site\"\n\n[watch]\ndebounce_ms = 250\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.title, "My Site");
        assert_eq!(settings.watch.debounce_ms, 250);
        // Untouched fields keep their defaults.
        assert_eq!(settings.author_name, "Anonymous");
    }
}
