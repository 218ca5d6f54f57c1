use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use hubro::cache::{FeedCache, FeedOptions, TagCloudCache};
use hubro::index::{Index, IndexRegistry, Signal, SortMode};
use hubro::{ContentWatcher, Scanner, Settings, log_event};

#[derive(Parser)]
#[command(name = "hubro")]
#[command(about = "Markdown publishing server core: indexes content and keeps it live")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "hubro.toml")]
    config: PathBuf,

    /// Override the pages directory
    #[arg(long)]
    pages_dir: Option<PathBuf>,

    /// Override the blog directory
    #[arg(long)]
    blog_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load_from(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(dir) = cli.pages_dir {
        settings.pages_dir = dir;
    }
    if let Some(dir) = cli.blog_dir {
        settings.blog_dir = dir;
    }

    hubro::logging::init_with_config(&settings.logging);
    log_event!("hubro", "starting");

    let root_path = settings.resolved_root_path();
    let registry = Arc::new(IndexRegistry::new());

    let pages = start_content_group(
        &registry,
        "pages",
        format!("{root_path}page"),
        SortMode::SortOrder,
        settings.pages_dir.clone(),
        settings.watch.debounce_ms,
    );
    let blog = start_content_group(
        &registry,
        "blog",
        format!("{root_path}blog"),
        SortMode::Date,
        settings.blog_dir.clone(),
        settings.watch.debounce_ms,
    );

    let tag_cloud = Arc::new(TagCloudCache::new(root_path.clone()));
    let _pages_cloud_task = tag_cloud.spawn_invalidator(&pages);
    let _blog_cloud_task = tag_cloud.spawn_invalidator(&blog);

    if settings.feeds_enabled {
        let feeds = Arc::new(FeedCache::new(FeedOptions {
            base_url: settings.base_url.clone(),
            title: settings.title.clone(),
            description: settings.description.clone(),
            author_name: settings.author_name.clone(),
            author_email: settings.author_email.clone(),
            display_author: settings.display_author_in_feed,
        }));
        let _feed_task = feeds.spawn_rebuilder(&blog);
    }

    log_event!(
        "hubro",
        "ready",
        "{} pages, {} posts in {:.1?}",
        pages.count(),
        blog.count(),
        start.elapsed()
    );

    tokio::signal::ctrl_c().await?;
    log_event!("hubro", "shutting down");
    Ok(())
}

/// Wire one content group: index, initial scan, rescan loop, and watcher.
fn start_content_group(
    registry: &Arc<IndexRegistry>,
    name: &str,
    route_prefix: String,
    sort_mode: SortMode,
    dir: PathBuf,
    debounce_ms: u64,
) -> Arc<Index> {
    let index = registry.create(name, route_prefix, sort_mode);
    let scanner = Arc::new(Scanner::new(Arc::clone(&index), dir.clone()));

    // A failed initial scan leaves the group empty until the next rescan;
    // it does not take the process down.
    match scanner.scan() {
        Ok(stats) => {
            index.sort();
            if stats.changed() {
                index.broker().publish(Signal::Updated);
            }
            log_event!(name, "indexed", "{} files from {}", stats.added, dir.display());
        }
        Err(e) => {
            tracing::error!("[{name}] initial scan of {} failed: {e}", dir.display());
        }
    }

    let _ = tokio::spawn(Arc::clone(&scanner).run_rescans());

    // A directory that cannot be watched still serves its indexed content;
    // it just will not pick up live edits.
    match ContentWatcher::new(&dir, Arc::clone(&index), debounce_ms) {
        Ok(watcher) => {
            let _ = tokio::spawn(watcher.watch());
        }
        Err(e) => {
            tracing::error!("[{name}] cannot watch {}: {e}", dir.display());
        }
    }

    index
}
