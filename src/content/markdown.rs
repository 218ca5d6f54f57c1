//! Markdown-to-HTML conversion with front-matter extraction.
//!
//! The converter itself is `pulldown-cmark`; this module only splits off
//! the fenced YAML block, renders the remainder, and derives the summary
//! and slug the rest of the system keys on.

use pulldown_cmark::{Options, Parser, html};
use thiserror::Error;

use super::front_matter::FrontMatter;

/// Marks the end of the summary inside a rendered body.
pub const SUMMARY_MARKER: &str = "<!--more-->";

const FENCE: &str = "---";

/// Result of converting one content file.
#[derive(Debug, Clone)]
pub struct Document {
    pub front_matter: FrontMatter,
    /// Full rendered HTML body.
    pub body: String,
    /// HTML up to the first `<!--more-->`, or the full body.
    pub summary: String,
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("front matter is missing its closing `---` fence")]
    MissingEndFence,

    #[error("invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
}

/// Convert raw file contents into a [`Document`].
pub fn convert(input: &str) -> Result<Document, ConvertError> {
    let (yaml, markdown) = split_front_matter(input)?;
    let front_matter = FrontMatter::parse(yaml)?;
    let body = render_html(markdown);

    let summary = match body.split_once(SUMMARY_MARKER) {
        Some((before, _)) if !before.is_empty() => before.to_string(),
        _ => body.clone(),
    };

    Ok(Document {
        front_matter,
        body,
        summary,
    })
}

/// Render markdown to HTML with the GFM-ish extensions enabled.
pub fn render_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Derive a URL-safe slug from a title.
pub fn slugify(title: &str) -> String {
    slug::slugify(title)
}

/// Split `input` into (yaml, markdown).
///
/// A file without an opening fence has no front matter; an opening fence
/// without a closing one is malformed.
fn split_front_matter(input: &str) -> Result<(&str, &str), ConvertError> {
    let Some(rest) = input.strip_prefix(FENCE) else {
        return Ok(("", input));
    };
    match rest.find(FENCE) {
        Some(offset) => Ok((&rest[..offset], &rest[offset + FENCE.len()..])),
        None => Err(ConvertError::MissingEndFence),
    }
}
