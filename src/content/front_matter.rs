//! Typed front-matter schema.
//!
//! The YAML block at the top of a content file is parsed once into this
//! struct: recognized keys are coerced to their expected types with
//! defaults, everything else survives verbatim in `extras`. A key holding a
//! value of the wrong type keeps its default and stays in `extras`, so
//! nothing an author wrote is silently discarded.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde_yaml::Value;

/// Recognized front-matter fields with their defaults applied.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    /// Missing title falls back to the file stem, which only the caller
    /// knows; hence optional here.
    pub title: Option<String>,
    /// Defaults to the resolved title.
    pub short_title: Option<String>,
    pub description: String,
    pub author: String,
    /// Defaults to true; forced false while `draft` is set.
    pub visible: bool,
    pub draft: bool,
    pub sort_order: i64,
    pub hide_author: bool,
    pub hide_title: bool,
    pub tags: Vec<String>,
    /// Parsed from an ISO `YYYY-MM-DD` string; epoch when absent or
    /// unparseable.
    pub date: DateTime<Utc>,
    /// Unrecognized or wrongly-typed keys, preserved verbatim.
    pub extras: BTreeMap<String, Value>,
}

impl FrontMatter {
    /// Parse a YAML front-matter block.
    ///
    /// An empty or whitespace-only block yields all defaults. Malformed
    /// YAML is an error (the file is skipped for this pass).
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::with_defaults(BTreeMap::new()));
        }
        let mapping: BTreeMap<String, Value> = serde_yaml::from_str(yaml)?;
        Ok(Self::with_defaults(mapping))
    }

    fn with_defaults(mut extras: BTreeMap<String, Value>) -> Self {
        let title = take_string(&mut extras, "title");
        let short_title = take_string(&mut extras, "shortTitle");
        let description = take_string(&mut extras, "description").unwrap_or_default();
        let author = take_string(&mut extras, "author").unwrap_or_default();
        let mut visible = take_bool(&mut extras, "visible").unwrap_or(true);
        let draft = take_bool(&mut extras, "draft").unwrap_or(false);
        if draft {
            visible = false;
        }
        let sort_order = take_i64(&mut extras, "sortOrder").unwrap_or(0);
        let hide_author = take_bool(&mut extras, "hideAuthor").unwrap_or(false);
        let hide_title = take_bool(&mut extras, "hideTitle").unwrap_or(false);
        let tags = take_string_list(&mut extras, "tags").unwrap_or_default();
        let date = take_string(&mut extras, "date")
            .map(|s| parse_date(&s))
            .unwrap_or_default();

        Self {
            title,
            short_title,
            description,
            author,
            visible,
            draft,
            sort_order,
            hide_author,
            hide_title,
            tags,
            date,
            extras,
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date, falling back to the epoch.
pub fn parse_date(s: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
        .unwrap_or_default()
}

fn take_string(extras: &mut BTreeMap<String, Value>, key: &str) -> Option<String> {
    match extras.get(key) {
        Some(Value::String(s)) => {
            let s = s.clone();
            extras.remove(key);
            Some(s)
        }
        _ => None,
    }
}

fn take_bool(extras: &mut BTreeMap<String, Value>, key: &str) -> Option<bool> {
    match extras.get(key) {
        Some(Value::Bool(b)) => {
            let b = *b;
            extras.remove(key);
            Some(b)
        }
        _ => None,
    }
}

fn take_i64(extras: &mut BTreeMap<String, Value>, key: &str) -> Option<i64> {
    match extras.get(key).and_then(Value::as_i64) {
        Some(n) => {
            extras.remove(key);
            Some(n)
        }
        None => None,
    }
}

fn take_string_list(extras: &mut BTreeMap<String, Value>, key: &str) -> Option<Vec<String>> {
    let Some(Value::Sequence(seq)) = extras.get(key) else {
        return None;
    };
    // All elements must be strings for the list to be claimed.
    let strings: Option<Vec<String>> = seq
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect();
    let strings = strings?;
    extras.remove(key);
    Some(strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn recognized_keys_are_extracted_with_types() {
        let fm = FrontMatter::parse(
            "title: Hello\n\
             shortTitle: Hi\n\
             description: greeting\n\
             author: Ola\n\
             sortOrder: 3\n\
             hideAuthor: true\n\
             tags:\n  - intro\n  - misc\n\
             date: 2024-06-01\n",
        )
        .unwrap();

        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.short_title.as_deref(), Some("Hi"));
        assert_eq!(fm.description, "greeting");
        assert_eq!(fm.author, "Ola");
        assert_eq!(fm.sort_order, 3);
        assert!(fm.hide_author);
        assert!(!fm.hide_title);
        assert_eq!(fm.tags, ["intro", "misc"]);
        assert_eq!(fm.date, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert!(fm.visible);
        assert!(fm.extras.is_empty());
    }

    #[test]
    fn empty_block_yields_defaults() {
        let fm = FrontMatter::parse("").unwrap();
        assert!(fm.title.is_none());
        assert!(fm.visible);
        assert_eq!(fm.sort_order, 0);
        assert_eq!(fm.date, DateTime::<Utc>::default());
    }

    #[test]
    fn draft_forces_invisible() {
        let fm = FrontMatter::parse("draft: true\nvisible: true\n").unwrap();
        assert!(fm.draft);
        assert!(!fm.visible);
    }

    #[test]
    fn unrecognized_keys_survive_in_extras() {
        let fm = FrontMatter::parse("title: T\ncustom: 42\nlayout: wide\n").unwrap();
        assert_eq!(fm.extras.len(), 2);
        assert_eq!(fm.extras.get("custom").and_then(Value::as_i64), Some(42));
        assert_eq!(
            fm.extras.get("layout").and_then(Value::as_str),
            Some("wide")
        );
    }

    #[test]
    fn wrong_typed_value_keeps_default_and_stays_in_extras() {
        let fm = FrontMatter::parse("sortOrder: not-a-number\nvisible: 1\n").unwrap();
        assert_eq!(fm.sort_order, 0);
        assert!(fm.visible);
        assert!(fm.extras.contains_key("sortOrder"));
        assert!(fm.extras.contains_key("visible"));
    }

    #[test]
    fn bad_date_falls_back_to_epoch() {
        let fm = FrontMatter::parse("date: sometime soon\n").unwrap();
        assert_eq!(fm.date, DateTime::<Utc>::default());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(FrontMatter::parse("title: [unclosed\n").is_err());
    }
}
