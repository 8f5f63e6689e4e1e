//! YAML frontmatter parsing.
//!
//! A content file starts with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-03-01
//! tags: rust, tools
//! ---
//! Body text...
//! ```
//!
//! Recognized fields are typed; anything else is kept in
//! [`Frontmatter::extra`] so it still reaches templates and fingerprints.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Frontmatter fields of one content file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Publication date; `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` or RFC 3339.
    #[serde(
        default,
        deserialize_with = "deserialize_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDateTime>,

    /// Lowercased tags; accepts a list or a comma-separated string.
    #[serde(
        default,
        deserialize_with = "deserialize_tags",
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    pub tags: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub draft: bool,

    /// Site-unique identifier for internal links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub hide_from_home: bool,

    /// Overrides the site language for this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Frontmatter parsing error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrontmatterError {
    /// The file does not start with a `---` line.
    #[error("missing frontmatter block (file must start with `---`)")]
    Missing,
    /// No closing `---` line.
    #[error("frontmatter block is not closed with `---`")]
    Unterminated,
    /// The block is not a valid YAML mapping of the expected fields.
    #[error("invalid YAML: {0}")]
    Yaml(String),
}

/// A content file split into frontmatter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<'a> {
    pub frontmatter: Frontmatter,
    /// Text after the closing fence.
    pub body: &'a str,
    /// Number of file lines before the body.
    pub body_line: usize,
}

/// Split `source` into frontmatter and body.
///
/// # Errors
///
/// Returns [`FrontmatterError`] when the block is absent, unterminated or not
/// valid YAML.
pub fn parse_document(source: &str) -> Result<Document<'_>, FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut lines = source.split_inclusive('\n');

    match lines.next() {
        Some(first) if first.trim_end() == "---" => {}
        _ => return Err(FrontmatterError::Missing),
    }

    let yaml_start = source.find('\n').map_or(source.len(), |i| i + 1);
    let mut offset = yaml_start;
    let mut line_count = 1;

    for line in lines {
        line_count += 1;
        let line_end = offset + line.len();
        let marker = line.trim_end();
        if marker == "---" || marker == "..." {
            let yaml = &source[yaml_start..offset];
            return Ok(Document {
                frontmatter: parse_yaml(yaml)?,
                body: &source[line_end..],
                body_line: line_count,
            });
        }
        offset = line_end;
    }

    Err(FrontmatterError::Unterminated)
}

fn parse_yaml(yaml: &str) -> Result<Frontmatter, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::Yaml(e.to_string()))
}

/// Parse a frontmatter date.
///
/// RFC 3339 timestamps are normalized to UTC; the other forms are taken as
/// written.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{raw}`"))),
    }
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let normalize = |tag: &str| {
        let tag = tag.trim().to_lowercase();
        (!tag.is_empty()).then_some(tag)
    };

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::String(text)) => Ok(text.split(',').filter_map(normalize).collect()),
        Some(Value::Array(values)) => values
            .into_iter()
            .map(|value| match value {
                Value::String(text) => Ok(normalize(&text)),
                Value::Number(n) => Ok(normalize(&n.to_string())),
                Value::Bool(b) => Ok(normalize(&b.to_string())),
                other => Err(serde::de::Error::custom(format!("invalid tag `{other}`"))),
            })
            .filter_map(Result::transpose)
            .collect(),
        Some(other) => Err(serde::de::Error::custom(format!(
            "tags must be a list or a comma-separated string, got `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_document() {
        let source = "---\ntitle: Hello\ntags: [Rust, tools]\n---\nBody line\n";
        let doc = parse_document(source).unwrap();

        assert_eq!(doc.frontmatter.title.as_deref(), Some("Hello"));
        assert_eq!(
            doc.frontmatter.tags,
            BTreeSet::from(["rust".to_owned(), "tools".to_owned()])
        );
        assert_eq!(doc.body, "Body line\n");
        assert_eq!(doc.body_line, 4);
    }

    #[test]
    fn test_empty_frontmatter() {
        let doc = parse_document("---\n---\nbody").unwrap();
        assert_eq!(doc.frontmatter, Frontmatter::default());
        assert_eq!(doc.body, "body");
        assert_eq!(doc.body_line, 2);
    }

    #[test]
    fn test_crlf_and_bom() {
        let doc = parse_document("\u{feff}---\r\ntitle: Win\r\n---\r\nbody").unwrap();
        assert_eq!(doc.frontmatter.title.as_deref(), Some("Win"));
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_dot_terminator() {
        let doc = parse_document("---\ntitle: A\n...\nbody").unwrap();
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_missing_block() {
        assert_eq!(
            parse_document("# Just markdown\n").unwrap_err(),
            FrontmatterError::Missing
        );
        assert_eq!(parse_document("").unwrap_err(), FrontmatterError::Missing);
    }

    #[test]
    fn test_unterminated_block() {
        assert_eq!(
            parse_document("---\ntitle: A\nbody").unwrap_err(),
            FrontmatterError::Unterminated
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let err = parse_document("---\ntitle: [oops\n---\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::Yaml(_)));
    }

    #[test]
    fn test_non_mapping_yaml() {
        let err = parse_document("---\n- a\n- b\n---\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::Yaml(_)));
    }

    #[test]
    fn test_all_fields() {
        let yaml = r#"
title: "Dune"
date: 2024-03-01 18:30
tags: "Books, Sci-Fi , "
draft: true
shortname: dune
emoji: "📚"
aliases: [/old/dune/]
rating: 9
max_rating: 10
link: https://www.example.com/dune
category: books
hide_from_home: true
locale: de
reading_time: 12
"#;
        let fm = parse_yaml(yaml).unwrap();

        assert_eq!(fm.title.as_deref(), Some("Dune"));
        assert_eq!(fm.date, Some(date("2024-03-01 18:30:00")));
        assert_eq!(
            fm.tags,
            BTreeSet::from(["books".to_owned(), "sci-fi".to_owned()])
        );
        assert!(fm.draft);
        assert_eq!(fm.shortname.as_deref(), Some("dune"));
        assert_eq!(fm.emoji.as_deref(), Some("📚"));
        assert_eq!(fm.aliases, vec!["/old/dune/".to_owned()]);
        assert_eq!(fm.rating, Some(9.0));
        assert_eq!(fm.max_rating, Some(10.0));
        assert_eq!(fm.link.as_deref(), Some("https://www.example.com/dune"));
        assert_eq!(fm.category.as_deref(), Some("books"));
        assert!(fm.hide_from_home);
        assert_eq!(fm.locale.as_deref(), Some("de"));
        assert_eq!(fm.extra.get("reading_time"), Some(&serde_json::json!(12)));
    }

    #[test]
    fn test_numeric_tags() {
        let fm = parse_yaml("tags: [2024, Retro]").unwrap();
        assert_eq!(
            fm.tags,
            BTreeSet::from(["2024".to_owned(), "retro".to_owned()])
        );
    }

    #[test]
    fn test_invalid_date_is_error() {
        assert!(parse_yaml("date: last tuesday").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-05"), Some(date("2024-01-05 00:00:00")));
        assert_eq!(
            parse_date("2024-01-05 10:20:30"),
            Some(date("2024-01-05 10:20:30"))
        );
        assert_eq!(parse_date("2024-01-05T10:20"), Some(date("2024-01-05 10:20:00")));
        assert_eq!(
            parse_date("2024-01-05T10:00:00+02:00"),
            Some(date("2024-01-05 08:00:00"))
        );
        assert_eq!(parse_date("05/01/2024"), None);
    }

    #[test]
    fn test_serialization_is_sorted_and_skips_defaults() {
        let fm = parse_yaml("title: A\nzeta: 1\nalpha: x").unwrap();
        let json = serde_json::to_string(&fm).unwrap();
        assert_eq!(json, r#"{"alpha":"x","title":"A","zeta":1}"#);
    }
}
