//! Post records as produced by the content pipeline.
//!
//! A [`Post`] carries the well-known front-matter fields plus every other key
//! the pipeline emitted (collected in [`Post::extra`]). [`Post::fields`] is
//! the single reflection point the graph builder walks, so a new front-matter
//! field becomes a graph dimension without touching the graph code.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// A single published (or externally linked) post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// URL-safe unique identifier derived from the source path.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Publish date, ISO-8601 (`2025-03-01` or a full RFC 3339 timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Estimated reading time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<f64>,
    /// Link target for posts hosted elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
    /// Written on behalf of an employer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corporate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_track: Option<String>,
    /// Every other key the content pipeline emitted, in key order.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Post {
    /// Create a post with only the required fields set.
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            date: None,
            authors: Vec::new(),
            tags: Vec::new(),
            description: None,
            reading_time: None,
            external: None,
            corporate: None,
            spotify_track: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_reading_time(mut self, minutes: f64) -> Self {
        self.reading_time = Some(minutes);
        self
    }

    pub fn with_external(mut self, url: impl Into<String>) -> Self {
        self.external = Some(url.into());
        self
    }

    pub fn with_corporate(mut self, corporate: bool) -> Self {
        self.corporate = Some(corporate);
        self
    }

    /// Attach an extension front-matter field.
    pub fn with_field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    /// Whether the post points at an external URL. Blank strings do not count.
    pub fn is_external(&self) -> bool {
        self.external
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Corporate post without an external link: never graphed, never counted
    /// in the author facet.
    pub fn is_corporate_internal(&self) -> bool {
        self.corporate == Some(true) && !self.is_external()
    }

    pub fn post_type(&self) -> PostType {
        if self.is_external() {
            PostType::External
        } else {
            PostType::Internal
        }
    }

    /// The publish date, if present and parseable.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date)
    }

    /// All present fields as `(name, value)` pairs.
    ///
    /// Well-known fields come first in declaration order, followed by the
    /// extension fields in key order. Absent fields and JSON `null` values are
    /// omitted.
    pub fn fields(&self) -> Vec<(&str, FieldValue)> {
        let mut out: Vec<(&str, FieldValue)> = vec![
            ("slug", FieldValue::Text(self.slug.clone())),
            ("title", FieldValue::Text(self.title.clone())),
        ];
        if let Some(date) = &self.date {
            out.push(("date", FieldValue::Text(date.clone())));
        }
        if !self.authors.is_empty() {
            out.push(("authors", FieldValue::text_list(&self.authors)));
        }
        if !self.tags.is_empty() {
            out.push(("tags", FieldValue::text_list(&self.tags)));
        }
        if let Some(description) = &self.description {
            out.push(("description", FieldValue::Text(description.clone())));
        }
        if let Some(minutes) = self.reading_time {
            out.push(("readingTime", FieldValue::Number(minutes)));
        }
        if let Some(external) = &self.external {
            out.push(("external", FieldValue::Text(external.clone())));
        }
        if let Some(corporate) = self.corporate {
            out.push(("corporate", FieldValue::Bool(corporate)));
        }
        if let Some(track) = &self.spotify_track {
            out.push(("spotifyTrack", FieldValue::Text(track.clone())));
        }
        for (name, value) in &self.extra {
            if let Some(value) = FieldValue::from_json(value) {
                out.push((name.as_str(), value));
            }
        }
        out
    }
}

/// Hosted on the site or linking elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Internal,
    External,
}

impl PostType {
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Internal => "internal",
            PostType::External => "external",
        }
    }
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(PostType::Internal),
            "external" => Ok(PostType::External),
            other => Err(format!("unknown post type: {other}")),
        }
    }
}

/// A dynamically typed front-matter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<FieldValue>),
}

impl FieldValue {
    fn text_list(items: &[String]) -> Self {
        FieldValue::List(items.iter().cloned().map(FieldValue::Text).collect())
    }

    /// Convert a raw JSON value. `null` has no field value.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Array(items) => Some(FieldValue::List(
                items.iter().filter_map(FieldValue::from_json).collect(),
            )),
            Value::Object(_) => Some(FieldValue::Text(value.to_string())),
        }
    }

    /// Canonical string form used in node ids and as the fallback label.
    pub fn normalized(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::normalized)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Truthiness as front matter authors mean it: empty strings and `false`
    /// are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Bool(b) => *b,
            FieldValue::List(_) => true,
        }
    }
}

/// Integral values print without a fractional part (`12`, not `12.0`).
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Parse an ISO-8601 date or timestamp.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as
/// UTC) and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Load a post collection from a JSON array on disk.
pub fn load_posts(path: &Path) -> Result<Vec<Post>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let posts: Vec<Post> = serde_json::from_str(&content).map_err(|e| LoadError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(posts = posts.len(), path = %path.display(), "loaded post collection");
    Ok(posts)
}

/// Order posts newest first. Undated or unparseable dates sort last.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by_key(|p| std::cmp::Reverse(p.parsed_date()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_pipeline_record() {
        let post: Post = serde_json::from_value(json!({
            "_id": "ransomware-triage.md",
            "type": "Post",
            "slug": "ransomware-triage",
            "title": "Ransomware Triage",
            "date": "2025-03-01T00:00:00.000Z",
            "authors": ["Humpty"],
            "tags": ["reverse", "ransomware"],
            "readingTime": 12,
            "mood": "grim"
        }))
        .unwrap();

        assert_eq!(post.slug, "ransomware-triage");
        assert_eq!(post.reading_time, Some(12.0));
        assert_eq!(post.extra.get("mood"), Some(&json!("grim")));
        assert_eq!(post.extra.get("_id"), Some(&json!("ransomware-triage.md")));
    }

    #[test]
    fn fields_reflect_extension_keys() {
        let post = Post::new("a", "A")
            .with_tags(["dfir"])
            .with_field("series", json!("Chaos Log"))
            .with_field("draft", json!(null));

        let names: Vec<&str> = post.fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["slug", "title", "tags", "series"]);
    }

    #[test]
    fn normalized_values() {
        assert_eq!(FieldValue::Number(12.0).normalized(), "12");
        assert_eq!(FieldValue::Number(7.5).normalized(), "7.5");
        assert_eq!(FieldValue::Bool(false).normalized(), "false");
        let nested = FieldValue::from_json(&json!({"k": 1})).unwrap();
        assert_eq!(nested.normalized(), r#"{"k":1}"#);
    }

    #[test]
    fn post_type_and_corporate() {
        let internal = Post::new("a", "A").with_corporate(true);
        assert_eq!(internal.post_type(), PostType::Internal);
        assert!(internal.is_corporate_internal());

        let blank = Post::new("b", "B").with_external("  ").with_corporate(true);
        assert!(blank.is_corporate_internal());

        let external = Post::new("c", "C")
            .with_external("https://example.com/c")
            .with_corporate(true);
        assert_eq!(external.post_type(), PostType::External);
        assert!(!external.is_corporate_internal());
    }

    #[test]
    fn parses_date_shapes() {
        let day = parse_date("2025-01-01").unwrap();
        let stamp = parse_date("2025-01-01T00:00:00.000Z").unwrap();
        assert_eq!(day, stamp);
        assert!(parse_date("2025-01-01T08:30:00").is_some());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn sorts_newest_first_with_undated_last() {
        let mut posts = vec![
            Post::new("old", "Old").with_date("2023-05-01"),
            Post::new("none", "None"),
            Post::new("new", "New").with_date("2025-02-01"),
        ];
        sort_newest_first(&mut posts);
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old", "none"]);
    }
}
