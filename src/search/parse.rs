//! Tokenizer for the search box.
//!
//! Tokens are whitespace separated. A token shaped `key:value` (key made of
//! ASCII word characters) is a filter when the key is known:
//!
//! | key                 | effect                      |
//! |---------------------|-----------------------------|
//! | `author`, `authors` | push lowercase value to `authors` |
//! | `tag`, `tags`       | push lowercase value to `tags`    |
//! | `after`, `since`    | set `after` (last one wins)       |
//! | `before`, `until`   | set `before` (last one wins)      |
//!
//! `key:` with nothing after the colon is dropped. Unknown keys and plain
//! words become lowercase free-text tokens, so `cve:2024-3094` still searches
//! for the literal text.

use std::sync::LazyLock;

use regex::Regex;

use super::Query;

static FILTER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_]+):(.*)$").unwrap());

/// Split a `key:value` token. The value may be empty.
pub(crate) fn split_filter(token: &str) -> Option<(&str, &str)> {
    let caps = FILTER_TOKEN.captures(token)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Parse a raw search string. Never fails.
pub fn parse_query(raw: &str) -> Query {
    let mut query = Query::default();
    for token in raw.split_whitespace() {
        let Some((key, value)) = split_filter(token) else {
            query.text.push(token.to_lowercase());
            continue;
        };
        if value.is_empty() {
            continue;
        }
        match key.to_ascii_lowercase().as_str() {
            "author" | "authors" => query.authors.push(value.to_lowercase()),
            "tag" | "tags" => query.tags.push(value.to_lowercase()),
            "after" | "since" => query.after = Some(value.to_string()),
            "before" | "until" => query.before = Some(value.to_string()),
            _ => query.text.push(token.to_lowercase()),
        }
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_and_date_bound() {
        let q = parse_query("author:humpty tag:reverse after:2025-01-01");
        assert_eq!(
            q,
            Query {
                text: vec![],
                authors: vec!["humpty".into()],
                tags: vec!["reverse".into()],
                after: Some("2025-01-01".into()),
                before: None,
            }
        );
    }

    #[test]
    fn free_text_is_lowercased_in_order() {
        let q = parse_query("  Ransomware   TRIAGE notes ");
        assert_eq!(q.text, vec!["ransomware", "triage", "notes"]);
        assert!(q.authors.is_empty());
    }

    #[test]
    fn aliases_and_case_insensitive_keys() {
        let q = parse_query("Authors:Humpty TAGS:DFIR since:2024-01-01 until:2024-12-31");
        assert_eq!(q.authors, vec!["humpty"]);
        assert_eq!(q.tags, vec!["dfir"]);
        assert_eq!(q.after.as_deref(), Some("2024-01-01"));
        assert_eq!(q.before.as_deref(), Some("2024-12-31"));
    }

    #[test]
    fn last_date_bound_wins() {
        let q = parse_query("after:2023-01-01 after:2024-01-01");
        assert_eq!(q.after.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn empty_value_is_dropped() {
        let q = parse_query("author: tag: ransomware");
        assert_eq!(q.text, vec!["ransomware"]);
        assert!(q.authors.is_empty());
        assert!(q.tags.is_empty());
    }

    #[test]
    fn unknown_key_degrades_to_whole_token_text() {
        let q = parse_query("CVE:2024-3094 https://example.com");
        assert_eq!(q.text, vec!["cve:2024-3094", "https://example.com"]);
    }

    #[test]
    fn repeated_filters_accumulate() {
        let q = parse_query("tag:dfir tag:windows");
        assert_eq!(q.tags, vec!["dfir", "windows"]);
    }

    #[test]
    fn empty_input() {
        assert!(parse_query("   ").is_empty());
    }
}
