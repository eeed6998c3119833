//! Editing helpers for raw query strings.
//!
//! Facet clicks and histogram selections are mirrored into the search box as
//! `key:value` tokens so the box always shows the full filter state.

use chrono::{DateTime, Utc};

use crate::facet::DateRange;

use super::parse::split_filter;

/// `YYYY-MM-DD`, the form date bounds take in queries.
pub fn format_date_for_query(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Append `key:value` unless an equal token (ignoring case) is present.
pub fn add_filter(query: &str, key: &str, value: &str) -> String {
    let token = format!("{key}:{value}");
    let mut parts: Vec<&str> = query.split_whitespace().collect();
    if parts.iter().any(|p| p.to_lowercase() == token.to_lowercase()) {
        return query.to_string();
    }
    parts.push(&token);
    parts.join(" ")
}

/// Drop `key:value` tokens for `key` (ignoring case). With `value`, only the
/// matching value is removed; without, every value of that key is.
pub fn remove_filter(query: &str, key: &str, value: Option<&str>) -> String {
    query
        .split_whitespace()
        .filter(|token| {
            let Some((k, v)) = split_filter(token) else {
                return true;
            };
            if k.to_lowercase() != key.to_lowercase() {
                return true;
            }
            match value {
                Some(value) => v.to_lowercase() != value.to_lowercase(),
                None => false,
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Add `key:value` if absent, remove it if present.
pub fn toggle_filter(query: &str, key: &str, value: &str) -> String {
    let token = format!("{key}:{value}").to_lowercase();
    let present = query
        .split_whitespace()
        .any(|p| p.to_lowercase() == token);
    if present {
        remove_filter(query, key, Some(value))
    } else {
        add_filter(query, key, value)
    }
}

/// Replace any date bounds with `after:`/`before:` tokens for `range`, or
/// just clear them when `range` is `None`.
pub fn set_date_range(query: &str, range: Option<&DateRange>) -> String {
    let mut updated = query.to_string();
    for key in ["after", "before", "since", "until"] {
        updated = remove_filter(&updated, key, None);
    }
    if let Some(range) = range {
        updated = add_filter(&updated, "after", &format_date_for_query(range.start));
        updated = add_filter(&updated, "before", &format_date_for_query(range.end));
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::parse_date;

    #[test]
    fn add_skips_duplicates_ignoring_case() {
        assert_eq!(add_filter("dfir", "tag", "windows"), "dfir tag:windows");
        assert_eq!(add_filter("TAG:Windows", "tag", "windows"), "TAG:Windows");
        assert_eq!(add_filter("", "author", "Humpty"), "author:Humpty");
    }

    #[test]
    fn remove_by_value_or_key() {
        let q = "lockbit tag:dfir tag:windows author:humpty";
        assert_eq!(
            remove_filter(q, "tag", Some("DFIR")),
            "lockbit tag:windows author:humpty"
        );
        assert_eq!(remove_filter(q, "tag", None), "lockbit author:humpty");
    }

    #[test]
    fn toggle_round_trip() {
        let on = toggle_filter("lockbit", "tag", "dfir");
        assert_eq!(on, "lockbit tag:dfir");
        assert_eq!(toggle_filter(&on, "tag", "dfir"), "lockbit");
    }

    #[test]
    fn date_range_replaces_bounds_and_aliases() {
        let range = DateRange {
            start: parse_date("2025-01-01").unwrap(),
            end: parse_date("2025-01-31T23:59:59Z").unwrap(),
        };
        let q = set_date_range("lockbit since:2020-01-01 until:2021-01-01", Some(&range));
        assert_eq!(q, "lockbit after:2025-01-01 before:2025-01-31");
        assert_eq!(set_date_range(&q, None), "lockbit");
    }
}
