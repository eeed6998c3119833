//! Query evaluation against a single post.

use crate::post::{Post, parse_date};

use super::Query;

/// Whether `post` satisfies every constraint of `query`.
///
/// Date bounds are inclusive. A bound that does not parse as a date is
/// ignored, so a half-typed `after:2025-0` does not hide everything. A post
/// without a parseable date never satisfies an effective date bound.
pub fn matches(post: &Post, query: &Query) -> bool {
    if query.has_date_bounds() && !within_bounds(post, query) {
        return false;
    }

    if !query.text.is_empty() {
        let hay = haystack(post);
        if !query.text.iter().all(|term| hay.contains(term.as_str())) {
            return false;
        }
    }

    every_required_found(&query.authors, &post.authors)
        && every_required_found(&query.tags, &post.tags)
}

/// Date-bound check. Bounds that fail to parse are dropped first.
fn within_bounds(post: &Post, query: &Query) -> bool {
    let after = query.after.as_deref().and_then(parse_date);
    let before = query.before.as_deref().and_then(parse_date);
    if after.is_none() && before.is_none() {
        return true;
    }
    let Some(date) = post.parsed_date() else {
        return false;
    };
    !(after.is_some_and(|bound| date < bound) || before.is_some_and(|bound| date > bound))
}

/// Lowercase title, description, authors and tags, space separated.
fn haystack(post: &Post) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(2 + post.authors.len() + post.tags.len());
    parts.push(post.title.to_lowercase());
    parts.push(post.description.as_deref().unwrap_or_default().to_lowercase());
    parts.extend(post.authors.iter().map(|a| a.to_lowercase()));
    parts.extend(post.tags.iter().map(|t| t.to_lowercase()));
    parts.join(" ")
}

/// Each required token must be a substring of at least one value.
fn every_required_found(required: &[String], values: &[String]) -> bool {
    if required.is_empty() {
        return true;
    }
    let lowered: Vec<String> = values.iter().map(|v| v.to_lowercase()).collect();
    required
        .iter()
        .all(|req| lowered.iter().any(|v| v.contains(req.as_str())))
}
