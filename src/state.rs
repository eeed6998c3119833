//! Filter state carried in the listing page URL.
//!
//! Parameters: `q` (raw search), `authors`, `tags` and `type` (comma-joined
//! lists) and `days` (quick time filter). Shared links reopen the page with
//! the same filters applied.

use std::collections::BTreeSet;

use serde::Serialize;
use url::form_urlencoded;

use crate::facet::FacetSelection;
use crate::post::PostType;

/// Listing filters decoded from, and encoded into, a URL query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub q: Option<String>,
    pub authors: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub types: BTreeSet<PostType>,
    pub days: Option<u32>,
}

impl FilterState {
    /// Decode a query string, with or without the leading `?`.
    ///
    /// Unknown parameters, unknown post types and an unparseable `days` are
    /// ignored.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "q" if !value.is_empty() => state.q = Some(value.into_owned()),
                "authors" => state.authors.extend(split_list(&value)),
                "tags" => state.tags.extend(split_list(&value)),
                "type" => {
                    for raw in split_list(&value) {
                        match raw.parse::<PostType>() {
                            Ok(kind) => {
                                state.types.insert(kind);
                            }
                            Err(_) => tracing::debug!(value = %raw, "ignoring unknown post type"),
                        }
                    }
                }
                "days" => match value.trim().parse::<u32>() {
                    Ok(days) => state.days = Some(days),
                    Err(_) => tracing::debug!(value = %value, "ignoring unparseable days"),
                },
                _ => {}
            }
        }
        state
    }

    /// Encode as a query string without the leading `?`. Empty parameters are
    /// left out, so the default state encodes to `""`.
    pub fn to_query_string(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            out.append_pair("q", q);
        }
        if !self.authors.is_empty() {
            out.append_pair("authors", &join(self.authors.iter().map(String::as_str)));
        }
        if !self.tags.is_empty() {
            out.append_pair("tags", &join(self.tags.iter().map(String::as_str)));
        }
        if !self.types.is_empty() {
            out.append_pair("type", &join(self.types.iter().map(|t| t.as_str())));
        }
        if let Some(days) = self.days {
            out.append_pair("days", &days.to_string());
        }
        out.finish()
    }

    /// The search text to show for this state.
    ///
    /// An explicit `q` wins. Without one, the author and tag lists are
    /// spelled out as `author:` and `tag:` tokens.
    pub fn effective_query(&self) -> String {
        if let Some(q) = &self.q {
            return q.clone();
        }
        self.authors
            .iter()
            .map(|a| format!("author:{a}"))
            .chain(self.tags.iter().map(|t| format!("tag:{t}")))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The facet selection this state describes. Histogram ranges are not
    /// carried in URLs.
    pub fn selection(&self) -> FacetSelection {
        FacetSelection {
            authors: self.authors.clone(),
            tags: self.tags.clone(),
            types: self.types.clone(),
            range: None,
            days: self.days,
        }
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(",")
}
