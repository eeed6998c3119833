//! Free-text search with a small `key:value` query language.
//!
//! ```text
//! ransomware author:humpty tag:reverse after:2025-01-01 before:2025-06-30
//! ```
//!
//! - **Parsing** ([`parse`]): whitespace tokens → [`Query`]
//! - **Matching** ([`matcher`]): [`Query`] × [`Post`](crate::post::Post) → bool
//! - **Editing** ([`edit`]): add/remove/toggle `key:value` tokens in a raw
//!   query string, as facet clicks and histogram selections do

pub mod edit;
pub mod matcher;
pub mod parse;

use serde::{Deserialize, Serialize};

pub use edit::{add_filter, format_date_for_query, remove_filter, set_date_range, toggle_filter};
pub use matcher::matches;
pub use parse::parse_query;

/// A parsed search string.
///
/// Every list is AND-matched: each free-text token must occur in the post's
/// haystack, each author token in some author, each tag token in some tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Lowercase free-text tokens, in input order.
    pub text: Vec<String>,
    /// Lowercase author substrings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// Lowercase tag substrings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Inclusive lower date bound, as typed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Inclusive upper date bound, as typed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

impl Query {
    /// A query with no constraints matches every post.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.authors.is_empty()
            && self.tags.is_empty()
            && self.after.is_none()
            && self.before.is_none()
    }

    /// Whether a date bound is present.
    pub fn has_date_bounds(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }
}
