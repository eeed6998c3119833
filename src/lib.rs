// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ircc-atlas
//!
//! Knowledge graph and search core for a static security blog. Posts are
//! turned into a bipartite graph linking each post to the values of its
//! front matter (authors, tags, years, reading-time buckets, and any other
//! field), and the listing page is driven by a small query language plus
//! faceted filters.
//!
//! ## Architecture
//!
//! - **Posts** (`post`): front-matter model, dynamic field view, JSON loading
//! - **Graph** (`graph`): schema-driven construction, pin filtering, analytics, memoization
//! - **Search** (`search`): query parsing, post matching, query-string editing
//! - **Facets** (`facet`): author/tag/type/time counts and the monthly histogram
//! - **URL state** (`state`): filter state encoded in listing page links
//!
//! ## Library usage
//!
//! ```
//! use std::collections::BTreeSet;
//! use ircc_atlas::graph::{build_graph, filter_graph};
//! use ircc_atlas::post::Post;
//! use ircc_atlas::search::{matches, parse_query};
//!
//! let posts = vec![
//!     Post::new("a", "Alpha").with_authors(["Humpty"]).with_tags(["dfir"]),
//!     Post::new("b", "Beta").with_authors(["Dumpty"]).with_tags(["osint"]),
//! ];
//! let graph = build_graph(&posts);
//! let pinned: BTreeSet<String> = ["tags-dfir".to_string()].into();
//! let focused = filter_graph(&graph, &pinned);
//! assert!(focused.has_node("post-a"));
//! assert!(!focused.has_node("post-b"));
//!
//! let query = parse_query("author:humpty");
//! assert!(matches(&posts[0], &query));
//! ```

pub mod config;
pub mod error;
pub mod facet;
pub mod graph;
pub mod post;
pub mod search;
pub mod state;
