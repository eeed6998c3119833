//! Memoization of graph construction and filtering.
//!
//! Views re-render far more often than their inputs change. [`GraphMemo`]
//! keeps the most recent build (keyed by structural equality of the post
//! collection) and the most recent filter (keyed by the built graph and the
//! pin set), handing out shared [`Arc`]s. Dropping it is always safe: every
//! output can be recomputed from scratch.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::GraphConfig;
use crate::post::Post;

use super::{KnowledgeGraph, build_graph_with, filter_graph};

/// Single-slot cache for [`build_graph_with`] and [`filter_graph`].
#[derive(Debug, Default)]
pub struct GraphMemo {
    config: GraphConfig,
    built: Option<(Vec<Post>, Arc<KnowledgeGraph>)>,
    filtered: Option<(Arc<KnowledgeGraph>, BTreeSet<String>, Arc<KnowledgeGraph>)>,
}

impl GraphMemo {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            built: None,
            filtered: None,
        }
    }

    /// The full graph for `posts`, rebuilt only when the collection changed.
    pub fn graph(&mut self, posts: &[Post]) -> Arc<KnowledgeGraph> {
        if let Some((cached_posts, graph)) = &self.built {
            if cached_posts.as_slice() == posts {
                tracing::trace!("graph memo hit");
                return Arc::clone(graph);
            }
        }
        let graph = Arc::new(build_graph_with(posts, &self.config));
        self.built = Some((posts.to_vec(), Arc::clone(&graph)));
        self.filtered = None;
        graph
    }

    /// The graph for `posts` filtered by `pinned`.
    pub fn filtered(&mut self, posts: &[Post], pinned: &BTreeSet<String>) -> Arc<KnowledgeGraph> {
        let full = self.graph(posts);
        if pinned.is_empty() {
            return full;
        }
        if let Some((source, cached_pins, graph)) = &self.filtered {
            if Arc::ptr_eq(source, &full) && cached_pins == pinned {
                tracing::trace!("filter memo hit");
                return Arc::clone(graph);
            }
        }
        let graph = Arc::new(filter_graph(&full, pinned));
        self.filtered = Some((full, pinned.clone(), Arc::clone(&graph)));
        graph
    }
}
