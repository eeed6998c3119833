//! Induced-subgraph selection around pinned nodes.
//!
//! A post matches when it is adjacent to any pinned node. The result keeps the
//! matching posts, every node adjacent to them, and the edges among that set,
//! so pinning a tag re-surfaces the authors and years of its posts.

use std::collections::BTreeSet;

use super::{KnowledgeGraph, NodeKind};

/// Derive the subgraph around `pinned`.
///
/// An empty pin set returns the graph unchanged. Pins that name no node in
/// `graph` contribute nothing. Matching is OR across all pins, whatever their
/// kinds. The input graph is never modified.
pub fn filter_graph(graph: &KnowledgeGraph, pinned: &BTreeSet<String>) -> KnowledgeGraph {
    if pinned.is_empty() {
        return graph.clone();
    }

    let matching: BTreeSet<&str> = graph
        .ids_of_kind(&NodeKind::Post)
        .into_iter()
        .flatten()
        .filter(|post_id| {
            graph
                .connections(post_id)
                .is_some_and(|adjacent| !adjacent.is_disjoint(pinned))
        })
        .map(String::as_str)
        .collect();

    let mut included: BTreeSet<&str> = matching.clone();
    for post_id in &matching {
        if let Some(adjacent) = graph.connections(post_id) {
            included.extend(adjacent.iter().map(String::as_str));
        }
    }

    let mut filtered = KnowledgeGraph::new();
    for id in &included {
        if let Some(node) = graph.node(id) {
            filtered.insert_node(node.clone());
        }
    }
    for edge in graph.edges() {
        if included.contains(edge.node_a.as_str()) && included.contains(edge.node_b.as_str()) {
            filtered.insert_edge(&edge.node_a, &edge.node_b, edge.relationship.clone());
        }
    }

    tracing::debug!(
        pinned = pinned.len(),
        matching_posts = matching.len(),
        nodes = filtered.node_count(),
        edges = filtered.edge_count(),
        "filtered knowledge graph"
    );
    filtered
}
