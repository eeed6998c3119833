//! Graph analytics: per-kind counts, degree ranking, and connected components.
//!
//! All functions operate on a [`KnowledgeGraph`] reference and return
//! structured results sorted by relevance (degree desc, size desc, etc.).

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::{connected_components as component_count, tarjan_scc};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;

use super::{KnowledgeGraph, NodeKind};

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Headline numbers for a graph, as shown above the visualisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_nodes: usize,
    pub edge_count: usize,
    pub post_count: usize,
    pub author_count: usize,
    pub tag_count: usize,
    /// Number of connected components.
    pub component_count: usize,
    /// Node count per kind.
    pub by_kind: BTreeMap<NodeKind, usize>,
}

/// Compute summary statistics.
pub fn graph_stats(kg: &KnowledgeGraph) -> GraphStats {
    let by_kind: BTreeMap<NodeKind, usize> = kg
        .kinds()
        .map(|(kind, ids)| (kind.clone(), ids.len()))
        .collect();
    let count = |kind: &NodeKind| by_kind.get(kind).copied().unwrap_or(0);

    GraphStats {
        total_nodes: kg.node_count(),
        edge_count: kg.edge_count(),
        post_count: count(&NodeKind::Post),
        author_count: count(&NodeKind::Authors),
        tag_count: count(&NodeKind::Tags),
        component_count: component_count(&to_petgraph(kg)),
        by_kind,
    }
}

// ---------------------------------------------------------------------------
// Degree ranking
// ---------------------------------------------------------------------------

/// A node with its degree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegreeEntry {
    pub id: String,
    pub label: String,
    pub degree: usize,
}

/// Nodes of one kind sorted by degree desc, then id.
pub fn degree_ranking(kg: &KnowledgeGraph, kind: &NodeKind) -> Vec<DegreeEntry> {
    let mut results: Vec<DegreeEntry> = kg
        .nodes_of_kind(kind)
        .map(|node| DegreeEntry {
            id: node.id.clone(),
            label: node.label.clone(),
            degree: kg.degree(&node.id),
        })
        .collect();
    results.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.id.cmp(&b.id)));
    results
}

// ---------------------------------------------------------------------------
// Connected components
// ---------------------------------------------------------------------------

/// A connected component of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Member node ids, sorted.
    pub members: Vec<String>,
    /// Number of member posts.
    pub posts: usize,
}

impl Component {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Find connected components. Returns sorted by size desc.
pub fn connected_components(kg: &KnowledgeGraph) -> Vec<Component> {
    let graph = to_petgraph(kg);

    let mut components: Vec<Component> = tarjan_scc(&graph)
        .into_iter()
        .map(|indices| {
            let mut members: Vec<String> = indices
                .iter()
                .filter_map(|idx| graph.node_weight(*idx).map(|id| id.to_string()))
                .collect();
            members.sort();
            let posts = members
                .iter()
                .filter(|id| kg.node(id).is_some_and(|n| n.kind == NodeKind::Post))
                .count();
            Component { members, posts }
        })
        .collect();

    components.sort_by(|a, b| {
        b.size()
            .cmp(&a.size())
            .then_with(|| a.members.first().cmp(&b.members.first()))
    });
    components
}

/// Project onto an undirected petgraph whose node weights are node ids.
fn to_petgraph(kg: &KnowledgeGraph) -> UnGraph<&str, ()> {
    let mut graph = UnGraph::with_capacity(kg.node_count(), kg.edge_count());
    let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(kg.node_count());
    for node in kg.nodes() {
        index.insert(node.id.as_str(), graph.add_node(node.id.as_str()));
    }
    for edge in kg.edges() {
        if let (Some(&a), Some(&b)) = (
            index.get(edge.node_a.as_str()),
            index.get(edge.node_b.as_str()),
        ) {
            graph.add_edge(a, b, ());
        }
    }
    graph
}
