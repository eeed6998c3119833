//! Knowledge Graph: a bipartite graph between posts and attribute values.
//!
//! Every post becomes a `post` node; every value of every other front-matter
//! field becomes a value node typed by the field name and linked to the posts
//! that carry it.
//!
//! - **Construction** ([`build`]): schema-driven, two-pass (counts, then nodes)
//! - **Selection** ([`filter`]): induced subgraph around pinned nodes
//! - **Statistics** ([`analytics`]): per-kind counts, degree ranking, components
//! - **Memoization** ([`memo`]): reuse build/filter output across re-renders
//!
//! All maps are ordered, so rebuilding from the same posts yields an identical
//! graph.

pub mod analytics;
pub mod build;
pub mod filter;
pub mod memo;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

use crate::error::GraphError;
use crate::post::{FieldValue, Post};

pub use analytics::{GraphStats, graph_stats};
pub use build::{build_graph, build_graph_with};
pub use filter::filter_graph;
pub use memo::GraphMemo;

/// What a node stands for: a post, or a value of the named front-matter field.
///
/// Well-known fields have their own variants; any other field name falls into
/// [`NodeKind::Field`]. Serialises as the bare field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Post,
    Authors,
    Tags,
    Date,
    ReadingTime,
    External,
    Corporate,
    SpotifyTrack,
    Field(String),
}

impl NodeKind {
    /// Kind for values of the given front-matter field.
    pub fn from_field(name: &str) -> Self {
        match name {
            "authors" => NodeKind::Authors,
            "tags" => NodeKind::Tags,
            "date" => NodeKind::Date,
            "readingTime" => NodeKind::ReadingTime,
            "external" => NodeKind::External,
            "corporate" => NodeKind::Corporate,
            "spotifyTrack" => NodeKind::SpotifyTrack,
            other => NodeKind::Field(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Post => "post",
            NodeKind::Authors => "authors",
            NodeKind::Tags => "tags",
            NodeKind::Date => "date",
            NodeKind::ReadingTime => "readingTime",
            NodeKind::External => "external",
            NodeKind::Corporate => "corporate",
            NodeKind::SpotifyTrack => "spotifyTrack",
            NodeKind::Field(name) => name,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for NodeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "post" => NodeKind::Post,
            other => NodeKind::from_field(other),
        })
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Per-node payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeMetadata {
    /// The full post record, for rendering detail on selection.
    Post(Box<Post>),
    /// An attribute value shared by `post_count` posts.
    #[serde(rename_all = "camelCase")]
    Value {
        post_count: usize,
        /// The raw scalar the label was derived from (absent for list items).
        #[serde(skip_serializing_if = "Option::is_none")]
        original_value: Option<FieldValue>,
    },
}

impl NodeMetadata {
    pub fn post_count(&self) -> Option<usize> {
        match self {
            NodeMetadata::Value { post_count, .. } => Some(*post_count),
            NodeMetadata::Post(_) => None,
        }
    }

    pub fn as_post(&self) -> Option<&Post> {
        match self {
            NodeMetadata::Post(post) => Some(&**post),
            NodeMetadata::Value { .. } => None,
        }
    }
}

/// A vertex in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// `post-{slug}` or `{field}-{value key}`.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub label: String,
    pub metadata: NodeMetadata,
}

/// A non-directional link between a post node and a value node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// `{node_a}--{node_b}`.
    pub id: String,
    /// The post endpoint.
    pub node_a: String,
    /// The value endpoint.
    pub node_b: String,
    /// The field that produced the edge.
    pub relationship: NodeKind,
}

/// Node id of the post with the given slug.
pub fn post_node_id(slug: &str) -> String {
    format!("post-{slug}")
}

/// Node id of a field value, keyed by its normalised form.
pub fn value_node_id(field: &str, key: &str) -> String {
    format!("{field}-{key}")
}

/// Edge id between two nodes.
pub fn edge_id(node_a: &str, node_b: &str) -> String {
    format!("{node_a}--{node_b}")
}

/// An immutable knowledge graph value.
///
/// `connections` is the adjacency index derived from `edges` and is only ever
/// written together with them, so it is symmetric and never references a
/// missing node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeGraph {
    nodes: BTreeMap<String, GraphNode>,
    edges: BTreeMap<String, GraphEdge>,
    connections: BTreeMap<String, BTreeSet<String>>,
    nodes_by_type: BTreeMap<NodeKind, BTreeSet<String>>,
}

impl KnowledgeGraph {
    /// Create a new empty knowledge graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless one with the same id exists. First write wins.
    pub(crate) fn insert_node(&mut self, node: GraphNode) {
        if self.nodes.contains_key(&node.id) {
            return;
        }
        self.nodes_by_type
            .entry(node.kind.clone())
            .or_default()
            .insert(node.id.clone());
        self.connections.entry(node.id.clone()).or_default();
        self.nodes.insert(node.id.clone(), node);
    }

    /// Link two existing nodes. Repeating a pair is a no-op, as is linking a
    /// node that was never inserted.
    pub(crate) fn insert_edge(&mut self, node_a: &str, node_b: &str, relationship: NodeKind) {
        if !self.nodes.contains_key(node_a) || !self.nodes.contains_key(node_b) {
            return;
        }
        let id = edge_id(node_a, node_b);
        if self.edges.contains_key(&id) {
            return;
        }
        self.edges.insert(
            id.clone(),
            GraphEdge {
                id,
                node_a: node_a.to_string(),
                node_b: node_b.to_string(),
                relationship,
            },
        );
        self.connections
            .entry(node_a.to_string())
            .or_default()
            .insert(node_b.to_string());
        self.connections
            .entry(node_b.to_string())
            .or_default()
            .insert(node_a.to_string());
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.get(id)
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// All edges, ordered by id.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.values()
    }

    /// Adjacent node ids of `id`, if the node exists.
    pub fn connections(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.connections.get(id)
    }

    /// Ids of every node of the given kind.
    pub fn ids_of_kind(&self, kind: &NodeKind) -> Option<&BTreeSet<String>> {
        self.nodes_by_type.get(kind)
    }

    /// Nodes of the given kind, ordered by id.
    pub fn nodes_of_kind<'a>(&'a self, kind: &NodeKind) -> impl Iterator<Item = &'a GraphNode> {
        self.nodes_by_type
            .get(kind)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
    }

    /// The kinds present, with their member ids.
    pub fn kinds(&self) -> impl Iterator<Item = (&NodeKind, &BTreeSet<String>)> {
        self.nodes_by_type.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Degree of a node (0 for unknown ids).
    pub fn degree(&self, id: &str) -> usize {
        self.connections.get(id).map_or(0, BTreeSet::len)
    }

    /// Nodes adjacent to `id`.
    pub fn neighbors(&self, id: &str) -> Result<Vec<&GraphNode>, GraphError> {
        let adjacent = self
            .connections
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })?;
        Ok(adjacent
            .iter()
            .filter_map(|other| self.nodes.get(other))
            .collect())
    }

    /// Posts linked to a value node, ordered by node id.
    pub fn posts_for(&self, value_id: &str) -> Result<Vec<&Post>, GraphError> {
        Ok(self
            .neighbors(value_id)?
            .into_iter()
            .filter_map(|node| node.metadata.as_post())
            .collect())
    }
}
