//! Schema-driven knowledge graph construction.
//!
//! Walks [`Post::fields`] for every post, so any front-matter field present in
//! the collection becomes a node kind. Construction runs in two passes: the
//! first tallies how many posts carry each value node, the second creates the
//! nodes with their final counts and links them to their posts.

use std::collections::{BTreeSet, HashMap};

use chrono::Datelike;

use crate::config::GraphConfig;
use crate::post::{FieldValue, Post, parse_date};

use super::{GraphNode, KnowledgeGraph, NodeKind, NodeMetadata, post_node_id, value_node_id};

/// A value node a post links to, before counts are known.
#[derive(Debug, Clone)]
struct ValueRef {
    id: String,
    kind: NodeKind,
    label: String,
    original_value: Option<FieldValue>,
}

/// Build a knowledge graph with the default [`GraphConfig`].
pub fn build_graph(posts: &[Post]) -> KnowledgeGraph {
    build_graph_with(posts, &GraphConfig::default())
}

/// Build a knowledge graph from a post collection.
pub fn build_graph_with(posts: &[Post], config: &GraphConfig) -> KnowledgeGraph {
    let visible: Vec<&Post> = posts
        .iter()
        .filter(|p| !(config.hide_corporate_internal && p.is_corporate_internal()))
        .collect();

    // Pass 1: resolve each post's value nodes and count distinct posts per node.
    let mut post_counts: HashMap<String, usize> = HashMap::new();
    let planned: Vec<(&Post, Vec<ValueRef>)> = visible
        .iter()
        .map(|post| {
            let refs = value_refs(post, config);
            let distinct: BTreeSet<&str> = refs.iter().map(|r| r.id.as_str()).collect();
            for id in distinct {
                *post_counts.entry(id.to_string()).or_insert(0) += 1;
            }
            (*post, refs)
        })
        .collect();

    // Pass 2: create nodes carrying final counts, then link.
    let mut graph = KnowledgeGraph::new();
    for (post, refs) in planned {
        let post_id = post_node_id(&post.slug);
        graph.insert_node(GraphNode {
            id: post_id.clone(),
            kind: NodeKind::Post,
            label: post.title.clone(),
            metadata: NodeMetadata::Post(Box::new(post.clone())),
        });

        for value in refs {
            let post_count = post_counts.get(&value.id).copied().unwrap_or(1);
            let relationship = value.kind.clone();
            let value_id = value.id.clone();
            graph.insert_node(GraphNode {
                id: value.id,
                kind: value.kind,
                label: value.label,
                metadata: NodeMetadata::Value {
                    post_count,
                    original_value: value.original_value,
                },
            });
            graph.insert_edge(&post_id, &value_id, relationship);
        }
    }

    tracing::debug!(
        posts = posts.len(),
        hidden = posts.len() - visible.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built knowledge graph"
    );
    graph
}

/// Fields whose value ids would land in the `post-` id namespace.
fn is_reserved_field(field: &str) -> bool {
    field == "post" || field.starts_with("post-")
}

/// Every value node a post links to, in field order.
fn value_refs(post: &Post, config: &GraphConfig) -> Vec<ValueRef> {
    let mut refs = Vec::new();
    for (field, value) in post.fields() {
        if config.skip_fields.contains(field) {
            continue;
        }
        if is_reserved_field(field) {
            tracing::warn!(
                slug = %post.slug,
                field,
                "ignoring front-matter field, its ids clash with post nodes"
            );
            continue;
        }
        let kind = NodeKind::from_field(field);
        match value {
            FieldValue::List(items) => {
                for item in items {
                    let (key, label) = match &item {
                        FieldValue::Text(s) if s.trim().is_empty() => continue,
                        // Case-insensitive key; the first-seen casing labels the node.
                        FieldValue::Text(s) => (s.to_lowercase(), s.clone()),
                        other => (other.normalized(), other.normalized()),
                    };
                    refs.push(ValueRef {
                        id: value_node_id(field, &key),
                        kind: kind.clone(),
                        label,
                        original_value: None,
                    });
                }
            }
            scalar => {
                let label = scalar_label(field, &scalar);
                refs.push(ValueRef {
                    id: value_node_id(field, &label),
                    kind,
                    label,
                    original_value: Some(scalar),
                });
            }
        }
    }
    refs
}

/// Display label for a scalar field value. Scalar nodes are keyed by this
/// label, so dates group by year and reading times by bucket.
fn scalar_label(field: &str, value: &FieldValue) -> String {
    match (field, value) {
        ("date", _) => {
            let raw = value.normalized();
            match parse_date(&raw) {
                Some(date) => format!("{:04}", date.year()),
                None => {
                    tracing::warn!(date = %raw, "unparseable post date, labelling verbatim");
                    raw
                }
            }
        }
        ("readingTime", FieldValue::Number(minutes)) => reading_time_bucket(*minutes).to_string(),
        ("external", _) => semantic(value, "external", "internal"),
        ("corporate", _) => semantic(value, "corporate", "personal"),
        _ => value.normalized(),
    }
}

fn semantic(value: &FieldValue, yes: &str, no: &str) -> String {
    let word = if value.is_truthy() { yes } else { no };
    word.to_string()
}

fn reading_time_bucket(minutes: f64) -> &'static str {
    if minutes < 10.0 {
        "<10 min"
    } else if minutes <= 20.0 {
        "10-20 min"
    } else {
        ">20 min"
    }
}
