//! End-to-end integration tests for ircc-atlas.
//!
//! These tests load a post index from disk and drive it through graph
//! construction, pin filtering, query matching and the faceted listing view,
//! checking that the pieces agree with each other.

use std::collections::BTreeSet;
use std::io::Write;

use ircc_atlas::config::{Config, FacetConfig};
use ircc_atlas::error::{AtlasError, LoadError};
use ircc_atlas::facet::{FacetSelection, SearchView, count_authors};
use ircc_atlas::graph::{GraphMemo, KnowledgeGraph, NodeKind, build_graph, filter_graph};
use ircc_atlas::post::{Post, PostType, load_posts, parse_date, sort_newest_first};
use ircc_atlas::search::{Query, matches, parse_query, toggle_filter};
use ircc_atlas::state::FilterState;

const INDEX: &str = r#"[
  {
    "_id": "posts/ransomware-triage.md",
    "_raw": {"sourceFilePath": "posts/ransomware-triage.md"},
    "type": "Post",
    "slug": "ransomware-triage",
    "title": "Ransomware Triage",
    "date": "2025-03-01",
    "authors": ["Humpty"],
    "tags": ["reverse", "ransomware"],
    "description": "First hours of a ransomware case",
    "readingTime": 12,
    "body": {"raw": "..."}
  },
  {
    "slug": "memory-forensics",
    "title": "Memory Forensics Basics",
    "date": "2024-11-20",
    "authors": ["humpty", "Dumpty"],
    "tags": ["dfir"],
    "readingTime": 25,
    "series": "Foundations"
  },
  {
    "slug": "osint-recon",
    "title": "OSINT Recon",
    "date": "2025-05-10",
    "authors": ["HUMPTY"],
    "tags": ["osint", "dfir"],
    "external": "https://example.com/osint-recon"
  },
  {
    "slug": "quarterly-report",
    "title": "Quarterly Report",
    "date": "2025-04-02",
    "authors": ["Dumpty"],
    "tags": ["dfir"],
    "corporate": true
  }
]"#;

fn write_index(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn load_sample() -> Vec<Post> {
    let file = write_index(INDEX);
    let mut posts = load_posts(file.path()).unwrap();
    sort_newest_first(&mut posts);
    posts
}

fn assert_bipartite_and_symmetric(kg: &KnowledgeGraph) {
    for edge in kg.edges() {
        let a = kg.node(&edge.node_a).unwrap();
        let b = kg.node(&edge.node_b).unwrap();
        assert!(
            (a.kind == NodeKind::Post) != (b.kind == NodeKind::Post),
            "edge {} is not post-to-value",
            edge.id
        );
    }
    for node in kg.nodes() {
        for other in kg.connections(&node.id).unwrap() {
            assert!(
                kg.connections(other).unwrap().contains(&node.id),
                "{} -> {} is one-sided",
                node.id,
                other
            );
        }
    }
}

#[test]
fn load_sort_and_build() {
    let posts = load_sample();
    let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(
        slugs,
        vec!["osint-recon", "quarterly-report", "ransomware-triage", "memory-forensics"]
    );

    let kg = build_graph(&posts);

    // The corporate-only post is hidden; the rest become post nodes.
    let post_ids = kg.ids_of_kind(&NodeKind::Post).unwrap();
    assert_eq!(post_ids.len(), 3);
    assert!(!post_ids.contains("post-quarterly-report"));

    // Shared values collapse into one node per value.
    let dfir = kg.node("tags-dfir").unwrap();
    assert_eq!(dfir.metadata.post_count(), Some(2));
    // Newest post first, so its casing labels the node.
    let humpty = kg.node("authors-humpty").unwrap();
    assert_eq!(humpty.label, "HUMPTY");
    assert_eq!(humpty.metadata.post_count(), Some(3));

    // Scalars are bucketed; unknown fields still become dimensions.
    assert!(kg.has_node("date-2025"));
    assert!(kg.has_node("readingTime-10-20 min"));
    assert!(kg.has_node("readingTime->20 min"));
    assert!(kg.has_node("external-external"));
    assert_eq!(
        kg.node("series-Foundations").unwrap().kind,
        NodeKind::Field("series".into())
    );

    // Pipeline bookkeeping never leaks into the graph.
    assert!(!kg.nodes().any(|n| n.id.starts_with("_id") || n.id.starts_with("type-")));

    assert_bipartite_and_symmetric(&kg);
}

#[test]
fn build_is_idempotent() {
    let posts = load_sample();
    let first = build_graph(&posts);
    let second = build_graph(&posts);
    assert_eq!(first, second);
    let first_edges: Vec<&str> = first.edges().map(|e| e.id.as_str()).collect();
    let second_edges: Vec<&str> = second.edges().map(|e| e.id.as_str()).collect();
    assert_eq!(first_edges, second_edges);
}

#[test]
fn filtering_keeps_invariants() {
    let kg = build_graph(&load_sample());
    assert_eq!(filter_graph(&kg, &BTreeSet::new()), kg);

    let pin_sets: [&[&str]; 4] = [
        &["tags-dfir"],
        &["authors-dumpty", "tags-osint"],
        &["date-2025"],
        &["tags-vanished"],
    ];
    for pins in pin_sets {
        let pinned: BTreeSet<String> = pins.iter().map(|s| s.to_string()).collect();
        let filtered = filter_graph(&kg, &pinned);
        for node in filtered.nodes() {
            assert!(kg.has_node(&node.id), "{} not in source graph", node.id);
        }
        for edge in filtered.edges() {
            assert!(kg.edge(&edge.id).is_some());
        }
        assert_bipartite_and_symmetric(&filtered);
    }
}

#[test]
fn pinning_a_year_narrows_to_that_year() {
    let kg = build_graph(&load_sample());
    let pinned: BTreeSet<String> = ["date-2024".to_string()].into();
    let filtered = filter_graph(&kg, &pinned);
    let posts = filtered.ids_of_kind(&NodeKind::Post).unwrap();
    assert_eq!(posts.len(), 1);
    assert!(posts.contains("post-memory-forensics"));
    assert!(filtered.has_node("authors-dumpty"));
    assert!(!filtered.has_node("tags-osint"));
}

#[test]
fn memo_matches_direct_computation() {
    let posts = load_sample();
    let mut memo = GraphMemo::new(Config::default().graph);
    let pinned: BTreeSet<String> = ["tags-dfir".to_string()].into();
    let memoized = memo.filtered(&posts, &pinned);
    assert_eq!(*memoized, filter_graph(&build_graph(&posts), &pinned));
}

#[test]
fn query_examples() {
    let parsed = parse_query("author:humpty tag:reverse after:2025-01-01");
    assert_eq!(
        parsed,
        Query {
            text: vec![],
            authors: vec!["humpty".into()],
            tags: vec!["reverse".into()],
            after: Some("2025-01-01".into()),
            before: None,
        }
    );

    let post = Post::new("triage", "Ransomware Triage")
        .with_authors(["Humpty"])
        .with_tags(["reverse", "ransomware"])
        .with_date("2025-03-01");
    assert!(matches(&post, &parse_query("ransomware author:humpty after:2025-01-01")));
    assert!(!matches(&post, &parse_query("author:grepstrength")));
}

#[test]
fn search_view_over_loaded_posts() {
    let posts = load_sample();
    let now = parse_date("2025-06-01").unwrap();
    let view = SearchView::compute(
        &posts,
        "tag:dfir",
        &FacetSelection::default(),
        now,
        &FacetConfig::default(),
    );

    let slugs: Vec<&str> = view.results.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["osint-recon", "quarterly-report", "memory-forensics"]);
    assert_eq!(view.facets.authors.get("HUMPTY"), Some(&2));
    assert_eq!(view.facets.authors.get("Dumpty"), Some(&1));
    assert_eq!(view.facets.types.get(&PostType::External), Some(&1));
    assert_eq!(view.facets.types.get(&PostType::Internal), Some(&2));
    assert_eq!(view.histogram.len(), 12);
    assert_eq!(view.histogram.iter().map(|b| b.count).sum::<usize>(), 3);
}

#[test]
fn author_casing_aggregates() {
    let posts = vec![
        Post::new("a", "A").with_authors(["Humpty"]),
        Post::new("b", "B").with_authors(["humpty"]),
        Post::new("c", "C").with_authors(["HUMPTY"]),
    ];
    let counts = count_authors(&posts);
    assert_eq!(counts.len(), 1);
    assert_eq!(counts.get("Humpty"), Some(&3));
}

#[test]
fn corporate_post_visibility_follows_external_link() {
    let hidden = Post::new("corp", "Corp")
        .with_corporate(true)
        .with_authors(["Dumpty"]);
    let linked = hidden.clone().with_external("https://corp.example/post");

    let kg = build_graph(std::slice::from_ref(&hidden));
    assert!(kg.ids_of_kind(&NodeKind::Post).is_none_or(|ids| ids.is_empty()));
    assert!(count_authors([&hidden]).is_empty());

    let kg = build_graph(std::slice::from_ref(&linked));
    assert!(kg.has_node("post-corp"));
    assert_eq!(count_authors([&linked]).get("Dumpty"), Some(&1));
}

#[test]
fn url_state_drives_the_view() {
    let posts = load_sample();
    let now = parse_date("2025-06-01").unwrap();
    let state = FilterState::from_query_string("authors=Dumpty&type=internal");
    assert_eq!(state.effective_query(), "author:Dumpty");

    let view = SearchView::compute(
        &posts,
        &state.effective_query(),
        &state.selection(),
        now,
        &FacetConfig::default(),
    );
    let slugs: Vec<&str> = view.results.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["quarterly-report", "memory-forensics"]);

    // Clicking a tag facet mirrors into the search box and back out.
    let edited = toggle_filter(&state.effective_query(), "tag", "dfir");
    assert_eq!(edited, "author:Dumpty tag:dfir");
    assert_eq!(toggle_filter(&edited, "tag", "dfir"), "author:Dumpty");
}

#[test]
fn huge_day_filter_from_url_lists_everything() {
    let posts = load_sample();
    let now = parse_date("2025-06-01").unwrap();
    let state = FilterState::from_query_string("days=4294967295");
    assert_eq!(state.days, Some(u32::MAX));

    let view = SearchView::compute(
        &posts,
        &state.effective_query(),
        &state.selection(),
        now,
        &FacetConfig::default(),
    );
    let dated = posts.iter().filter(|p| p.parsed_date().is_some()).count();
    assert_eq!(view.results.len(), dated);
}

#[test]
fn missing_and_malformed_index_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    let err = load_posts(&missing).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));

    let file = write_index("{\"not\": \"an array\"}");
    let err: AtlasError = load_posts(file.path()).unwrap_err().into();
    assert!(matches!(err, AtlasError::Load(LoadError::Parse { .. })));
}

#[test]
fn config_from_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("atlas.toml");
    std::fs::write(
        &path,
        "[graph]\nhide_corporate_internal = false\n\n[facets]\nhistogram_months = 6\n",
    )
    .unwrap();
    let config = Config::load(&path).unwrap();
    assert!(!config.graph.hide_corporate_internal);
    assert_eq!(config.facets.histogram_months, 6);

    let posts = load_sample();
    let mut memo = GraphMemo::new(config.graph);
    assert!(memo.graph(&posts).has_node("post-quarterly-report"));
}
