//! ircc CLI: inspect the blog knowledge graph and run listing searches.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use ircc_atlas::config::Config;
use ircc_atlas::error::AtlasResult;
use ircc_atlas::facet::SearchView;
use ircc_atlas::graph::analytics::{connected_components, degree_ranking};
use ircc_atlas::graph::{GraphMemo, NodeKind, graph_stats};
use ircc_atlas::post::{Post, load_posts, parse_date, sort_newest_first};
use ircc_atlas::search::parse_query;
use ircc_atlas::state::FilterState;

#[derive(Parser)]
#[command(name = "ircc", version, about = "Blog knowledge graph and search")]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the knowledge graph and print its statistics.
    Graph {
        /// Path to the generated post index (JSON array).
        #[arg(long)]
        posts: PathBuf,

        /// Pin a node id (repeatable); the graph is narrowed to posts touching any pin.
        #[arg(long = "pin")]
        pins: Vec<String>,

        /// List the neighbours of one node instead of the summary.
        #[arg(long)]
        node: Option<String>,

        /// Number of top authors and tags to list.
        #[arg(long, default_value = "5")]
        top: usize,

        /// Print the whole graph as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a listing search with facets.
    Search {
        /// Path to the generated post index (JSON array).
        #[arg(long)]
        posts: PathBuf,

        /// Listing page query string, e.g. "authors=Humpty&type=external&days=30".
        #[arg(long)]
        url: Option<String>,

        /// Reference time for day filters and the histogram (defaults to now).
        #[arg(long)]
        now: Option<String>,

        /// Search text; overrides any `q` in `--url`.
        query: Vec<String>,

        /// Print the view as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Parse a search string and print the result as JSON.
    Parse {
        /// Search text.
        query: Vec<String>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Graph {
            posts,
            pins,
            node,
            top,
            json,
        } => {
            let posts = read_posts(&posts)?;
            let pinned: BTreeSet<String> = pins.into_iter().collect();
            let mut memo = GraphMemo::new(config.graph.clone());
            let graph = memo.filtered(&posts, &pinned);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(graph.as_ref()).into_diagnostic()?
                );
                return Ok(());
            }

            if let Some(id) = node {
                let neighbours = graph.neighbors(&id)?;
                println!("Neighbours of {id} ({}):", neighbours.len());
                for n in neighbours {
                    println!("  {} [{}] {}", n.id, n.kind, n.label);
                }
                return Ok(());
            }

            let stats = graph_stats(&graph);
            if !pinned.is_empty() {
                let pins: Vec<&str> = pinned.iter().map(String::as_str).collect();
                println!("Pinned: {}", pins.join(", "));
            }
            println!("Nodes:      {}", stats.total_nodes);
            println!("Edges:      {}", stats.edge_count);
            println!("Posts:      {}", stats.post_count);
            println!("Authors:    {}", stats.author_count);
            println!("Tags:       {}", stats.tag_count);
            println!("Components: {}", stats.component_count);
            println!("By kind:");
            for (kind, count) in &stats.by_kind {
                println!("  {kind:<14} {count}");
            }

            for kind in [NodeKind::Authors, NodeKind::Tags] {
                let ranking = degree_ranking(&graph, &kind);
                if ranking.is_empty() {
                    continue;
                }
                println!("Top {kind}:");
                for entry in ranking.iter().take(top) {
                    println!("  {:<30} {}", entry.label, entry.degree);
                }
            }

            let islands = connected_components(&graph)
                .iter()
                .filter(|c| c.size() == 1)
                .count();
            if islands > 0 {
                println!("Unlinked nodes: {islands}");
            }
        }

        Commands::Search {
            posts,
            url,
            now,
            query,
            json,
        } => {
            let posts = read_posts(&posts)?;
            let mut state = url
                .as_deref()
                .map(FilterState::from_query_string)
                .unwrap_or_default();
            if !query.is_empty() {
                state.q = Some(query.join(" "));
            }
            let now = reference_time(now.as_deref())?;

            let raw_query = state.effective_query();
            let view = SearchView::compute(
                &posts,
                &raw_query,
                &state.selection(),
                now,
                &config.facets,
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&view).into_diagnostic()?);
                return Ok(());
            }

            println!("Query: {raw_query:?}");
            println!("Results ({}):", view.results.len());
            for post in &view.results {
                let date = post.date.as_deref().unwrap_or("undated");
                println!("  {date:<12} {} ({})", post.title, post.slug);
            }
            println!("Authors:");
            for (author, count) in &view.facets.authors {
                println!("  {author:<30} {count}");
            }
            println!("Tags:");
            for (tag, count) in &view.facets.tags {
                println!("  {tag:<30} {count}");
            }
            println!("Types:");
            for (kind, count) in &view.facets.types {
                println!("  {kind:<30} {count}");
            }
            println!("Histogram:");
            for bin in &view.histogram {
                println!("  {} {}", bin.key, "#".repeat(bin.count));
            }
        }

        Commands::Parse { query } => {
            let parsed = parse_query(&query.join(" "));
            println!("{}", serde_json::to_string_pretty(&parsed).into_diagnostic()?);
        }
    }

    Ok(())
}

/// Load and order posts the way the listing page shows them.
fn read_posts(path: &Path) -> AtlasResult<Vec<Post>> {
    let mut posts = load_posts(path)?;
    sort_newest_first(&mut posts);
    tracing::info!(count = posts.len(), path = %path.display(), "loaded posts");
    Ok(posts)
}

fn reference_time(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(raw) => match parse_date(raw) {
            Some(now) => Ok(now),
            None => miette::bail!("invalid --now value: {raw:?} (expected YYYY-MM-DD or RFC 3339)"),
        },
    }
}
