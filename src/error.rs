//! Rich diagnostic error types for ircc-atlas.
//!
//! The core transformations (graph build/filter, query parse/match, facet
//! counting) never fail: malformed input degrades to "nothing matches".
//! Errors only arise at the edges, when loading posts or configuration from
//! disk, or when a caller explicitly looks up a node that does not exist.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for ircc-atlas.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum AtlasError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("failed to read post collection: {path}")]
    #[diagnostic(
        code(ircc::load::io),
        help(
            "Check that the file exists and is readable. The content pipeline writes \
             its generated index to `.contentlayer/generated/Post/_index.json`."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid post collection in {path}: {message}")]
    #[diagnostic(
        code(ircc::load::parse),
        help(
            "The file must be a JSON array of post records, each with at least \
             `slug` and `title`. Re-run the content build if the index is stale."
        )
    )]
    Parse { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(ircc::config::read),
        help("Check the path passed to `--config`, or omit it to use the defaults.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    #[diagnostic(
        code(ircc::config::parse),
        help(
            "The config is TOML with optional `[graph]` and `[facets]` tables. \
             Unknown keys are rejected."
        )
    )]
    Parse { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("node not found: {id}")]
    #[diagnostic(
        code(ircc::graph::node_not_found),
        help(
            "Node ids are `post-<slug>` for posts and `<field>-<value>` for attribute \
             values (e.g. `tags-dfir`). The node may have been filtered out, or the \
             post collection changed since the id was captured."
        )
    )]
    NodeNotFound { id: String },
}

/// Convenience alias for functions returning ircc-atlas results.
pub type AtlasResult<T> = std::result::Result<T, AtlasError>;
