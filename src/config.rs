//! TOML configuration.
//!
//! Every key is optional; an empty file (or no file) yields [`Config::default`].
//!
//! ```toml
//! [graph]
//! skip_fields = ["_id", "_raw", "body", "slug", "title", "description", "type"]
//! hide_corporate_internal = true
//!
//! [facets]
//! histogram_months = 12
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub graph: GraphConfig,
    pub facets: FacetConfig,
}

/// Knowledge graph construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Fields never turned into graph dimensions.
    pub skip_fields: BTreeSet<String>,
    /// Drop corporate posts that have no external link.
    pub hide_corporate_internal: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            skip_fields: ["_id", "_raw", "body", "slug", "title", "description", "type"]
                .into_iter()
                .map(String::from)
                .collect(),
            hide_corporate_internal: true,
        }
    }
}

/// Faceted search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacetConfig {
    /// Number of monthly histogram bins, ending with the current month.
    pub histogram_months: u32,
}

impl Default for FacetConfig {
    fn default() -> Self {
        Self {
            histogram_months: 12,
        }
    }
}

impl Config {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}
