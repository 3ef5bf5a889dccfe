//! Configuration for the linking pipeline.
//!
//! The configuration is an explicit value threaded into every pipeline
//! entry point. Loading never fails hard: a missing, unreadable or
//! corrupted source falls back to [`LinkingConfig::default`] with a warning.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides (`ZETTELWIKI_SHOW_BACKLINKS=false`)
pub const ENV_PREFIX: &str = "ZETTELWIKI";

/// Default node count above which a focused graph is pruned
pub const DEFAULT_GRAPH_NODE_THRESHOLD: usize = 50;

/// Settings consumed by the linking pipeline
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Master switch for the whole linking pipeline
    pub enabled: bool,
    /// Rewrite bare keyword occurrences into explicit links before extraction
    #[serde(alias = "autoLinkKeywords")]
    pub auto_link_keywords: bool,
    /// Detect mutual links and flag them on graph edges
    #[serde(alias = "highlightBidirectional")]
    pub highlight_bidirectional: bool,
    /// Build per-document backlink lists
    #[serde(alias = "showBacklinks")]
    pub show_backlinks: bool,
    /// Shortest keyword (in characters) the auto-linker will substitute
    #[serde(alias = "keywordMinLength")]
    pub keyword_min_length: usize,
    /// Node count above which focused graphs are pruned to a neighborhood
    #[serde(alias = "graphNodeThreshold")]
    pub graph_node_threshold: usize,
    /// Lifetime of cached graphs in seconds (0 disables caching)
    #[serde(alias = "cacheTtlSecs")]
    pub cache_ttl_secs: u64,
    /// Bodies larger than this are treated as plain text
    #[serde(alias = "maxBodyBytes")]
    pub max_body_bytes: usize,
    /// Prefix for node URLs (`<base_path>/wiki/<id>`)
    #[serde(alias = "basePath")]
    pub base_path: String,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_link_keywords: false,
            highlight_bidirectional: true,
            show_backlinks: true,
            keyword_min_length: 3,
            graph_node_threshold: DEFAULT_GRAPH_NODE_THRESHOLD,
            cache_ttl_secs: 300,
            max_body_bytes: 1024 * 1024, // 1MB
            base_path: String::new(),
        }
    }
}

impl LinkingConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate ranges
    pub fn validate(&self) -> Result<()> {
        if self.graph_node_threshold == 0 {
            return Err(Error::config_error(
                "graph_node_threshold must be at least 1",
            ));
        }

        if self.keyword_min_length == 0 {
            return Err(Error::config_error("keyword_min_length must be at least 1"));
        }

        if self.max_body_bytes == 0 {
            return Err(Error::config_error("max_body_bytes must be at least 1"));
        }

        Ok(())
    }

    /// Layer a config file (JSON, YAML or TOML by extension) and
    /// `ZETTELWIKI_*` environment variables over the defaults.
    pub fn try_load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::file_not_found(path));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| Error::config_error(format!("Failed to read configuration: {}", e)))?;

        let loaded: LinkingConfig = settings
            .try_deserialize()
            .map_err(|e| Error::config_error(format!("Invalid configuration: {}", e)))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Like [`LinkingConfig::try_load`], falling back to defaults on any failure
    pub fn load(path: Option<&Path>) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}; falling back to default linking configuration", e);
                Self::default()
            }
        }
    }

    /// Parse a persisted settings blob, falling back to defaults when corrupted
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<LinkingConfig>(raw) {
            Ok(config) if config.validate().is_ok() => config,
            Ok(_) => {
                log::warn!("Persisted linking settings out of range; using defaults");
                Self::default()
            }
            Err(e) => {
                log::warn!("Corrupted linking settings ({}); using defaults", e);
                Self::default()
            }
        }
    }

    /// A configuration with every component switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}
