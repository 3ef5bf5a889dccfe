//! # ZettelWiki Core
//!
//! Core data models, error types, configuration and result caching for the
//! issue-backed Zettelkasten engine. Every other crate in the workspace
//! depends on the canonical types defined here.
//!
//! ## Architecture Principles
//!
//! - **Immutable Inputs**: Documents are supplied in bulk and never mutated
//! - **Type-Driven Design**: `DocumentId`, `LinkKind` and `LinkTarget` replace bare values
//! - **Total Where Possible**: Malformed bodies degrade to "no links", never to a failed build
//! - **Explicit Configuration**: [`LinkingConfig`] is passed to every entry point; no globals
//!
//! ## Core Modules
//!
//! - [`models`] - Documents, tokens, resolved links, backlinks and graph types
//! - [`error`] - Error type and Result alias
//! - [`config`] - Pipeline configuration with file/env layering and safe fallbacks
//! - [`cache`] - TTL-bounded graph cache and corpus fingerprinting
//!
//! ## Usage Examples
//!
//! ```
//! use zettelwiki_core::prelude::*;
//!
//! let doc = Document::new(1, "Setup Guide", "See [[Install]] and #3")
//!     .with_labels(vec![Label::new("documentation")]);
//! assert_eq!(doc.id, DocumentId(1));
//!
//! let config = LinkingConfig::from_json_str(r#"{"showBacklinks": false}"#);
//! assert!(!config.show_backlinks);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use cache::{CacheKey, GraphCache, MemoryGraphCache, fingerprint_corpus};
pub use config::{DEFAULT_GRAPH_NODE_THRESHOLD, LinkingConfig};
pub use error::{Error, Result};
pub use models::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheKey, GraphCache, MemoryGraphCache};
    pub use crate::config::LinkingConfig;
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        BacklinkEntry, BidirectionalSet, Document, DocumentId, DocumentState, GraphEdge,
        GraphNode, KnowledgeGraph, Label, LinkAnnotation, LinkKind, LinkTarget, LinkTokens,
        MentionMap, NumericToken, ResolvedLink, TokenSpan,
    };
}
