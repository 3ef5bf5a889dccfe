//! # Knowledge Graph Construction
//!
//! Note index, link resolution, backlinks, mutual-link detection and the
//! renderable node/edge graph for issue-backed notes.
//!
//! Provides:
//! - Title/slug/fuzzy note lookup with lowest-id tie-breaks
//! - Explicit (`[[Title]]`) and numeric (`#123`) link resolution
//! - Backlinks with paragraph/sentence context excerpts
//! - Bidirectional (mutual) link detection
//! - Graph building with relevance-based neighbourhood pruning
//! - Node styling and graph statistics
//!
//! ## Quick Start
//!
//! ```
//! use zettelwiki_core::{Document, DocumentId, LinkingConfig};
//! use zettelwiki_graph::LinkEngine;
//!
//! let docs = vec![
//!     Document::new(1, "Setup Guide", "See [[Install]] and #3"),
//!     Document::new(2, "Install", "no links"),
//!     Document::new(3, "FAQ", "refers back to [[Setup Guide]]"),
//! ];
//!
//! let corpus = LinkEngine::new(LinkingConfig::default()).link(&docs);
//! let graph = corpus.graph(Some(DocumentId(1)));
//!
//! assert_eq!(graph.nodes.len(), 3);
//! assert_eq!(graph.edges.len(), 3);
//! assert_eq!(corpus.partners(DocumentId(1)), vec![DocumentId(3)]);
//! ```
//!
//! ## Pipeline
//!
//! documents → [`NoteIndex`] → extraction + [`resolve`] → {[`build_backlinks`],
//! [`detect`]} → [`build_graph`]. The keyword auto-linker runs first when
//! enabled. [`LinkEngine`] wires the stages together under one
//! [`LinkingConfig`](zettelwiki_core::LinkingConfig).
//!
//! ## Modules
//!
//! - [`index`] - Note lookup structures
//! - [`resolver`] - Token resolution, dedup and unlinked annotations
//! - [`backlinks`] - Backlink entries with context
//! - [`bidirectional`] - Mention map and mutual-link detection
//! - [`graph`] - Graph building, pruning and statistics
//! - [`style`] - Node color and size
//! - [`engine`] - Pipeline entry point
//!
//! ## Performance Characteristics
//!
//! - Index build: O(n) over documents
//! - Exact and slug lookups: O(1); fuzzy lookups: O(n)
//! - Mutual-link detection: O(total mentions)
//! - Graph build: O(n + m); pruning adds a sort over the focus neighbours

pub mod backlinks;
pub mod bidirectional;
pub mod engine;
pub mod graph;
pub mod index;
pub mod resolver;
pub mod style;

pub use backlinks::{CONTEXT_MAX_CHARS, build_backlinks, contexts_at, extract_context};
pub use bidirectional::{detect, mention_map, partners};
pub use engine::{LinkEngine, LinkedCorpus, NoteView};
pub use graph::{GraphOptions, GraphStats, build_graph, node_url, prune_to_neighborhood};
pub use index::{NoteIndex, NoteMeta};
pub use resolver::{
    ExplicitMention, LinkSet, UnresolvedLink, annotate, resolve, resolve_numeric, resolve_tokens,
};
pub use style::{NodeStyle, style_of};

pub mod prelude {
    pub use crate::engine::{LinkEngine, LinkedCorpus, NoteView};
    pub use crate::graph::{GraphOptions, GraphStats};
    pub use crate::index::NoteIndex;
    pub use crate::style::{NodeStyle, style_of};
    pub use zettelwiki_core::prelude::*;
}
