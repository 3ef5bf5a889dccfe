//! # ZettelWiki
//!
//! Snapshot ingestion, graph export and the `zettelwiki` CLI.
//!
//! The CLI reads a JSON dump of repository issues, links it into a
//! knowledge graph and writes the full graph plus one page file per note.
//!
//! ```
//! use zettelwiki::snapshot::parse_snapshot;
//! use zettelwiki::{GraphDocument, LinkEngine};
//!
//! let docs = parse_snapshot(r#"[
//!     {"number": 1, "title": "Setup Guide", "body": "See [[Install]]", "labels": ["wiki"]},
//!     {"number": 2, "title": "Install", "body": "Back to #1", "labels": [{"name": "bug", "color": "d73a4a"}]}
//! ]"#).unwrap();
//!
//! let corpus = LinkEngine::default().link(&docs);
//! let graph: GraphDocument = corpus.graph(None).into();
//! assert_eq!(graph.stats.bidirectional_pairs, 1);
//! ```

pub mod export;
pub mod snapshot;

pub use export::{GraphDocument, PageDocument, StyledNode, write_json};
pub use snapshot::{load_snapshot, parse_snapshot};
pub use zettelwiki_core::prelude::*;
pub use zettelwiki_graph::{GraphStats, LinkEngine, LinkedCorpus, NoteView};
