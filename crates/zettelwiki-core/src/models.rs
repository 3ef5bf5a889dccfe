//! Core data models for issue-backed notes and their link graph.
//!
//! These types are designed to be:
//! - **Serializable**: All types derive Serialize/Deserialize
//! - **Debuggable**: Derive Debug for easy inspection
//! - **Immutable inputs**: Documents are never mutated by the engine
//! - **Type-Safe**: Enums and newtypes replace magic strings and bare integers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifier of a document (the issue number)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl DocumentId {
    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for DocumentId {
    fn from(value: u64) -> Self {
        DocumentId(value)
    }
}

/// Issue label, normalized at ingestion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl Label {
    /// Create a label with no color
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: String::new(),
        }
    }

    /// Create a label with a hex color (without leading `#`)
    pub fn with_color(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Open/closed state of the backing issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    #[default]
    Open,
    Closed,
}

impl DocumentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// A wiki article backed by an issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub state: DocumentState,
    #[serde(default)]
    pub comment_count: u32,
}

impl Document {
    /// Create an open document with epoch timestamps and no labels
    pub fn new(
        id: impl Into<DocumentId>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let body = body.into();
        Self {
            id: id.into(),
            title: title.into(),
            body: if body.is_empty() { None } else { Some(body) },
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            labels: Vec::new(),
            state: DocumentState::Open,
            comment_count: 0,
        }
    }

    /// Replace labels
    pub fn with_labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = labels;
        self
    }

    /// Set the comment count
    pub fn with_comments(mut self, comment_count: u32) -> Self {
        self.comment_count = comment_count;
        self
    }

    /// Set the issue state
    pub fn with_state(mut self, state: DocumentState) -> Self {
        self.state = state;
        self
    }

    /// Set creation and update timestamps
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Body text, empty when absent
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    /// Label names in order
    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }
}

/// Byte span of one token inside a body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSpan {
    /// Start byte offset of the full match
    pub start: usize,
    /// End byte offset (exclusive) of the full match
    pub end: usize,
    /// Normalized payload (link target, tag name)
    pub text: String,
    /// Literal matched syntax, e.g. `[[Note|alias]]`
    pub raw: String,
    /// Display text for aliased links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A `#123` reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumericToken {
    pub start: usize,
    pub end: usize,
    pub id: DocumentId,
}

/// Raw tokens extracted from one body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTokens {
    pub explicit: Vec<TokenSpan>,
    pub numeric: Vec<NumericToken>,
    pub tags: Vec<TokenSpan>,
}

impl LinkTokens {
    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty() && self.numeric.is_empty() && self.tags.is_empty()
    }
}

/// How a link was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// `[[Title]]`
    Explicit,
    /// `#123`
    Numeric,
}

/// A directed, resolved mention between two documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedLink {
    pub source: DocumentId,
    pub target: DocumentId,
    pub kind: LinkKind,
}

impl ResolvedLink {
    pub fn new(source: DocumentId, target: DocumentId, kind: LinkKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }
}

/// Document id to the distinct ids it links to
pub type MentionMap = BTreeMap<DocumentId, BTreeSet<DocumentId>>;

/// Document id to the ids it shares a mutual link with
pub type BidirectionalSet = BTreeMap<DocumentId, BTreeSet<DocumentId>>;

/// A record, attached to a target, of a document that mentions it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklinkEntry {
    pub source_id: DocumentId,
    pub source_title: String,
    pub source_slug: String,
    pub context: String,
}

/// Resolution outcome for an explicit link occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "id", rename_all = "lowercase")]
pub enum LinkTarget {
    Resolved(DocumentId),
    /// Names the document it appears in; no mention is recorded
    Current,
    /// No document matched; renderers show these distinctly
    Unlinked,
}

/// An explicit link occurrence annotated with its resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAnnotation {
    pub span: TokenSpan,
    pub target: LinkTarget,
}

/// Node of the renderable knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: DocumentId,
    pub title: String,
    pub url: String,
    pub is_current: bool,
    pub labels: Vec<String>,
    pub state: DocumentState,
    pub comment_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Edge of the renderable knowledge graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: DocumentId,
    pub target: DocumentId,
    pub kind: LinkKind,
    pub bidirectional: bool,
}

/// Node/edge graph handed to a force-directed renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl KnowledgeGraph {
    pub fn node(&self, id: DocumentId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: DocumentId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// The focus node, if any
    pub fn current(&self) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.is_current)
    }

    pub fn edge(&self, source: DocumentId, target: DocumentId) -> Option<&GraphEdge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder() {
        let doc = Document::new(3, "FAQ", "")
            .with_labels(vec![Label::with_color("wiki", "7057ff")])
            .with_comments(4)
            .with_state(DocumentState::Closed);

        assert_eq!(doc.id, DocumentId(3));
        assert!(doc.body.is_none());
        assert_eq!(doc.body_text(), "");
        assert_eq!(doc.label_names(), vec!["wiki".to_string()]);
        assert_eq!(doc.comment_count, 4);
        assert_eq!(doc.state.as_str(), "closed");
    }

    #[test]
    fn test_link_kind_serialization() {
        let link = ResolvedLink::new(DocumentId(1), DocumentId(2), LinkKind::Numeric);
        let json = serde_json::to_string(&link).unwrap();
        assert_eq!(json, r#"{"source":1,"target":2,"kind":"numeric"}"#);
    }

    #[test]
    fn test_link_target_serialization() {
        let resolved = serde_json::to_string(&LinkTarget::Resolved(DocumentId(9))).unwrap();
        assert_eq!(resolved, r#"{"status":"resolved","id":9}"#);

        let unlinked = serde_json::to_string(&LinkTarget::Unlinked).unwrap();
        assert_eq!(unlinked, r#"{"status":"unlinked"}"#);

        let current = serde_json::to_string(&LinkTarget::Current).unwrap();
        assert_eq!(current, r#"{"status":"current"}"#);
    }

    #[test]
    fn test_graph_lookup() {
        let doc = Document::new(1, "Setup Guide", "body");
        let graph = KnowledgeGraph {
            nodes: vec![GraphNode {
                id: doc.id,
                title: doc.title.clone(),
                url: "/wiki/1".to_string(),
                is_current: true,
                labels: vec![],
                state: doc.state,
                comment_count: 0,
                created_at: doc.created_at,
                updated_at: doc.updated_at,
            }],
            edges: vec![],
        };

        assert!(graph.contains_node(DocumentId(1)));
        assert!(!graph.contains_node(DocumentId(2)));
        assert_eq!(graph.current().map(|n| n.id), Some(DocumentId(1)));
        assert!(graph.edge(DocumentId(1), DocumentId(2)).is_none());
    }
}
