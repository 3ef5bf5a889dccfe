//! Graph and page output for renderers.

use serde::Serialize;
use std::path::Path;
use zettelwiki_core::{DocumentId, GraphEdge, GraphNode, KnowledgeGraph, Result};
use zettelwiki_graph::{GraphStats, LinkedCorpus, NodeStyle, NoteView, style_of};

/// A graph node with its presentation attributes inlined
#[derive(Debug, Clone, Serialize)]
pub struct StyledNode {
    #[serde(flatten)]
    pub node: GraphNode,
    #[serde(flatten)]
    pub style: NodeStyle,
}

/// Graph payload consumed by the force-directed renderer
#[derive(Debug, Clone, Serialize)]
pub struct GraphDocument {
    pub nodes: Vec<StyledNode>,
    pub edges: Vec<GraphEdge>,
    pub stats: GraphStats,
}

impl From<KnowledgeGraph> for GraphDocument {
    fn from(graph: KnowledgeGraph) -> Self {
        let stats = GraphStats::of(&graph);
        Self {
            nodes: graph
                .nodes
                .into_iter()
                .map(|node| StyledNode {
                    style: style_of(&node),
                    node,
                })
                .collect(),
            edges: graph.edges,
            stats,
        }
    }
}

/// Everything one wiki page needs: links, backlinks, tags and its local graph
#[derive(Debug, Clone, Serialize)]
pub struct PageDocument {
    #[serde(flatten)]
    pub note: NoteView,
    pub graph: GraphDocument,
}

impl PageDocument {
    pub fn build(corpus: &LinkedCorpus, id: DocumentId) -> Option<Self> {
        let note = corpus.note(id)?;
        Some(Self {
            note,
            graph: corpus.graph(Some(id)).into(),
        })
    }
}

/// Serialize `value` as pretty JSON to `path`, creating parent directories
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| zettelwiki_core::Error::other(format!("Failed to serialize JSON: {}", e)))?;
    tokio::fs::write(path, json).await?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}
