//! Renderable knowledge graph using petgraph for topology queries

use crate::bidirectional::is_bidirectional;
use petgraph::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::instrument;
use zettelwiki_core::{
    BidirectionalSet, DEFAULT_GRAPH_NODE_THRESHOLD, Document, DocumentId, GraphEdge, GraphNode,
    KnowledgeGraph, LinkKind, LinkingConfig, ResolvedLink,
};

/// Node index type for graph
type NodeIndex = petgraph::graph::NodeIndex;

/// Graph construction parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    /// Maximum node count before a focused graph is pruned
    pub threshold: usize,
    /// Prefix for node URLs (`<base>/wiki/<id>`)
    pub base_path: String,
}

impl GraphOptions {
    pub fn from_config(config: &LinkingConfig) -> Self {
        Self {
            threshold: config.graph_node_threshold,
            base_path: config.base_path.clone(),
        }
    }
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_GRAPH_NODE_THRESHOLD,
            base_path: String::new(),
        }
    }
}

/// Page URL of a document
pub fn node_url(base_path: &str, id: DocumentId) -> String {
    format!("{}/wiki/{}", base_path.trim_end_matches('/'), id.get())
}

/// Directed adjacency over document ids
struct Topology {
    graph: DiGraph<DocumentId, LinkKind>,
    index: HashMap<DocumentId, NodeIndex>,
}

impl Topology {
    fn new(ids: impl IntoIterator<Item = DocumentId>, edges: &[GraphEdge]) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for id in ids {
            index.entry(id).or_insert_with(|| graph.add_node(id));
        }
        for edge in edges {
            if let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.target)) {
                graph.add_edge(s, t, edge.kind);
            }
        }
        Self { graph, index }
    }

    /// Total in + out edge count
    fn degree(&self, id: DocumentId) -> usize {
        self.index.get(&id).map_or(0, |&idx| {
            self.graph.edges_directed(idx, Incoming).count()
                + self.graph.edges_directed(idx, Outgoing).count()
        })
    }

    /// Nodes connected to `id` by an edge in either direction
    fn neighbors(&self, id: DocumentId) -> BTreeSet<DocumentId> {
        self.index.get(&id).map_or_else(BTreeSet::new, |&idx| {
            self.graph
                .neighbors_undirected(idx)
                .map(|n| self.graph[n])
                .filter(|n| *n != id)
                .collect()
        })
    }

    fn orphan_count(&self) -> usize {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_undirected(idx).next().is_none())
            .count()
    }
}

fn to_node(doc: &Document, focus: Option<DocumentId>, base_path: &str) -> GraphNode {
    GraphNode {
        id: doc.id,
        title: doc.title.clone(),
        url: node_url(base_path, doc.id),
        is_current: focus == Some(doc.id),
        labels: doc.label_names(),
        state: doc.state,
        comment_count: doc.comment_count,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    }
}

/// Build the node/edge graph, pruned around `focus` when it is too large.
///
/// Nodes follow input order (the first document wins for a repeated id).
/// Links whose endpoints are missing from `documents`, and self-loops, are
/// dropped. A focus id absent from the corpus yields the unpruned graph
/// with no current node.
#[instrument(
    skip_all,
    fields(documents = documents.len(), links = links.len(), focus = ?focus),
    name = "graph_build"
)]
pub fn build_graph(
    documents: &[Document],
    links: &[ResolvedLink],
    bidirectional: &BidirectionalSet,
    focus: Option<DocumentId>,
    options: &GraphOptions,
) -> KnowledgeGraph {
    let mut seen = HashSet::new();
    let nodes: Vec<GraphNode> = documents
        .iter()
        .filter(|doc| seen.insert(doc.id))
        .map(|doc| to_node(doc, focus, &options.base_path))
        .collect();

    let edges: Vec<GraphEdge> = links
        .iter()
        .filter(|l| l.source != l.target && seen.contains(&l.source) && seen.contains(&l.target))
        .map(|l| GraphEdge {
            source: l.source,
            target: l.target,
            kind: l.kind,
            bidirectional: is_bidirectional(bidirectional, l.source, l.target),
        })
        .collect();

    let graph = KnowledgeGraph { nodes, edges };

    match focus {
        Some(id) if graph.contains_node(id) && graph.nodes.len() > options.threshold => {
            prune_to_neighborhood(graph, id, options.threshold)
        }
        _ => graph,
    }
}

/// Restrict `graph` to `focus` and its most relevant direct neighbours.
///
/// Neighbours are ranked by `comment_count + 2 * degree` (degree in the
/// unpruned graph), descending, ties by ascending id; at most
/// `threshold - 1` are kept. Surviving nodes keep their original order.
pub fn prune_to_neighborhood(
    graph: KnowledgeGraph,
    focus: DocumentId,
    threshold: usize,
) -> KnowledgeGraph {
    if !graph.contains_node(focus) {
        return graph;
    }

    let topology = Topology::new(graph.nodes.iter().map(|n| n.id), &graph.edges);
    let comments: HashMap<DocumentId, u32> = graph
        .nodes
        .iter()
        .map(|n| (n.id, n.comment_count))
        .collect();

    let mut neighbours: Vec<(u64, DocumentId)> = topology
        .neighbors(focus)
        .into_iter()
        .map(|id| {
            let score = u64::from(comments.get(&id).copied().unwrap_or(0))
                + 2 * topology.degree(id) as u64;
            (score, id)
        })
        .collect();

    let budget = threshold.max(1) - 1;
    if neighbours.len() > budget {
        neighbours.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        neighbours.truncate(budget);
    }

    let mut keep: HashSet<DocumentId> = neighbours.into_iter().map(|(_, id)| id).collect();
    keep.insert(focus);

    log::debug!(
        "Pruned graph around {} from {} to {} nodes",
        focus,
        graph.nodes.len(),
        keep.len()
    );

    KnowledgeGraph {
        nodes: graph
            .nodes
            .into_iter()
            .filter(|n| keep.contains(&n.id))
            .collect(),
        edges: graph
            .edges
            .into_iter()
            .filter(|e| keep.contains(&e.source) && keep.contains(&e.target))
            .collect(),
    }
}

/// Statistics about a knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Unordered pairs linked in both directions
    pub bidirectional_pairs: usize,
    /// Nodes with no incident edge
    pub orphan_count: usize,
    /// Mean of in + out degree
    pub average_degree: f64,
}

impl GraphStats {
    pub fn of(graph: &KnowledgeGraph) -> Self {
        let topology = Topology::new(graph.nodes.iter().map(|n| n.id), &graph.edges);
        let node_count = topology.graph.node_count();
        let edge_count = topology.graph.edge_count();

        let bidirectional_pairs = graph
            .edges
            .iter()
            .filter(|e| e.bidirectional && e.source < e.target)
            .filter(|e| graph.edge(e.target, e.source).is_some())
            .count();

        let average_degree = if node_count > 0 {
            2.0 * edge_count as f64 / node_count as f64
        } else {
            0.0
        };

        Self {
            node_count,
            edge_count,
            bidirectional_pairs,
            orphan_count: topology.orphan_count(),
            average_degree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidirectional::{detect, mention_map};

    fn link(source: u64, target: u64, kind: LinkKind) -> ResolvedLink {
        ResolvedLink::new(DocumentId(source), DocumentId(target), kind)
    }

    fn docs(n: u64) -> Vec<Document> {
        (1..=n)
            .map(|i| Document::new(i, format!("Note {}", i), ""))
            .collect()
    }

    fn build(
        documents: &[Document],
        links: &[ResolvedLink],
        focus: Option<u64>,
        threshold: usize,
    ) -> KnowledgeGraph {
        let mutual = detect(&mention_map(links));
        let options = GraphOptions {
            threshold,
            ..Default::default()
        };
        build_graph(documents, links, &mutual, focus.map(DocumentId), &options)
    }

    #[test]
    fn test_full_graph() {
        let links = vec![
            link(1, 2, LinkKind::Explicit),
            link(1, 3, LinkKind::Numeric),
            link(3, 1, LinkKind::Explicit),
        ];
        let graph = build(&docs(3), &links, None, 50);

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 3);
        assert!(graph.current().is_none());
        assert!(!graph.edge(DocumentId(1), DocumentId(2)).unwrap().bidirectional);
        assert!(graph.edge(DocumentId(1), DocumentId(3)).unwrap().bidirectional);
        assert!(graph.edge(DocumentId(3), DocumentId(1)).unwrap().bidirectional);
    }

    #[test]
    fn test_node_urls() {
        let options = GraphOptions {
            base_path: "/wiki-site/".to_string(),
            ..Default::default()
        };
        let graph = build_graph(&docs(1), &[], &BidirectionalSet::new(), None, &options);
        assert_eq!(graph.nodes[0].url, "/wiki-site/wiki/1");
        assert_eq!(node_url("", DocumentId(7)), "/wiki/7");
    }

    #[test]
    fn test_dangling_links_dropped() {
        let links = vec![link(1, 9, LinkKind::Numeric), link(2, 2, LinkKind::Explicit)];
        let graph = build(&docs(2), &links, None, 50);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_small_graph_not_pruned() {
        let graph = build(&docs(5), &[link(1, 2, LinkKind::Explicit)], Some(1), 50);
        assert_eq!(graph.nodes.len(), 5);
        assert_eq!(graph.current().map(|n| n.id), Some(DocumentId(1)));
    }

    #[test]
    fn test_pruning_keeps_focus_and_neighbours() {
        let links = vec![
            link(1, 2, LinkKind::Explicit),
            link(3, 1, LinkKind::Numeric),
            link(4, 5, LinkKind::Explicit),
        ];
        let graph = build(&docs(6), &links, Some(1), 4);

        let ids: Vec<u64> = graph.nodes.iter().map(|n| n.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn test_pruning_ranks_by_relevance() {
        let mut documents = docs(8);
        documents[4] = documents[4].clone().with_comments(10); // id 5
        let links = vec![
            link(1, 2, LinkKind::Explicit),
            link(1, 3, LinkKind::Explicit),
            link(1, 4, LinkKind::Explicit),
            link(1, 5, LinkKind::Explicit),
            link(6, 4, LinkKind::Explicit),
            link(7, 4, LinkKind::Explicit),
        ];
        // Scores: 2 -> 2, 3 -> 2, 4 -> 6, 5 -> 12
        let graph = build(&documents, &links, Some(1), 3);

        let ids: Vec<u64> = graph.nodes.iter().map(|n| n.id.get()).collect();
        assert_eq!(ids, vec![1, 4, 5]);
        for edge in &graph.edges {
            assert!(graph.contains_node(edge.source) && graph.contains_node(edge.target));
        }
    }

    #[test]
    fn test_pruning_ties_break_by_id() {
        let links = vec![
            link(1, 4, LinkKind::Explicit),
            link(1, 3, LinkKind::Explicit),
            link(1, 2, LinkKind::Explicit),
        ];
        let graph = build(&docs(5), &links, Some(1), 3);
        let ids: Vec<u64> = graph.nodes.iter().map(|n| n.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_absent_focus_yields_full_graph() {
        let graph = build(&docs(6), &[], Some(99), 2);
        assert_eq!(graph.nodes.len(), 6);
        assert!(graph.current().is_none());
    }

    #[test]
    fn test_threshold_one_keeps_only_focus() {
        let links = vec![link(1, 2, LinkKind::Explicit)];
        let graph = build(&docs(3), &links, Some(1), 1);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_graph_stats() {
        let links = vec![
            link(1, 2, LinkKind::Explicit),
            link(2, 1, LinkKind::Explicit),
            link(2, 3, LinkKind::Numeric),
        ];
        let graph = build(&docs(4), &links, None, 50);
        let stats = GraphStats::of(&graph);

        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.bidirectional_pairs, 1);
        assert_eq!(stats.orphan_count, 1);
        assert!((stats.average_degree - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_graph_stats() {
        let stats = GraphStats::of(&KnowledgeGraph::default());
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.average_degree, 0.0);
    }
}
