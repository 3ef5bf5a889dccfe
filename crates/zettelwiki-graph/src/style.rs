//! Node color and size for force-directed renderers.

use serde::Serialize;
use zettelwiki_core::GraphNode;

pub const CURRENT_COLOR: &str = "#f04050";
pub const DEFAULT_COLOR: &str = "#4f6df5";
pub const BASE_SIZE: f64 = 6.0;

/// Label substrings in precedence order; the first group any label matches wins
const LABEL_COLORS: [(&[&str], &str); 4] = [
    (&["documentation", "wiki"], "#0075ca"),
    (&["bug", "error"], "#d73a4a"),
    (&["feature"], "#a2eeef"),
    (&["enhancement"], "#84b6eb"),
];

/// Presentation attributes for one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    pub color: &'static str,
    pub size: f64,
}

fn comment_band(comments: u32) -> f64 {
    match comments {
        0 => 0.0,
        1..=5 => 1.0,
        6..=10 => 2.0,
        _ => 4.0,
    }
}

fn label_color(labels: &[String]) -> Option<&'static str> {
    let lowered: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    LABEL_COLORS.iter().find_map(|(needles, color)| {
        lowered
            .iter()
            .any(|label| needles.iter().any(|n| label.contains(n)))
            .then_some(*color)
    })
}

fn comment_color(comments: u32) -> Option<&'static str> {
    match comments {
        0 => None,
        1..=5 => Some("#7ec699"),
        6..=10 => Some("#f9a03f"),
        _ => Some("#e36209"),
    }
}

/// Color and size of a node.
///
/// Color: current node, then label precedence, then comment banding, then
/// the default. Size grows with comments and with up to four labels.
///
/// ```
/// use zettelwiki_core::{Document, DocumentId};
/// use zettelwiki_graph::{GraphOptions, build_graph, style_of};
/// use zettelwiki_core::BidirectionalSet;
///
/// let docs = vec![Document::new(1, "Note", "")];
/// let graph = build_graph(
///     &docs,
///     &[],
///     &BidirectionalSet::new(),
///     Some(DocumentId(1)),
///     &GraphOptions::default(),
/// );
/// assert_eq!(style_of(&graph.nodes[0]).color, "#f04050");
/// ```
pub fn style_of(node: &GraphNode) -> NodeStyle {
    let color = if node.is_current {
        CURRENT_COLOR
    } else {
        label_color(&node.labels)
            .or_else(|| comment_color(node.comment_count))
            .unwrap_or(DEFAULT_COLOR)
    };

    let size = BASE_SIZE + comment_band(node.comment_count) + 0.5 * node.labels.len().min(4) as f64;

    NodeStyle { color, size }
}
