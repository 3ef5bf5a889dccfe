//! Backlink construction with surrounding-context excerpts.
//!
//! Contexts are located from the byte offsets the extractor reported, so a
//! link-shaped string inside code never produces an excerpt.

use crate::index::NoteIndex;
use crate::resolver::ExplicitMention;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Range;
use std::sync::LazyLock;
use zettelwiki_core::{BacklinkEntry, Document, DocumentId};
use zettelwiki_parser::extract;

/// Excerpts longer than this many characters are cut and suffixed with `...`
pub const CONTEXT_MAX_CHARS: usize = 150;

/// Blank-line paragraph separator
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").unwrap());

/// Sentence terminators, Latin and full-width
const SENTENCE_TERMINATORS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

fn truncate(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() > CONTEXT_MAX_CHARS {
        let cut: String = text.chars().take(CONTEXT_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn paragraph_ranges(body: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for separator in PARAGRAPH_BREAK.find_iter(body) {
        ranges.push(start..separator.start());
        start = separator.end();
    }
    ranges.push(start..body.len());
    ranges
}

/// Blank-line paragraphs of `body` holding any of `offsets`, trimmed and
/// truncated, in body order
pub fn paragraph_contexts(body: &str, offsets: &[usize]) -> Vec<String> {
    paragraph_ranges(body)
        .into_iter()
        .filter(|p| offsets.iter().any(|offset| p.contains(offset)))
        .map(|p| truncate(&body[p]))
        .filter(|context| !context.is_empty())
        .collect()
}

/// First sentence of `body` containing `syntax`
pub fn sentence_context(body: &str, syntax: &str) -> Option<String> {
    body.split_inclusive(SENTENCE_TERMINATORS)
        .find(|s| s.contains(syntax))
        .map(truncate)
}

/// Excerpts for link occurrences at `offsets`: every paragraph holding
/// one, else the first sentence containing `syntax`, else a generated line.
pub fn contexts_at(
    body: &str,
    offsets: &[usize],
    syntax: &str,
    source_title: &str,
) -> Vec<String> {
    let paragraphs = paragraph_contexts(body, offsets);
    if !paragraphs.is_empty() {
        return paragraphs;
    }
    if let Some(sentence) = sentence_context(body, syntax) {
        return vec![sentence];
    }
    vec![format!("Referenced in {}", source_title)]
}

/// Context excerpts for one link syntax as extracted from `body`.
///
/// Occurrences inside code are not links and contribute nothing.
///
/// ```
/// use zettelwiki_graph::backlinks::extract_context;
///
/// let body = "Intro.\n\nSee [[Install]] first.\n\nOutro.";
/// assert_eq!(extract_context(body, "[[Install]]", "Guide"), vec!["See [[Install]] first."]);
/// assert_eq!(extract_context("", "[[Install]]", "Guide"), vec!["Referenced in Guide"]);
/// ```
pub fn extract_context(body: &str, syntax: &str, source_title: &str) -> Vec<String> {
    let offsets: Vec<usize> = extract(Some(body))
        .explicit
        .iter()
        .filter(|span| span.raw == syntax)
        .map(|span| span.start)
        .collect();
    contexts_at(body, &offsets, syntax, source_title)
}

/// Invert explicit mentions into per-target backlink lists.
///
/// `documents` must be the bodies the mentions were extracted from. Each
/// distinct (source, target, excerpt) appears once; entries follow mention
/// order, which is document order.
pub fn build_backlinks(
    documents: &[Document],
    mentions: &[ExplicitMention],
    index: &NoteIndex,
) -> BTreeMap<DocumentId, Vec<BacklinkEntry>> {
    let mut bodies: HashMap<DocumentId, &str> = HashMap::new();
    for doc in documents {
        bodies.entry(doc.id).or_insert_with(|| doc.body_text());
    }

    let mut backlinks: BTreeMap<DocumentId, Vec<BacklinkEntry>> = BTreeMap::new();
    let mut seen: HashSet<(DocumentId, DocumentId, String)> = HashSet::new();

    for mention in mentions {
        let Some(meta) = index.meta(mention.source) else {
            continue;
        };
        let body = bodies.get(&mention.source).copied().unwrap_or_default();

        for context in contexts_at(body, &mention.offsets, &mention.syntax, &meta.title) {
            if !seen.insert((mention.source, mention.target, context.clone())) {
                continue;
            }
            backlinks
                .entry(mention.target)
                .or_default()
                .push(BacklinkEntry {
                    source_id: mention.source,
                    source_title: meta.title.clone(),
                    source_slug: meta.slug.clone(),
                    context,
                });
        }
    }

    log::debug!(
        "Built backlinks for {} targets from {} mentions",
        backlinks.len(),
        mentions.len()
    );
    backlinks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_tokens;

    #[test]
    fn test_paragraph_context() {
        let body = "First paragraph.\n\n  See [[Install]] for details.  \n\nLast.";
        assert_eq!(
            extract_context(body, "[[Install]]", "Guide"),
            vec!["See [[Install]] for details."]
        );
    }

    #[test]
    fn test_each_distinct_paragraph_yields_context() {
        let body = "A [[Install]].\n\nB.\n\nC [[Install]] again.";
        assert_eq!(
            extract_context(body, "[[Install]]", "Guide"),
            vec!["A [[Install]].", "C [[Install]] again."]
        );
    }

    #[test]
    fn test_truncation() {
        let long = format!("[[Install]] {}", "x".repeat(200));
        let context = &extract_context(&long, "[[Install]]", "Guide")[0];
        assert!(context.ends_with("..."));
        assert_eq!(context.chars().count(), CONTEXT_MAX_CHARS + 3);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let body = format!("[[設定]] {}", "あ".repeat(140));
        let context = &extract_context(&body, "[[設定]]", "Guide")[0];
        assert!(!context.ends_with("..."));
    }

    #[test]
    fn test_sentence_fallback() {
        assert_eq!(
            sentence_context("One. Two [[X]] here! Three?", "[[X]]"),
            Some("Two [[X]] here!".to_string())
        );
        assert_eq!(
            sentence_context("最初。次は[[X]]です。", "[[X]]"),
            Some("次は[[X]]です。".to_string())
        );
    }

    #[test]
    fn test_generated_fallback() {
        assert_eq!(
            extract_context("no link here", "[[X]]", "Setup Guide"),
            vec!["Referenced in Setup Guide"]
        );
    }

    fn mentions_of(docs: &[Document], index: &NoteIndex) -> Vec<ExplicitMention> {
        docs.iter()
            .flat_map(|doc| {
                let tokens = extract(doc.body.as_deref());
                resolve_tokens(doc.id, &tokens, index).mentions
            })
            .collect()
    }

    #[test]
    fn test_build_backlinks() {
        let docs = vec![
            Document::new(1, "Setup Guide", "Read [[Install]].\n\nThen [[Install]] again."),
            Document::new(2, "Install", "no links"),
            Document::new(3, "FAQ", "Also [[Install]]."),
        ];
        let index = NoteIndex::build(&docs);

        let backlinks = build_backlinks(&docs, &mentions_of(&docs, &index), &index);
        let entries = &backlinks[&DocumentId(2)];

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].source_id, DocumentId(1));
        assert_eq!(entries[0].source_slug, "setup-guide");
        assert_eq!(entries[1].context, "Then [[Install]] again.");
        assert_eq!(entries[2].source_title, "FAQ");
        assert!(!backlinks.contains_key(&DocumentId(1)));
    }

    #[test]
    fn test_identical_excerpts_collapse() {
        let docs = vec![
            Document::new(1, "Guide", "[[Install]] and [[install]]"),
            Document::new(2, "Install", ""),
        ];
        let index = NoteIndex::build(&docs);
        let mentions = mentions_of(&docs, &index);
        assert_eq!(mentions.len(), 2);

        let backlinks = build_backlinks(&docs, &mentions, &index);
        assert_eq!(backlinks[&DocumentId(2)].len(), 1);
    }

    #[test]
    fn test_code_block_copy_adds_no_entry() {
        let docs = vec![
            Document::new(1, "Guide", "See [[Install]] here.\n\n```\n[[Install]]\n```"),
            Document::new(2, "Install", ""),
        ];
        let index = NoteIndex::build(&docs);

        let backlinks = build_backlinks(&docs, &mentions_of(&docs, &index), &index);
        let contexts: Vec<_> = backlinks[&DocumentId(2)]
            .iter()
            .map(|e| e.context.as_str())
            .collect();
        assert_eq!(contexts, vec!["See [[Install]] here."]);
    }

    #[test]
    fn test_inline_code_paragraph_skipped() {
        let body = "Use `[[Install]]` literally.\n\nReal [[Install]] link.";
        assert_eq!(
            extract_context(body, "[[Install]]", "Guide"),
            vec!["Real [[Install]] link."]
        );
    }

    #[test]
    fn test_offsets_pick_paragraphs() {
        let body = "A [[X]].\n\nB.\n\nC [[X]].";
        assert_eq!(paragraph_contexts(body, &[2]), vec!["A [[X]]."]);
        assert_eq!(paragraph_contexts(body, &[2, 16]), vec!["A [[X]].", "C [[X]]."]);
        assert!(paragraph_contexts(body, &[]).is_empty());
    }
}
