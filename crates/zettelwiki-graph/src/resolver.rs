//! Link resolution: tokens to target documents.
//!
//! Explicit tokens resolve by exact normalized title, then slug, then a
//! fuzzy "title contains token" match (lowest id wins). Numeric tokens
//! resolve directly against the id set. A result equal to the source
//! document is discarded, so the mention graph never has self-loops.

use crate::index::NoteIndex;
use std::collections::HashMap;
use zettelwiki_core::{
    DocumentId, LinkAnnotation, LinkKind, LinkTarget, LinkTokens, MentionMap, ResolvedLink,
};
use zettelwiki_parser::extract;

/// Look a token up without the self-reference check
pub fn lookup(token: &str, index: &NoteIndex) -> Option<DocumentId> {
    index
        .by_title(token)
        .or_else(|| index.by_slug(token))
        .or_else(|| index.fuzzy(token))
}

/// Resolve an explicit-link token for `source`.
///
/// ```
/// use zettelwiki_core::{Document, DocumentId};
/// use zettelwiki_graph::{NoteIndex, resolve};
///
/// let docs = vec![Document::new(1, "Setup Guide", ""), Document::new(2, "Install", "")];
/// let index = NoteIndex::build(&docs);
///
/// assert_eq!(resolve("install", DocumentId(1), &index), Some(DocumentId(2)));
/// assert_eq!(resolve("setup", DocumentId(2), &index), Some(DocumentId(1)));
/// assert_eq!(resolve("Setup Guide", DocumentId(1), &index), None);
/// ```
pub fn resolve(token: &str, source: DocumentId, index: &NoteIndex) -> Option<DocumentId> {
    lookup(token, index).filter(|target| *target != source)
}

/// Resolve a `#123` reference: the id must exist and differ from `source`
pub fn resolve_numeric(
    id: DocumentId,
    source: DocumentId,
    index: &NoteIndex,
) -> Option<DocumentId> {
    (id != source && index.contains(id)).then_some(id)
}

/// An explicit link occurrence that matched no document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLink {
    pub source: DocumentId,
    pub token: String,
}

/// A distinct explicit link syntax in `source` that resolved to `target`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExplicitMention {
    pub source: DocumentId,
    pub target: DocumentId,
    /// Literal syntax as written, e.g. `[[Install|setup]]`
    pub syntax: String,
    /// Byte offsets of every extracted occurrence, in body order
    pub offsets: Vec<usize>,
}

/// Resolution output for one document
#[derive(Debug, Clone, Default)]
pub struct DocumentLinks {
    /// Resolved links in body order (may repeat a pair)
    pub links: Vec<ResolvedLink>,
    pub mentions: Vec<ExplicitMention>,
    pub unresolved: Vec<UnresolvedLink>,
}

/// Resolve every token of one document.
pub fn resolve_tokens(
    source: DocumentId,
    tokens: &LinkTokens,
    index: &NoteIndex,
) -> DocumentLinks {
    let mut out = DocumentLinks::default();
    let mut ordered: Vec<(usize, ResolvedLink)> = Vec::new();
    let mut by_syntax: HashMap<(DocumentId, &str), usize> = HashMap::new();

    for span in &tokens.explicit {
        match lookup(&span.text, index) {
            Some(target) if target == source => {}
            Some(target) => {
                ordered.push((span.start, ResolvedLink::new(source, target, LinkKind::Explicit)));
                match by_syntax.get(&(target, span.raw.as_str())) {
                    Some(&pos) => out.mentions[pos].offsets.push(span.start),
                    None => {
                        by_syntax.insert((target, span.raw.as_str()), out.mentions.len());
                        out.mentions.push(ExplicitMention {
                            source,
                            target,
                            syntax: span.raw.clone(),
                            offsets: vec![span.start],
                        });
                    }
                }
            }
            None => out.unresolved.push(UnresolvedLink {
                source,
                token: span.text.clone(),
            }),
        }
    }

    for token in &tokens.numeric {
        if let Some(target) = resolve_numeric(token.id, source, index) {
            ordered.push((token.start, ResolvedLink::new(source, target, LinkKind::Numeric)));
        }
    }

    ordered.sort_by_key(|(start, _)| *start);
    out.links = ordered.into_iter().map(|(_, link)| link).collect();
    out
}

/// Annotate each explicit link in `body` with its resolution.
///
/// A link naming `source` itself is marked [`LinkTarget::Current`].
pub fn annotate(
    body: Option<&str>,
    source: DocumentId,
    index: &NoteIndex,
) -> Vec<LinkAnnotation> {
    extract(body)
        .explicit
        .into_iter()
        .map(|span| {
            let target = match lookup(&span.text, index) {
                Some(id) if id == source => LinkTarget::Current,
                Some(id) => LinkTarget::Resolved(id),
                None => LinkTarget::Unlinked,
            };
            LinkAnnotation { span, target }
        })
        .collect()
}

/// Resolved links, at most one per ordered (source, target) pair.
///
/// When both an explicit and a numeric token produce the same pair, the
/// explicit kind is kept regardless of which was seen first. Insertion
/// order of the first occurrence is preserved.
#[derive(Debug, Clone, Default)]
pub struct LinkSet {
    links: Vec<ResolvedLink>,
    positions: HashMap<(DocumentId, DocumentId), usize>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a link; returns true if the pair was new
    pub fn insert(&mut self, link: ResolvedLink) -> bool {
        if link.source == link.target {
            return false;
        }

        let key = (link.source, link.target);
        if let Some(&pos) = self.positions.get(&key) {
            if link.kind == LinkKind::Explicit {
                self.links[pos].kind = LinkKind::Explicit;
            }
            return false;
        }

        self.positions.insert(key, self.links.len());
        self.links.push(link);
        true
    }

    pub fn extend(&mut self, links: impl IntoIterator<Item = ResolvedLink>) {
        for link in links {
            self.insert(link);
        }
    }

    pub fn get(&self, source: DocumentId, target: DocumentId) -> Option<&ResolvedLink> {
        self.positions.get(&(source, target)).map(|&pos| &self.links[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedLink> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Collapse to source -> distinct targets
    pub fn mention_map(&self) -> MentionMap {
        crate::bidirectional::mention_map(&self.links)
    }

    pub fn into_vec(self) -> Vec<ResolvedLink> {
        self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zettelwiki_core::Document;

    fn index() -> NoteIndex {
        NoteIndex::build(&[
            Document::new(1, "Setup Guide", ""),
            Document::new(2, "Install", ""),
            Document::new(3, "FAQ", ""),
            Document::new(4, "Install on Linux", ""),
        ])
    }

    #[test]
    fn test_exact_title_preferred_over_fuzzy() {
        assert_eq!(resolve("Install", DocumentId(9), &index()), Some(DocumentId(2)));
    }

    #[test]
    fn test_slug_match() {
        assert_eq!(resolve("setup-guide", DocumentId(9), &index()), Some(DocumentId(1)));
    }

    #[test]
    fn test_fuzzy_match_lowest_id() {
        assert_eq!(resolve("linux", DocumentId(9), &index()), Some(DocumentId(4)));
        assert_eq!(resolve("inst", DocumentId(9), &index()), Some(DocumentId(2)));
    }

    #[test]
    fn test_self_reference_discarded() {
        assert_eq!(resolve("FAQ", DocumentId(3), &index()), None);
        assert_eq!(resolve_numeric(DocumentId(3), DocumentId(3), &index()), None);
    }

    #[test]
    fn test_numeric_requires_existing_id() {
        assert_eq!(resolve_numeric(DocumentId(2), DocumentId(1), &index()), Some(DocumentId(2)));
        assert_eq!(resolve_numeric(DocumentId(99), DocumentId(1), &index()), None);
    }

    #[test]
    fn test_resolve_tokens_body_order_and_unresolved() {
        let tokens = extract(Some("#3 then [[Install]] then [[Nowhere]] and [[FAQ]] again #3"));
        let out = resolve_tokens(DocumentId(1), &tokens, &index());

        let pairs: Vec<_> = out.links.iter().map(|l| (l.target.get(), l.kind)).collect();
        assert_eq!(
            pairs,
            vec![
                (3, LinkKind::Numeric),
                (2, LinkKind::Explicit),
                (3, LinkKind::Explicit),
                (3, LinkKind::Numeric),
            ]
        );
        assert_eq!(out.unresolved.len(), 1);
        assert_eq!(out.unresolved[0].token, "Nowhere");
        assert_eq!(out.mentions.len(), 2);
    }

    #[test]
    fn test_self_reference_is_not_unresolved() {
        let tokens = extract(Some("[[FAQ]]"));
        let out = resolve_tokens(DocumentId(3), &tokens, &index());
        assert!(out.links.is_empty());
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn test_repeated_syntax_is_one_mention() {
        let tokens = extract(Some("[[Install]]\n\n[[Install]] and [[install]]"));
        let out = resolve_tokens(DocumentId(1), &tokens, &index());
        let syntaxes: Vec<_> = out.mentions.iter().map(|m| m.syntax.as_str()).collect();
        assert_eq!(syntaxes, vec!["[[Install]]", "[[install]]"]);
        assert_eq!(out.mentions[0].offsets, vec![0, 13]);
        assert_eq!(out.mentions[1].offsets, vec![29]);
    }

    #[test]
    fn test_link_set_explicit_dominates() {
        let mut set = LinkSet::new();
        assert!(set.insert(ResolvedLink::new(DocumentId(1), DocumentId(3), LinkKind::Numeric)));
        assert!(!set.insert(ResolvedLink::new(DocumentId(1), DocumentId(3), LinkKind::Explicit)));
        assert!(!set.insert(ResolvedLink::new(DocumentId(1), DocumentId(3), LinkKind::Numeric)));

        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get(DocumentId(1), DocumentId(3)).map(|l| l.kind),
            Some(LinkKind::Explicit)
        );
    }

    #[test]
    fn test_link_set_rejects_self_loops() {
        let mut set = LinkSet::new();
        assert!(!set.insert(ResolvedLink::new(DocumentId(1), DocumentId(1), LinkKind::Explicit)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_annotate_marks_unlinked() {
        let notes = annotate(Some("[[Install]] and [[Ghost Page]]"), DocumentId(1), &index());
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].target, LinkTarget::Resolved(DocumentId(2)));
        assert_eq!(notes[1].target, LinkTarget::Unlinked);
        assert_eq!(notes[1].span.text, "Ghost Page");
    }

    #[test]
    fn test_annotate_marks_own_page() {
        let notes = annotate(Some("[[FAQ]] vs [[Install]]"), DocumentId(3), &index());
        assert_eq!(notes[0].target, LinkTarget::Current);
        assert_eq!(notes[1].target, LinkTarget::Resolved(DocumentId(2)));
    }
}
