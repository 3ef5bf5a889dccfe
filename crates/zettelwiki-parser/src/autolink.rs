//! Keyword auto-linking: rewrite bare mentions of other notes into `[[...]]`.
//!
//! Each body is segmented once into protected spans (existing explicit
//! links, code, raw HTML, markdown links and images, bare URLs) and free
//! text; substitution only ever touches free text, so an existing
//! `[[Setup Guide]]` is never re-wrapped and a URL is never broken.
//!
//! Keywords are compiled once per index and applied longest-first. Each
//! keyword converts its first free-text occurrence only; later occurrences
//! stay plain text.

use crate::engine::{self, RangeSet};
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::ops::Range;
use zettelwiki_core::{Document, DocumentId, Error, LinkingConfig, Result};

/// Compiled pattern budget per keyword
const KEYWORD_PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Compiled budget for the prefilter spanning every keyword
const KEYWORD_SET_SIZE_LIMIT: usize = 64 << 20;

/// A phrase that links to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub phrase: String,
    pub target: DocumentId,
    pub target_title: String,
}

impl Keyword {
    pub fn new(
        phrase: impl Into<String>,
        target: DocumentId,
        target_title: impl Into<String>,
    ) -> Self {
        Self {
            phrase: phrase.into(),
            target,
            target_title: target_title.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledKeyword {
    keyword: Keyword,
    pattern: Regex,
    chars: usize,
}

/// Keywords sorted longest-first, each compiled once
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    keywords: Vec<CompiledKeyword>,
    /// Reports which keywords occur anywhere in a body; `None` falls back
    /// to trying every keyword
    prefilter: Option<RegexSet>,
}

impl KeywordIndex {
    /// Index titles, then labels not already claimed by a title.
    ///
    /// Ties on the same phrase go to the lowest document id. A label links
    /// to the lowest-id document carrying it.
    pub fn from_documents(documents: &[Document], min_len: usize) -> Self {
        let mut sorted: Vec<&Document> = documents.iter().collect();
        sorted.sort_by_key(|d| d.id);

        let titles = sorted
            .iter()
            .map(|doc| Keyword::new(doc.title.as_str(), doc.id, doc.title.as_str()));
        let labels = sorted.iter().flat_map(|doc| {
            doc.labels
                .iter()
                .map(move |label| Keyword::new(label.name.as_str(), doc.id, doc.title.as_str()))
        });
        let min_len = min_len.max(1);

        let index = Self::from_keywords(
            titles
                .chain(labels)
                .filter(|k| k.phrase.trim().chars().count() >= min_len),
        );
        log::debug!("Keyword index built with {} keywords", index.len());
        index
    }

    /// Build from keywords in priority order: the first of several phrases
    /// equal ignoring case is kept. Blank phrases or titles are dropped.
    pub fn from_keywords(keywords: impl IntoIterator<Item = Keyword>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut unique: Vec<(Keyword, String)> = Vec::new();
        for keyword in keywords {
            let phrase = keyword.phrase.trim();
            let title = keyword.target_title.trim();
            if phrase.is_empty() || title.is_empty() {
                continue;
            }
            let lowered = phrase.to_lowercase();
            if seen.insert(lowered.clone()) {
                unique.push((Keyword::new(phrase, keyword.target, title), lowered));
            }
        }
        unique.sort_by_cached_key(|(keyword, lowered)| {
            (Reverse(keyword.phrase.chars().count()), lowered.clone())
        });

        let keywords: Vec<CompiledKeyword> = unique
            .into_iter()
            .filter_map(|(keyword, _)| match keyword_pattern(&keyword.phrase) {
                Ok(pattern) => Some(CompiledKeyword {
                    chars: keyword.phrase.chars().count(),
                    keyword,
                    pattern,
                }),
                Err(e) => {
                    log::warn!("Skipping keyword {:?}: {}", keyword.phrase, e);
                    None
                }
            })
            .collect();
        let prefilter = build_prefilter(&keywords);

        Self {
            keywords,
            prefilter,
        }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Keywords in application order (longest first)
    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter().map(|k| &k.keyword)
    }

    /// Keywords that may occur in `body`, in application order
    fn candidates<'a>(&'a self, body: &str) -> Vec<&'a CompiledKeyword> {
        match &self.prefilter {
            Some(set) => set
                .matches(body)
                .into_iter()
                .filter_map(|i| self.keywords.get(i))
                .collect(),
            None => self.keywords.iter().collect(),
        }
    }
}

/// Rewrite free-text keyword occurrences into explicit links.
///
/// # Examples
///
/// ```
/// use zettelwiki_core::{DocumentId, LinkingConfig};
/// use zettelwiki_parser::{Keyword, KeywordIndex, auto_link};
///
/// let index = KeywordIndex::from_keywords([
///     Keyword::new("Setup Guide", DocumentId(1), "Setup Guide"),
/// ]);
/// let config = LinkingConfig { auto_link_keywords: true, ..Default::default() };
///
/// let body = "[[Setup Guide]] and Setup Guide";
/// assert_eq!(
///     auto_link(body, &index, DocumentId(2), &config),
///     "[[Setup Guide]] and [[Setup Guide]]"
/// );
/// ```
pub fn auto_link(
    body: &str,
    index: &KeywordIndex,
    self_id: DocumentId,
    config: &LinkingConfig,
) -> String {
    if !config.enabled || !config.auto_link_keywords || body.is_empty() || index.is_empty() {
        return body.to_string();
    }

    let candidates = index.candidates(body);
    if candidates.is_empty() {
        return body.to_string();
    }

    let mut text = body.to_string();
    let mut protected = engine::protected_ranges(&text);
    for entry in candidates {
        if entry.keyword.target == self_id || entry.chars < config.keyword_min_length {
            continue;
        }

        if let Some(range) = first_free_match(&text, &entry.pattern, &protected) {
            let replacement = link_syntax(&text[range.clone()], &entry.keyword);
            text.replace_range(range.clone(), &replacement);
            protected.protect_rewrite(range, replacement.len());
        }
    }

    text
}

/// Auto-link a document body against an index; bodyless documents stay bodyless.
pub fn auto_link_document(
    doc: &Document,
    index: &KeywordIndex,
    config: &LinkingConfig,
) -> Option<String> {
    doc.body
        .as_deref()
        .map(|body| auto_link(body, index, doc.id, config))
}

fn keyword_pattern(phrase: &str) -> Result<Regex> {
    RegexBuilder::new(&regex::escape(phrase))
        .case_insensitive(true)
        .size_limit(KEYWORD_PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|e| Error::invalid_pattern(e.to_string()))
}

fn build_prefilter(keywords: &[CompiledKeyword]) -> Option<RegexSet> {
    if keywords.is_empty() {
        return None;
    }
    RegexSetBuilder::new(keywords.iter().map(|k| regex::escape(&k.keyword.phrase)))
        .case_insensitive(true)
        .size_limit(KEYWORD_SET_SIZE_LIMIT)
        .build()
        .map_err(|e| log::warn!("Keyword prefilter unavailable, scanning every keyword: {}", e))
        .ok()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn at_word_boundary(text: &str, range: &Range<usize>) -> bool {
    let before = text[..range.start].chars().next_back();
    let after = text[range.end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn first_free_match(
    text: &str,
    pattern: &Regex,
    protected: &RangeSet,
) -> Option<Range<usize>> {
    let mut from = 0;
    while from <= text.len() {
        let found = pattern.find_at(text, from)?;
        let range = found.range();
        if !range.is_empty() && !protected.overlaps(&range) && at_word_boundary(text, &range) {
            return Some(range);
        }

        // Step one char past the match start so overlapping candidates are seen
        let step = text[range.start..].chars().next().map_or(1, char::len_utf8);
        from = range.start + step;
    }
    None
}

fn link_syntax(matched: &str, keyword: &Keyword) -> String {
    if matched.to_lowercase() == keyword.target_title.to_lowercase() {
        format!("[[{}]]", matched)
    } else {
        format!("[[{}|{}]]", keyword.target_title, matched)
    }
}
