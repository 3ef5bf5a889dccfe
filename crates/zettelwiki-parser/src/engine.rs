//! Span tokenizer - single source of truth for link and tag extraction.
//!
//! This module provides a stateless tokenizer that:
//! - Uses pulldown-cmark to find code blocks, inline code and HTML to exclude
//! - Uses regex for the wiki syntax (`[[...]]`, `#123`, `#tag`)
//! - Returns plain `{start, end, text}` spans; nothing is carried between calls
//!
//! All public extraction APIs delegate to this module.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use zettelwiki_core::{DocumentId, LinkTokens, NumericToken, TokenSpan};

// ============================================================================
// Compiled regex patterns
// ============================================================================

/// Explicit link: [[target]] or [[target|display]] (single line)
static EXPLICIT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\n]+)\]\]").unwrap());

/// Numeric reference candidate: #123
static NUMERIC_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\d+)").unwrap());

/// Bare URL: scheme://... up to whitespace
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9+.-]*://[^\s<>]+").unwrap());

/// Hashtag candidate: #word, including CJK and kana
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#([\p{L}\p{N}_\p{Hiragana}\p{Katakana}\p{Han}-]+)").unwrap()
});

// ============================================================================
// Fast pre-filters (skip regex if pattern not present)
// ============================================================================

#[inline]
fn has_explicit_link(content: &str) -> bool {
    content.contains("[[")
}

#[inline]
fn has_hash(content: &str) -> bool {
    content.contains('#')
}

#[inline]
fn needs_markdown_pass(content: &str) -> bool {
    content.contains('`')
        || content.contains("~~~")
        || content.contains('<')
        || content.contains("    ")
        || content.contains('\t')
}

// ============================================================================
// Protected byte ranges
// ============================================================================

/// Sorted, disjoint byte ranges where link syntax must not be interpreted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct RangeSet {
    ranges: Vec<Range<usize>>,
}

impl RangeSet {
    /// Normalize arbitrary ranges: empty ones dropped, overlaps merged
    pub(crate) fn from_unsorted(mut ranges: Vec<Range<usize>>) -> Self {
        ranges.retain(|r| r.start < r.end);
        ranges.sort_unstable_by_key(|r| (r.start, r.end));

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => merged.push(range),
            }
        }
        Self { ranges: merged }
    }

    /// Index of the first range ending after `offset`
    fn first_after(&self, offset: usize) -> usize {
        self.ranges.partition_point(|r| r.end <= offset)
    }

    #[inline]
    pub(crate) fn contains(&self, offset: usize) -> bool {
        self.overlaps(&(offset..offset + 1))
    }

    pub(crate) fn overlaps(&self, range: &Range<usize>) -> bool {
        self.ranges
            .get(self.first_after(range.start))
            .is_some_and(|r| r.start < range.end)
    }

    /// `replaced` (disjoint from every range) was rewritten to `len` bytes;
    /// shift later ranges and protect the rewritten text.
    pub(crate) fn protect_rewrite(&mut self, replaced: Range<usize>, len: usize) {
        let at = self.first_after(replaced.start);
        let old_len = replaced.len();
        for r in &mut self.ranges[at..] {
            *r = (r.start + len - old_len)..(r.end + len - old_len);
        }
        if len > 0 {
            self.ranges.insert(at, replaced.start..replaced.start + len);
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Range<usize>> {
        self.ranges.iter()
    }
}

/// Non-prose markdown: code blocks, inline code and raw HTML, plus inline
/// links and images when `with_links` is set.
fn markdown_ranges(content: &str, with_links: bool) -> Vec<Range<usize>> {
    let links_possible = with_links && (content.contains('[') || content.contains('<'));
    if !needs_markdown_pass(content) && !links_possible {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    let mut open_at: Option<usize> = None;
    for (event, range) in Parser::new_ext(content, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(_)) => open_at = Some(range.start),
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) if with_links => {
                // The start event's range spans the whole element
                ranges.push(range);
            }
            Event::End(TagEnd::CodeBlock) => {
                ranges.push(open_at.take().unwrap_or(range.start)..range.end);
            }
            Event::Code(_) | Event::Html(_) | Event::InlineHtml(_) => ranges.push(range),
            _ => {}
        }
    }
    ranges
}

/// Code blocks, inline code spans and raw HTML.
pub(crate) fn code_ranges(content: &str) -> RangeSet {
    RangeSet::from_unsorted(markdown_ranges(content, false))
}

/// Everything keyword substitution must leave alone: code, HTML, markdown
/// links and images, bare URLs and existing explicit links.
pub(crate) fn protected_ranges(content: &str) -> RangeSet {
    let markdown = markdown_ranges(content, true);
    let code = RangeSet::from_unsorted(markdown.clone());

    let mut ranges = markdown;
    ranges.extend(explicit_spans(content, &code).into_iter().map(|s| s.start..s.end));
    if content.contains("://") {
        ranges.extend(BARE_URL.find_iter(content).map(|m| m.range()));
    }
    RangeSet::from_unsorted(ranges)
}

// ============================================================================
// Tokenizer
// ============================================================================

/// Explicit link spans outside code.
pub(crate) fn explicit_spans(content: &str, code: &RangeSet) -> Vec<TokenSpan> {
    if !has_explicit_link(content) {
        return Vec::new();
    }

    EXPLICIT_LINK
        .captures_iter(content)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            if code.contains(full.start()) {
                return None;
            }

            let inner = caps.get(1)?.as_str();
            let (target, display) = match inner.split_once('|') {
                Some((target, display)) => (target.trim(), Some(display.trim().to_string())),
                None => (inner.trim(), None),
            };
            if target.is_empty() {
                return None;
            }

            Some(TokenSpan {
                start: full.start(),
                end: full.end(),
                text: target.to_string(),
                raw: full.as_str().to_string(),
                display,
            })
        })
        .collect()
}

/// A `#` may start a reference only after a non-word, non-`#`, non-`&` char.
fn valid_hash_start(content: &str, hash_at: usize) -> bool {
    match content[..hash_at].chars().next_back() {
        None => true,
        Some(c) => !(c == '#' || c == '&' || c == '_' || c.is_alphanumeric()),
    }
}

/// The token must end at a non-word char or the end of input.
fn valid_token_end(content: &str, end: usize) -> bool {
    match content[end..].chars().next() {
        None => true,
        Some(c) => !(c == '_' || c.is_alphanumeric()),
    }
}

/// Tokenize a body into explicit, numeric and tag spans.
pub(crate) fn tokenize(content: &str) -> LinkTokens {
    if content.is_empty() {
        return LinkTokens::default();
    }

    let code = code_ranges(content);
    let explicit = explicit_spans(content, &code);

    if !has_hash(content) {
        return LinkTokens {
            explicit,
            ..Default::default()
        };
    }

    // Explicit-link text is off limits for the hash passes
    let mut ranges: Vec<Range<usize>> = code.iter().cloned().collect();
    ranges.extend(explicit.iter().map(|span| span.start..span.end));
    let excluded = RangeSet::from_unsorted(ranges);

    let numeric: Vec<NumericToken> = NUMERIC_REF
        .captures_iter(content)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            if excluded.contains(full.start())
                || !valid_hash_start(content, full.start())
                || !valid_token_end(content, full.end())
            {
                return None;
            }
            let id = caps.get(1)?.as_str().parse::<u64>().ok()?;
            Some(NumericToken {
                start: full.start(),
                end: full.end(),
                id: DocumentId(id),
            })
        })
        .collect();

    let tags: Vec<TokenSpan> = HASHTAG
        .captures_iter(content)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            if excluded.contains(full.start())
                || !valid_hash_start(content, full.start())
                || name.chars().all(|c| c.is_ascii_digit())
            {
                return None;
            }
            Some(TokenSpan {
                start: full.start(),
                end: full.end(),
                text: name.to_string(),
                raw: full.as_str().to_string(),
                display: None,
            })
        })
        .collect();

    LinkTokens {
        explicit,
        numeric,
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_set_merge_and_lookup() {
        let ranges = RangeSet::from_unsorted(vec![10..20, 0..5, 15..30, 7..7]);

        assert_eq!(ranges.iter().count(), 2);
        assert!(ranges.contains(0));
        assert!(!ranges.contains(5));
        assert!(ranges.contains(29));
        assert!(!ranges.contains(30));
        assert!(ranges.overlaps(&(4..11)));
        assert!(!ranges.overlaps(&(5..10)));
    }

    #[test]
    fn test_range_set_protect_rewrite() {
        let mut ranges = RangeSet::from_unsorted(vec![0..3, 20..25]);
        // 10..15 became 11 bytes
        ranges.protect_rewrite(10..15, 11);

        let spans: Vec<_> = ranges.iter().cloned().collect();
        assert_eq!(spans, vec![0..3, 10..21, 26..31]);
        assert!(!ranges.overlaps(&(3..10)));
        assert!(!ranges.overlaps(&(21..26)));
    }

    #[test]
    fn test_protected_ranges_cover_links_and_urls() {
        let content = concat!(
            "[Install](https://x.io/Install) ![Install](a.png) ",
            "https://ex.com/Install <https://a.b/Install>",
        );
        let protected = protected_ranges(content);
        for (at, _) in content.match_indices("Install") {
            assert!(protected.contains(at), "unprotected Install at {}", at);
        }
        assert!(!code_ranges(content).contains(1));
    }

    #[test]
    fn test_code_ranges() {
        let content = "text `#1` more\n\n```\n[[Inside]] #2\n```\n";
        let code = code_ranges(content);
        let inline_at = content.find("#1").unwrap();
        let block_at = content.find("[[Inside]]").unwrap();
        assert!(code.contains(inline_at));
        assert!(code.contains(block_at));
        assert!(!code.contains(0));
    }

    #[test]
    fn test_valid_hash_start() {
        assert!(valid_hash_start("#1", 0));
        assert!(valid_hash_start("see #1", 4));
        assert!(!valid_hash_start("##1", 1));
        assert!(!valid_hash_start("&#1", 1));
        assert!(!valid_hash_start("a#1", 1));
    }

    #[test]
    fn test_tokens_are_stateless() {
        let content = "[[A]] #1 #tag";
        assert_eq!(tokenize(content), tokenize(content));
    }
}
