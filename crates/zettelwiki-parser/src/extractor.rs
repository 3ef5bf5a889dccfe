//! Link extraction: `[[Title]]`, `[[Title|alias]]`, `#123` and `#tag`.

use crate::engine;
use zettelwiki_core::{Document, DocumentId, Error, LinkTokens, LinkingConfig, Result};

/// Extract every link and tag token from a body.
///
/// Total: an empty or absent body yields empty token lists.
///
/// # Examples
///
/// ```
/// use zettelwiki_parser::extract;
///
/// let tokens = extract(Some("See [[Install]] and #3, tagged #setup"));
/// assert_eq!(tokens.explicit[0].text, "Install");
/// assert_eq!(tokens.numeric[0].id.get(), 3);
/// assert_eq!(tokens.tags[0].text, "setup");
///
/// assert!(extract(None).is_empty());
/// ```
pub fn extract(body: Option<&str>) -> LinkTokens {
    match body {
        Some(content) => engine::tokenize(content),
        None => LinkTokens::default(),
    }
}

/// Size-bounded extractor used by the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    max_body_bytes: usize,
}

impl Extractor {
    /// Create an extractor refusing bodies above `max_body_bytes`
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }

    pub fn from_config(config: &LinkingConfig) -> Self {
        Self::new(config.max_body_bytes)
    }

    /// Extract tokens, failing only when the body exceeds the size limit
    pub fn try_extract(&self, id: DocumentId, body: Option<&str>) -> Result<LinkTokens> {
        if let Some(content) = body
            && content.len() > self.max_body_bytes
        {
            return Err(Error::body_too_large(id, content.len(), self.max_body_bytes));
        }
        Ok(extract(body))
    }

    /// Extract tokens for a document; an oversized body is treated as plain text
    pub fn extract_document(&self, doc: &Document) -> LinkTokens {
        match self.try_extract(doc.id, doc.body.as_deref()) {
            Ok(tokens) => tokens,
            Err(e) => {
                log::warn!("{}; links in this document are not extracted", e);
                LinkTokens::default()
            }
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::from_config(&LinkingConfig::default())
    }
}

/// Hashtags from the body followed by label names not already present.
///
/// ```
/// use zettelwiki_core::{Document, Label};
/// use zettelwiki_parser::{extract, note_tags};
///
/// let doc = Document::new(1, "Note", "about #rust and #wiki")
///     .with_labels(vec![Label::new("wiki"), Label::new("guide")]);
/// let tokens = extract(doc.body.as_deref());
/// assert_eq!(note_tags(&tokens, &doc), vec!["rust", "wiki", "guide"]);
/// ```
pub fn note_tags(tokens: &LinkTokens, doc: &Document) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in &tokens.tags {
        if !tags.contains(&tag.text) {
            tags.push(tag.text.clone());
        }
    }
    for label in &doc.labels {
        if !label.name.is_empty() && !tags.contains(&label.name) {
            tags.push(label.name.clone());
        }
    }
    tags
}
