//! # ZettelWiki Parser
//!
//! Token extraction for issue bodies, built on `regex` with a `pulldown-cmark`
//! pass for code awareness.
//!
//! This crate provides:
//! - Explicit links: `[[Title]]` and `[[Title|display]]`
//! - Numeric references: `#123` (never inside headings markers, entities or explicit links)
//! - Hashtags: `#tag`, including CJK tags
//! - **Code block awareness**: tokens inside code blocks, inline code and raw HTML are ignored
//! - Title slugs
//! - Keyword auto-linking that never touches existing explicit links
//!
//! ## Quick Start
//!
//! ```
//! use zettelwiki_parser::extract;
//!
//! let tokens = extract(Some("See [[Install]] and #3"));
//! assert_eq!(tokens.explicit.len(), 1);
//! assert_eq!(tokens.numeric.len(), 1);
//! ```
//!
//! ## Statelessness
//!
//! Every call tokenizes from scratch and returns plain spans. Compiled
//! patterns are immutable `LazyLock` statics, so extraction is safe to run
//! from many threads at once.

mod engine;

pub mod autolink;
pub mod extractor;
pub mod slug;

pub use autolink::{Keyword, KeywordIndex, auto_link, auto_link_document};
pub use extractor::{Extractor, extract, note_tags};
pub use slug::slugify;

// Re-export core token types for consumers
pub use zettelwiki_core::{LinkTokens, NumericToken, TokenSpan};
