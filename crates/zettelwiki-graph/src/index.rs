//! Lookup structures over the full document set.

use std::collections::{BTreeMap, HashMap};
use zettelwiki_core::{Document, DocumentId};
use zettelwiki_parser::slugify;

/// Normalize titles and link tokens for comparison (trim + lowercase)
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Title and slug of an indexed note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMeta {
    pub title: String,
    pub slug: String,
}

/// O(1) title/slug lookup plus an id-ordered fuzzy candidate list.
///
/// Collisions on a normalized title or slug resolve to the lowest document
/// id, independent of input order. Empty titles are never indexed by title;
/// empty slugs are never indexed by slug.
#[derive(Debug, Clone, Default)]
pub struct NoteIndex {
    /// Map from normalized title to document
    by_title: HashMap<String, DocumentId>,

    /// Map from generated slug to document
    by_slug: HashMap<String, DocumentId>,

    /// Every document, ordered by id
    notes: BTreeMap<DocumentId, NoteMeta>,

    /// Normalized non-empty titles in ascending id order
    candidates: Vec<(DocumentId, String)>,
}

impl NoteIndex {
    /// Build the index. Pure and idempotent.
    pub fn build(documents: &[Document]) -> Self {
        let mut index = Self::default();

        for doc in documents {
            let slug = slugify(&doc.title);
            let title = normalize(&doc.title);

            if !title.is_empty() {
                keep_lowest(&mut index.by_title, title, doc.id);
            }
            if !slug.is_empty() {
                keep_lowest(&mut index.by_slug, slug.clone(), doc.id);
            }

            // Duplicate ids: the first occurrence is kept
            index.notes.entry(doc.id).or_insert_with(|| NoteMeta {
                title: doc.title.clone(),
                slug,
            });
        }

        index.candidates = index
            .notes
            .iter()
            .map(|(id, meta)| (*id, normalize(&meta.title)))
            .filter(|(_, title)| !title.is_empty())
            .collect();

        log::debug!(
            "Note index built: {} notes, {} titles, {} slugs",
            index.notes.len(),
            index.by_title.len(),
            index.by_slug.len()
        );

        index
    }

    /// Exact (normalized) title lookup
    pub fn by_title(&self, title: &str) -> Option<DocumentId> {
        self.by_title.get(&normalize(title)).copied()
    }

    /// Slug lookup; the argument is slugified first
    pub fn by_slug(&self, text: &str) -> Option<DocumentId> {
        let slug = slugify(text);
        if slug.is_empty() {
            return None;
        }
        self.by_slug.get(&slug).copied()
    }

    /// Lowest-id document whose normalized title contains `needle`
    pub fn fuzzy(&self, needle: &str) -> Option<DocumentId> {
        let needle = normalize(needle);
        if needle.is_empty() {
            return None;
        }
        self.candidates
            .iter()
            .find(|(_, title)| title.contains(&needle))
            .map(|(id, _)| *id)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.notes.contains_key(&id)
    }

    pub fn meta(&self, id: DocumentId) -> Option<&NoteMeta> {
        self.notes.get(&id)
    }

    pub fn slug_of(&self, id: DocumentId) -> Option<&str> {
        self.notes.get(&id).map(|m| m.slug.as_str())
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Indexed ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.notes.keys().copied()
    }
}

fn keep_lowest(map: &mut HashMap<String, DocumentId>, key: String, id: DocumentId) {
    map.entry(key)
        .and_modify(|existing| {
            if id < *existing {
                *existing = id;
            }
        })
        .or_insert(id);
}
