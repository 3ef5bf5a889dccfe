//! Pipeline entry point: documents in, linked corpus out.
//!
//! [`LinkEngine::link`] runs the whole pipeline once over an in-memory
//! corpus; the resulting [`LinkedCorpus`] is immutable and `Send + Sync`,
//! so graphs for many focus ids can be built concurrently from one link
//! pass.

use crate::backlinks::build_backlinks;
use crate::bidirectional::{detect, partners};
use crate::graph::{GraphOptions, GraphStats, build_graph, node_url};
use crate::index::NoteIndex;
use crate::resolver::{self, ExplicitMention, LinkSet, UnresolvedLink};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::instrument;
use zettelwiki_core::{
    BacklinkEntry, BidirectionalSet, CacheKey, Document, DocumentId, GraphCache, KnowledgeGraph,
    LinkAnnotation, LinkingConfig, MentionMap, ResolvedLink, fingerprint_corpus,
};
use zettelwiki_parser::{Extractor, KeywordIndex, auto_link_document, note_tags};

/// Runs the linking pipeline under one configuration
#[derive(Debug, Clone)]
pub struct LinkEngine {
    config: LinkingConfig,
    extractor: Extractor,
}

impl LinkEngine {
    pub fn new(config: LinkingConfig) -> Self {
        Self {
            extractor: Extractor::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &LinkingConfig {
        &self.config
    }

    /// Link a corpus. Never fails: a bad document only loses its links.
    #[instrument(skip(self, documents), fields(documents = documents.len()), name = "engine_link")]
    pub fn link(&self, documents: &[Document]) -> LinkedCorpus {
        let fingerprint = fingerprint_corpus(documents);
        let documents = self.auto_link(documents);
        let index = NoteIndex::build(&documents);

        let mut links = LinkSet::new();
        let mut explicit: Vec<ExplicitMention> = Vec::new();
        let mut unresolved: Vec<UnresolvedLink> = Vec::new();
        let mut tags: BTreeMap<DocumentId, Vec<String>> = BTreeMap::new();
        let mut seen = HashSet::new();

        for doc in &documents {
            if !seen.insert(doc.id) {
                log::warn!("Duplicate document id {}; keeping the first occurrence", doc.id);
                continue;
            }

            let tokens = self.extractor.extract_document(doc);
            tags.insert(doc.id, note_tags(&tokens, doc));

            if self.config.enabled {
                let resolved = resolver::resolve_tokens(doc.id, &tokens, &index);
                links.extend(resolved.links);
                explicit.extend(resolved.mentions);
                unresolved.extend(resolved.unresolved);
            }
        }

        let mentions = links.mention_map();
        let bidirectional = if self.config.enabled && self.config.highlight_bidirectional {
            detect(&mentions)
        } else {
            BidirectionalSet::new()
        };
        let backlinks = if self.config.enabled && self.config.show_backlinks {
            build_backlinks(&documents, &explicit, &index)
        } else {
            BTreeMap::new()
        };

        log::info!(
            "Linked {} documents: {} links, {} mutual pairs, {} unresolved",
            index.len(),
            links.len(),
            bidirectional.values().map(|s| s.len()).sum::<usize>() / 2,
            unresolved.len()
        );

        LinkedCorpus {
            config: self.config.clone(),
            documents,
            index,
            links: links.into_vec(),
            mentions,
            bidirectional,
            backlinks,
            tags,
            unresolved,
            fingerprint,
        }
    }

    /// Keyword pre-pass over a private copy of the corpus
    fn auto_link(&self, documents: &[Document]) -> Vec<Document> {
        let mut documents = documents.to_vec();
        if !self.config.enabled || !self.config.auto_link_keywords {
            return documents;
        }

        let keywords = KeywordIndex::from_documents(&documents, self.config.keyword_min_length);
        for doc in &mut documents {
            if doc.body_text().len() > self.config.max_body_bytes {
                continue;
            }
            doc.body = auto_link_document(doc, &keywords, &self.config);
        }

        log::debug!("Auto-linked bodies with {} keywords", keywords.len());
        documents
    }
}

impl Default for LinkEngine {
    fn default() -> Self {
        Self::new(LinkingConfig::default())
    }
}

/// Everything a renderer needs for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteView {
    pub id: DocumentId,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub tags: Vec<String>,
    pub outgoing: Vec<DocumentId>,
    pub backlinks: Vec<BacklinkEntry>,
    pub bidirectional: Vec<DocumentId>,
    pub annotations: Vec<LinkAnnotation>,
}

/// Immutable output of one link pass
#[derive(Debug, Clone)]
pub struct LinkedCorpus {
    config: LinkingConfig,
    /// Documents after the keyword pre-pass
    documents: Vec<Document>,
    index: NoteIndex,
    links: Vec<ResolvedLink>,
    mentions: MentionMap,
    bidirectional: BidirectionalSet,
    backlinks: BTreeMap<DocumentId, Vec<BacklinkEntry>>,
    tags: BTreeMap<DocumentId, Vec<String>>,
    unresolved: Vec<UnresolvedLink>,
    fingerprint: String,
}

impl LinkedCorpus {
    /// Build the renderable graph, pruned around `focus` when large
    pub fn graph(&self, focus: Option<DocumentId>) -> KnowledgeGraph {
        build_graph(
            &self.documents,
            &self.links,
            &self.bidirectional,
            focus,
            &GraphOptions::from_config(&self.config),
        )
    }

    /// Like [`graph`](Self::graph), consulting `cache` first
    pub fn graph_cached(
        &self,
        focus: Option<DocumentId>,
        cache: &dyn GraphCache,
    ) -> KnowledgeGraph {
        let key = CacheKey::new(self.fingerprint.clone(), &self.config, focus);
        if let Some(graph) = cache.get(&key) {
            log::debug!("Graph cache hit for focus {:?}", focus);
            return graph;
        }

        let graph = self.graph(focus);
        cache.put(key, graph.clone());
        graph
    }

    /// Page-level view of one document
    pub fn note(&self, id: DocumentId) -> Option<NoteView> {
        let meta = self.index.meta(id)?;
        Some(NoteView {
            id,
            title: meta.title.clone(),
            slug: meta.slug.clone(),
            url: node_url(&self.config.base_path, id),
            tags: self.tags(id).to_vec(),
            outgoing: self
                .mentions
                .get(&id)
                .map(|targets| targets.iter().copied().collect())
                .unwrap_or_default(),
            backlinks: self.backlinks(id).to_vec(),
            bidirectional: partners(&self.bidirectional, id),
            annotations: self.annotate(id),
        })
    }

    /// Explicit link occurrences of a document with resolved/unlinked markers
    pub fn annotate(&self, id: DocumentId) -> Vec<LinkAnnotation> {
        if !self.config.enabled {
            return Vec::new();
        }
        self.documents
            .iter()
            .find(|d| d.id == id)
            .filter(|d| d.body_text().len() <= self.config.max_body_bytes)
            .map(|d| resolver::annotate(d.body.as_deref(), id, &self.index))
            .unwrap_or_default()
    }

    pub fn links(&self) -> &[ResolvedLink] {
        &self.links
    }

    pub fn mention_map(&self) -> &MentionMap {
        &self.mentions
    }

    pub fn bidirectional(&self) -> &BidirectionalSet {
        &self.bidirectional
    }

    pub fn partners(&self, id: DocumentId) -> Vec<DocumentId> {
        partners(&self.bidirectional, id)
    }

    /// Backlinks of one document, in document order
    pub fn backlinks(&self, id: DocumentId) -> &[BacklinkEntry] {
        self.backlinks.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn all_backlinks(&self) -> &BTreeMap<DocumentId, Vec<BacklinkEntry>> {
        &self.backlinks
    }

    /// Hashtags then label names, deduplicated
    pub fn tags(&self, id: DocumentId) -> &[String] {
        self.tags.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn unresolved(&self) -> &[UnresolvedLink] {
        &self.unresolved
    }

    /// Documents as linked (bodies include auto-inserted links)
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn index(&self) -> &NoteIndex {
        &self.index
    }

    /// Statistics of the full, unpruned graph
    pub fn stats(&self) -> GraphStats {
        GraphStats::of(&self.graph(None))
    }

    /// SHA-256 of the input corpus
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn config(&self) -> &LinkingConfig {
        &self.config
    }
}
