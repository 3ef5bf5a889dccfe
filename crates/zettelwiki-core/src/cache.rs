//! Time-bounded result cache for built graphs.
//!
//! Graph builds are pure, so a cache is only an accelerator: a miss or an
//! expired entry always falls back to a full recomputation. Keys combine a
//! SHA-256 fingerprint of the corpus, a fingerprint of the configuration and
//! the focus id, so an edited corpus never serves a stale graph.
//!
//! [`GraphCache`] is the seam for external key-value stores;
//! [`MemoryGraphCache`] is the in-process implementation.

use crate::config::LinkingConfig;
use crate::models::{Document, DocumentId, KnowledgeGraph};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

/// Identity of one graph build
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub corpus: String,
    pub config: String,
    pub focus: Option<DocumentId>,
}

impl CacheKey {
    pub fn new(
        corpus: impl Into<String>,
        config: &LinkingConfig,
        focus: Option<DocumentId>,
    ) -> Self {
        Self {
            corpus: corpus.into(),
            config: fingerprint_config(config),
            focus,
        }
    }
}

/// Pluggable store for built graphs
pub trait GraphCache: Send + Sync {
    /// Fetch a live entry; expired entries count as misses
    fn get(&self, key: &CacheKey) -> Option<KnowledgeGraph>;

    /// Store a freshly built graph
    fn put(&self, key: CacheKey, graph: KnowledgeGraph);

    /// Drop every entry
    fn clear(&self);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    graph: KnowledgeGraph,
    cached_at: Instant,
}

/// In-memory TTL cache, safe to share across concurrent builds
#[derive(Debug)]
pub struct MemoryGraphCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl MemoryGraphCache {
    /// Create a cache whose entries live for `ttl`. A zero TTL stores nothing.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Create a cache from the configured TTL
    pub fn from_config(config: &LinkingConfig) -> Self {
        Self::new(Duration::from_secs(config.cache_ttl_secs))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every expired entry
    pub fn evict_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.cached_at.elapsed() < ttl);
        before - self.entries.len()
    }
}

impl GraphCache for MemoryGraphCache {
    fn get(&self, key: &CacheKey) -> Option<KnowledgeGraph> {
        {
            let entry = self.entries.get(key)?;
            if entry.cached_at.elapsed() < self.ttl {
                return Some(entry.graph.clone());
            }
        }

        // Re-checked under the shard lock: a concurrent put may have refreshed it
        let ttl = self.ttl;
        if self
            .entries
            .remove_if(key, |_, entry| entry.cached_at.elapsed() >= ttl)
            .is_some()
        {
            log::debug!("Graph cache entry expired (focus: {:?})", key.focus);
        }
        None
    }

    fn put(&self, key: CacheKey, graph: KnowledgeGraph) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(
            key,
            CacheEntry {
                graph,
                cached_at: Instant::now(),
            },
        );
    }

    fn clear(&self) {
        self.entries.clear();
        log::debug!("Graph cache cleared");
    }
}

/// Stable SHA-256 fingerprint over every document attribute the engine reads
pub fn fingerprint_corpus(documents: &[Document]) -> String {
    let mut hasher = Sha256::new();
    for doc in documents {
        hasher.update(doc.id.get().to_le_bytes());
        hasher.update(doc.title.as_bytes());
        hasher.update([0u8]);
        hasher.update(doc.body_text().as_bytes());
        hasher.update([0u8]);
        for label in &doc.labels {
            hasher.update(label.name.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(doc.state.as_str().as_bytes());
        hasher.update(doc.comment_count.to_le_bytes());
        hasher.update(doc.created_at.timestamp().to_le_bytes());
        hasher.update(doc.updated_at.timestamp().to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

fn fingerprint_config(config: &LinkingConfig) -> String {
    let encoded = serde_json::to_vec(config).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    format!("{:x}", hasher.finalize())[..16].to_string()
}
