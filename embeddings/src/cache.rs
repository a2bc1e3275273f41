//! In-memory embedding cache.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::Embedding;

/// Cache of computed embeddings keyed by the exact text that was embedded.
///
/// The cache is unbounded: entries live until [`EmbeddingCache::clear`] is
/// called or the owning service is dropped.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: RwLock<HashMap<String, Embedding>>,
}

impl EmbeddingCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an embedding from the cache.
    pub async fn get(&self, text: &str) -> Option<Embedding> {
        self.entries.read().await.get(text).cloned()
    }

    /// Check if an embedding is cached.
    pub async fn contains(&self, text: &str) -> bool {
        self.entries.read().await.contains_key(text)
    }

    /// Put an embedding in the cache, replacing any previous value.
    pub async fn insert(&self, text: impl Into<String>, embedding: Embedding) {
        let text = text.into();
        debug!("Caching embedding for {} chars of text", text.len());
        self.entries.write().await.insert(text, embedding);
    }

    /// Number of cached embeddings.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Clear the entire cache.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        info!("Cleared embedding cache");
    }
}
