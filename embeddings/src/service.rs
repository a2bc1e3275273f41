//! Cached, token-limited embedding service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::Embedding;
use crate::cache::EmbeddingCache;
use crate::config::EmbeddingSettings;
use crate::error::{EmbeddingError, ProviderError, Result};
use crate::limiter::{DEFAULT_MAX_TOKENS, limit_token_length};
use crate::provider::{EmbeddingProvider, OpenAIProvider};
use crate::tokenizer::{TiktokenTokenizer, Tokenizer};

/// Something that can embed a single piece of text.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Compute the embedding for `text`.
    async fn compute_embedding(&self, text: &str) -> Result<Embedding>;
}

/// Something that can embed many texts in one call.
#[async_trait]
pub trait BatchEmbedder: Send + Sync {
    /// Compute one embedding per input, in input order.
    async fn compute_batch_embeddings(&self, texts: &[String]) -> Result<Vec<Embedding>>;
}

/// Embedding service that caches single-text results and keeps inputs within
/// the provider's token limit.
///
/// Cache lookups use the caller's exact text, while new entries are stored
/// under the text actually sent to the provider (after truncation). Texts
/// that get truncated therefore never hit the cache on a repeat request.
pub struct EmbeddingsService {
    provider: Arc<dyn EmbeddingProvider>,
    tokenizer: Arc<dyn Tokenizer>,
    cache: EmbeddingCache,
    max_tokens: usize,
}

impl EmbeddingsService {
    /// Create a service over an arbitrary provider and tokenizer.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            provider,
            tokenizer,
            cache: EmbeddingCache::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build an OpenAI-backed service for `model` from `settings`.
    pub fn from_settings(model: &str, settings: &EmbeddingSettings) -> Result<Self> {
        let Some(api_key) = settings.api_key() else {
            error!("OPENAI_API_KEY environment variable is not set!");
            return Err(EmbeddingError::Configuration(
                "OPENAI_API_KEY environment variable is not set".to_string(),
            ));
        };

        let provider = OpenAIProvider::new(model, api_key)
            .and_then(|p| p.with_timeout(settings.request_timeout()))
            .map(|p| p.with_base_url(&settings.base_url))
            .map_err(|e| {
                error!("Error while initializing OpenAI embeddings provider: {e}");
                EmbeddingError::ProviderInit(e)
            })?;
        let tokenizer = TiktokenTokenizer::cl100k()?;

        info!("Initialized embeddings service with model {model}");
        Ok(Self::new(Arc::new(provider), Arc::new(tokenizer)).with_max_tokens(settings.max_tokens))
    }

    /// Set the token budget for single-text inputs.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Model used by the underlying provider.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Number of cached embeddings.
    pub async fn cached_entries(&self) -> usize {
        self.cache.len().await
    }

    /// Clear the cache of computed embeddings.
    pub async fn clear_cache(&self) {
        info!("Clearing embeddings service cache");
        self.cache.clear().await;
    }
}

impl std::fmt::Debug for EmbeddingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingsService")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextEmbedder for EmbeddingsService {
    async fn compute_embedding(&self, text: &str) -> Result<Embedding> {
        if let Some(embedding) = self.cache.get(text).await {
            info!("Embedding for {} chars of text found in cache", text.len());
            return Ok(embedding);
        }

        let effective_text = limit_token_length(self.tokenizer.as_ref(), text, self.max_tokens)?;

        info!("Computing embedding for {} chars of text", effective_text.len());
        let embedding = self
            .provider
            .embed(&effective_text)
            .await
            .map_err(|source| computation_error("Failed to compute embedding for text", source))?;

        self.cache.insert(effective_text, embedding.clone()).await;
        Ok(embedding)
    }
}

#[async_trait]
impl BatchEmbedder for EmbeddingsService {
    async fn compute_batch_embeddings(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let embeddings = self
            .provider
            .embed_batch(texts)
            .await
            .map_err(|source| computation_error("Failed to compute batch embeddings", source))?;

        if embeddings.len() != texts.len() {
            let source = ProviderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            ));
            return Err(computation_error("Failed to compute batch embeddings", source));
        }

        Ok(embeddings)
    }
}

fn computation_error(context: &str, source: ProviderError) -> EmbeddingError {
    error!("{context}: {source}");
    EmbeddingError::Computation {
        context: context.to_string(),
        source,
    }
}
