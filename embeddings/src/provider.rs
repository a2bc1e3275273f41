//! Embedding providers.
//!
//! A provider is the remote capability that turns text into vectors. The
//! service talks to it only through [`EmbeddingProvider`], so timeouts,
//! retries or alternative backends can be layered here without touching the
//! cache or the token limiter.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{ProviderError, ProviderResult};

/// Default OpenAI embedding model.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default timeout for a single provider request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Model used for every request.
    fn model(&self) -> &str;

    /// Generate an embedding for the given text.
    async fn embed(&self, text: &str) -> ProviderResult<Embedding>;

    /// Generate embeddings for multiple texts, one per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Embedding>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

/// OpenAI embedding provider.
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    model: String,
}

impl OpenAIProvider {
    /// Create a provider for `model` authenticated with `api_key`.
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> ProviderResult<Self> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_client(DEFAULT_TIMEOUT)?,
            model: model.into(),
        })
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Rebuild the HTTP client with a different request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> ProviderResult<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    async fn request(&self, input: serde_json::Value) -> ProviderResult<OpenAIEmbeddingResponse> {
        let body = serde_json::json!({
            "input": input,
            "model": self.model,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiRequest(format!("{status}: {error_text}")));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn build_client(timeout: Duration) -> ProviderResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> ProviderResult<Embedding> {
        debug!("Generating embedding with model: {}", self.model);

        let result = self.request(serde_json::json!(text)).await?;
        let embedding = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No embedding in response".to_string()))?
            .embedding;

        info!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Generating batch embeddings for {} texts with model: {}",
            texts.len(),
            self.model
        );

        let mut result = self.request(serde_json::json!(texts)).await?;
        if result.data.len() != texts.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                result.data.len()
            )));
        }

        // The API reports each item's input position; do not rely on array order.
        result.data.sort_by_key(|item| item.index);
        let embeddings: Vec<Embedding> = result
            .data
            .into_iter()
            .map(|item| item.embedding)
            .collect();

        info!("Generated {} batch embeddings", embeddings.len());
        Ok(embeddings)
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
