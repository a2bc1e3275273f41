//! Error types for the embeddings service.

use thiserror::Error;

/// Result type alias for embedding service operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Result type alias for raw provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Errors surfaced by the embeddings service.
///
/// Provider failures never reach callers bare: they are wrapped in
/// [`EmbeddingError::ProviderInit`] or [`EmbeddingError::Computation`] with the
/// original [`ProviderError`] kept as the source.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Missing or invalid credential.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider connection could not be established.
    #[error("failed to initialize embedding provider: {0}")]
    ProviderInit(#[source] ProviderError),

    /// A single-text or batch embedding call failed.
    #[error("{context}")]
    Computation {
        context: String,
        #[source]
        source: ProviderError,
    },

    /// Tokenizer failure, propagated unchanged.
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
}

/// Errors raised by an embedding provider backend.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// API request failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Invalid response from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Tokenizer failures.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The encoding could not be loaded.
    #[error("failed to load tokenizer: {0}")]
    Load(String),

    /// The tokens decode to bytes that are not valid UTF-8, e.g. a sequence
    /// cut inside a multi-byte character.
    #[error("tokens do not decode to valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Any other backend failure.
    #[error("tokenizer error: {0}")]
    Backend(String),
}
