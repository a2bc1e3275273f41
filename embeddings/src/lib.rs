//! # Embedcache
//!
//! Turns free text into embedding vectors through a remote provider, with an
//! in-memory cache in front of the provider and token-aware truncation of
//! inputs that exceed the provider's limit.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Embeddings Service                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  get_instance ──► EmbeddingsService ──► EmbeddingProvider        │
//! │   (ServiceCell)        │        │            (OpenAI)            │
//! │                        ▼        ▼                                │
//! │               EmbeddingCache   limit_token_length ──► Tokenizer  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single-text requests go through the cache and the limiter; batch requests
//! go straight to the provider.

pub mod cache;
pub mod config;
pub mod error;
pub mod limiter;
pub mod provider;
pub mod service;
pub mod singleton;
pub mod tokenizer;

pub use cache::EmbeddingCache;
pub use config::EmbeddingSettings;
pub use error::{EmbeddingError, ProviderError, ProviderResult, Result, TokenizerError};
pub use limiter::{DEFAULT_MAX_TOKENS, limit_token_length};
pub use provider::{DEFAULT_MODEL, EmbeddingProvider, OpenAIProvider};
pub use service::{BatchEmbedder, EmbeddingsService, TextEmbedder};
pub use singleton::{ServiceCell, get_instance, get_instance_with_model};
pub use tokenizer::{TiktokenTokenizer, Tokenizer};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
