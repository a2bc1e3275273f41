//! Configuration for the embeddings service.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::limiter::DEFAULT_MAX_TOKENS;
use crate::provider::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};

/// Settings used to build an embeddings service.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// OpenAI API key. Absent or blank means the service cannot be built.
    pub openai_api_key: Option<String>,

    /// Default embedding model.
    pub model: String,

    /// API base URL.
    pub base_url: String,

    /// Token budget for single-text embedding inputs.
    pub max_tokens: usize,

    /// Timeout for each provider request, in seconds.
    pub request_timeout_secs: u64,
}

impl EmbeddingSettings {
    /// Read settings from the process environment, loading `.env` if present.
    pub fn from_env() -> Self {
        log_dotenv_result(dotenvy::dotenv());
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            openai_api_key: lookup("OPENAI_API_KEY"),
            model: lookup("EMBEDDINGS_MODEL").unwrap_or(defaults.model),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            max_tokens: parse_or(
                "EMBEDDINGS_MAX_TOKENS",
                lookup("EMBEDDINGS_MAX_TOKENS"),
                defaults.max_tokens,
            ),
            request_timeout_secs: parse_or(
                "EMBEDDINGS_TIMEOUT_SECS",
                lookup("EMBEDDINGS_TIMEOUT_SECS"),
                defaults.request_timeout_secs,
            ),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

// Keep the key out of debug output.
impl std::fmt::Debug for EmbeddingSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingSettings")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn log_dotenv_result(result: dotenvy::Result<PathBuf>) {
    match result {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => warn!("Failed to load .env file: {err}"),
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    key: &str,
    value: Option<String>,
    default: T,
) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {key}={raw:?}, using {default}");
            default
        }),
    }
}
