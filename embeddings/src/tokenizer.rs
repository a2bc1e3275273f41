//! Tokenizers used to measure and cut text before it is embedded.

use tiktoken_rs::CoreBPE;

use crate::error::TokenizerError;

/// A tokenizer matching the provider's own tokenization scheme.
pub trait Tokenizer: Send + Sync {
    /// Split text into token ids.
    fn encode(&self, text: &str) -> Vec<usize>;

    /// Turn token ids back into text.
    ///
    /// Fails with [`TokenizerError::InvalidUtf8`] when the tokens do not form
    /// valid UTF-8, which can happen when a sequence is cut inside a
    /// multi-byte character.
    fn decode(&self, tokens: &[usize]) -> Result<String, TokenizerError>;

    /// Number of tokens in `text`.
    fn count_tokens(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// `cl100k_base` BPE tokenizer, the encoding used by OpenAI embedding models.
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    /// Load the `cl100k_base` encoding.
    pub fn cl100k() -> Result<Self, TokenizerError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| TokenizerError::Load(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl std::fmt::Debug for TiktokenTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenTokenizer")
            .field("encoding", &"cl100k_base")
            .finish()
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn encode(&self, text: &str) -> Vec<usize> {
        self.bpe.encode_ordinary(text)
    }

    fn decode(&self, tokens: &[usize]) -> Result<String, TokenizerError> {
        // `CoreBPE::decode` only fails on the UTF-8 conversion of the bytes.
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|e| TokenizerError::InvalidUtf8(e.to_string()))
    }
}
