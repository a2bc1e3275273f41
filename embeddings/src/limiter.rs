//! Token-aware truncation of text before it is sent to a provider.

use tracing::{info, warn};

use crate::error::TokenizerError;
use crate::tokenizer::Tokenizer;

/// Default token budget for a single embedding input.
pub const DEFAULT_MAX_TOKENS: usize = 2000;

/// Limit `text` to at most `max_tokens` tokens.
///
/// Text within the budget is returned unchanged. Longer text keeps its first
/// `max_tokens` tokens and is decoded back to a string, so the cut lands on a
/// token boundary rather than a word boundary. If that boundary falls inside
/// a multi-byte character, trailing tokens are dropped until the prefix
/// decodes. Any other tokenizer error is returned as is.
pub fn limit_token_length(
    tokenizer: &dyn Tokenizer,
    text: &str,
    max_tokens: usize,
) -> Result<String, TokenizerError> {
    let tokens = tokenizer.encode(text);

    if tokens.len() <= max_tokens {
        info!(
            "The text's {} tokens is within the token limit of {max_tokens}",
            tokens.len()
        );
        return Ok(text.to_string());
    }

    warn!(
        "The provided text has {} tokens, exceeding the limit of {max_tokens}; truncating",
        tokens.len()
    );

    let mut keep = max_tokens;
    loop {
        match tokenizer.decode(&tokens[..keep]) {
            Ok(limited) => return Ok(limited),
            Err(TokenizerError::InvalidUtf8(_)) if keep > 0 => keep -= 1,
            Err(err) => return Err(err),
        }
    }
}
