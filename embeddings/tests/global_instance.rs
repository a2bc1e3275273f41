//! The process-wide accessor, driven through the real environment.
//!
//! Kept in its own test binary with a single test: it mutates process
//! environment variables and the global service slot.

use std::sync::Arc;

use assert_matches::assert_matches;
use embedcache::{EmbeddingError, get_instance, get_instance_with_model};
use pretty_assertions::assert_eq;

#[test]
fn test_global_instance_retries_after_missing_key() {
    // SAFETY: this binary runs a single test, so no other thread reads the
    // environment concurrently.
    unsafe {
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("EMBEDDINGS_MODEL");
    }

    let err = get_instance().unwrap_err();
    assert_matches!(err, EmbeddingError::Configuration(_));

    // SAFETY: as above.
    unsafe {
        std::env::set_var("OPENAI_API_KEY", "sk-valid");
    }

    let first = get_instance().unwrap();
    assert_eq!(first.model(), "text-embedding-3-small");

    let second = get_instance().unwrap();
    let other_model = get_instance_with_model("text-embedding-3-large").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &other_model));
    assert_eq!(other_model.model(), "text-embedding-3-small");
}
