//! End-to-end tests of the embeddings service against a mock OpenAI API.

use assert_matches::assert_matches;
use embedcache::{
    BatchEmbedder, EmbeddingError, EmbeddingSettings, ProviderError, ServiceCell, TextEmbedder,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> EmbeddingSettings {
    EmbeddingSettings::default()
        .with_api_key("sk-test")
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(serde_json::json!({"input": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cell = ServiceCell::new();
    let service = cell
        .get_or_init_with("text-embedding-3-small", &settings(&server))
        .unwrap();

    let first = service.compute_embedding("hello").await.unwrap();
    let again = cell
        .get_or_init_with("text-embedding-3-small", &settings(&server))
        .unwrap()
        .compute_embedding("hello")
        .await
        .unwrap();

    assert_eq!(first, vec![0.1, 0.2, 0.3]);
    assert_eq!(again, first);
}

#[tokio::test]
async fn test_clear_cache_goes_back_to_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"embedding": [1.0], "index": 0}],
        })))
        .expect(2)
        .mount(&server)
        .await;

    let cell = ServiceCell::new();
    let service = cell
        .get_or_init_with("text-embedding-3-small", &settings(&server))
        .unwrap();

    service.compute_embedding("hello").await.unwrap();
    service.clear_cache().await;
    service.compute_embedding("hello").await.unwrap();
}

#[tokio::test]
async fn test_batch_returns_vectors_in_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(serde_json::json!({"input": ["a", "b", "c"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {"embedding": [1.0], "index": 0},
                {"embedding": [2.0], "index": 1},
                {"embedding": [3.0], "index": 2},
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cell = ServiceCell::new();
    let service = cell
        .get_or_init_with("text-embedding-3-small", &settings(&server))
        .unwrap();
    let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];

    let embeddings = service.compute_batch_embeddings(&texts).await.unwrap();

    assert_eq!(embeddings, vec![vec![1.0], vec![2.0], vec![3.0]]);
    assert_eq!(service.cached_entries().await, 0);
}

#[tokio::test]
async fn test_provider_error_is_wrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let cell = ServiceCell::new();
    let service = cell
        .get_or_init_with("text-embedding-3-small", &settings(&server))
        .unwrap();

    let err = service.compute_embedding("hello").await.unwrap_err();
    assert_matches!(
        err,
        EmbeddingError::Computation { source: ProviderError::ApiRequest(msg), .. }
            if msg.contains("upstream down")
    );
    assert_eq!(service.cached_entries().await, 0);
}
