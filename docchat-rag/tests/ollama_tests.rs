//! Ollama embedding client against a canned local server.

#![cfg(feature = "ollama")]

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use docchat_rag::{EmbeddingProvider, OllamaEmbeddingProvider, RagError};
use serde_json::{Value, json};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn embed_handler(Json(body): Json<Value>) -> Json<Value> {
    let count = body["input"].as_array().map(Vec::len).unwrap_or(0);
    let embeddings: Vec<Vec<f32>> = (0..count).map(|i| vec![i as f32, 1.0, 0.0]).collect();
    Json(json!({ "model": body["model"], "embeddings": embeddings }))
}

#[tokio::test]
async fn embeds_a_batch_in_one_request() {
    let base_url = serve(Router::new().route("/api/embed", post(embed_handler))).await;
    let provider =
        OllamaEmbeddingProvider::new().unwrap().with_base_url(base_url).with_model("tiny", 3);

    let vectors = provider.embed_batch(&["a", "b", "c"]).await.unwrap();
    assert_eq!(vectors.len(), 3);
    assert_eq!(vectors[2], vec![2.0, 1.0, 0.0]);
    assert_eq!(provider.model_id(), "tiny");
    assert_eq!(provider.dimensions(), 3);
}

#[tokio::test]
async fn rejects_vectors_of_the_wrong_size() {
    let base_url = serve(Router::new().route("/api/embed", post(embed_handler))).await;
    let provider =
        OllamaEmbeddingProvider::new().unwrap().with_base_url(base_url).with_model("tiny", 384);

    let err = provider.embed("hello").await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 384, found: 3 }));
}

#[tokio::test]
async fn surfaces_api_errors() {
    let router = Router::new().route(
        "/api/embed",
        post(|| async {
            (StatusCode::NOT_FOUND, Json(json!({ "error": "model \"tiny\" not found" })))
        }),
    );
    let base_url = serve(router).await;
    let provider =
        OllamaEmbeddingProvider::new().unwrap().with_base_url(base_url).with_model("tiny", 3);

    let err = provider.embed("hello").await.unwrap_err();
    match err {
        RagError::EmbeddingError { provider, message } => {
            assert_eq!(provider, "Ollama");
            assert!(message.contains("not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_an_embedding_error() {
    let provider = OllamaEmbeddingProvider::new()
        .unwrap()
        .with_base_url("http://127.0.0.1:9")
        .with_model("tiny", 3);
    let err = provider.embed("hello").await.unwrap_err();
    assert!(matches!(err, RagError::EmbeddingError { .. }));
}
