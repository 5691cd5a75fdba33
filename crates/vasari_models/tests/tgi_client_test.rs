//! Tests for the TGI client against an in-process mock server.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use vasari_core::GenerationConfig;
use vasari_error::{GenerationError, GenerationErrorKind};
use vasari_models::{TextGenerator, TgiGenerator, TokenCounter};

/// Counts one token per whitespace-separated word.
struct WordCounter;

impl TokenCounter for WordCounter {
    fn count_tokens(&self, text: &str) -> Result<usize, GenerationError> {
        Ok(text.split_whitespace().count())
    }

    fn name(&self) -> &str {
        "words"
    }
}

type Received = Arc<Mutex<Vec<Value>>>;

async fn spawn_server(status: StatusCode, body: Value) -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let state = (received.clone(), status, body);
    let app = Router::new()
        .route(
            "/generate",
            post(
                |State((received, status, body)): State<(Received, StatusCode, Value)>,
                 Json(request): Json<Value>| async move {
                    received.lock().unwrap().push(request);
                    (status, Json(body))
                },
            ),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), received)
}

#[tokio::test]
async fn test_generate_returns_text_and_sends_sampling_parameters() {
    let (url, received) = spawn_server(StatusCode::OK, json!({"generated_text": "Hello!"})).await;
    let generator = TgiGenerator::new(&url, "local-model", Box::new(WordCounter));

    let text = generator
        .generate("USER: Hi ASSISTANT:", &GenerationConfig::default())
        .await
        .unwrap();
    assert_eq!(text, "Hello!");

    let requests = received.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request["inputs"], "USER: Hi ASSISTANT:");
    let parameters = &request["parameters"];
    assert_eq!(parameters["do_sample"], true);
    assert_eq!(parameters["max_new_tokens"], 512);
    assert_eq!(parameters["seed"], 299_792_458u64);
    assert_eq!(parameters["return_full_text"], false);
    assert!((parameters["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert!((parameters["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
}

#[tokio::test]
async fn test_generate_accepts_batch_response() {
    let (url, _) = spawn_server(StatusCode::OK, json!([{"generated_text": "first"}])).await;
    let generator = TgiGenerator::new(&url, "local-model", Box::new(WordCounter));

    let text = generator
        .generate("prompt", &GenerationConfig::default())
        .await
        .unwrap();
    assert_eq!(text, "first");
}

#[tokio::test]
async fn test_server_error_surfaces_as_api_error() {
    let (url, _) = spawn_server(
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({"error": "Input validation error: inputs too long", "error_type": "validation"}),
    )
    .await;
    let generator = TgiGenerator::new(&url, "local-model", Box::new(WordCounter));

    let err = generator
        .generate("prompt", &GenerationConfig::default())
        .await
        .unwrap_err();
    let generation = err.as_generation().expect("generation error");
    assert_eq!(
        generation.kind,
        GenerationErrorKind::Api {
            status: 422,
            message: "Input validation error: inputs too long".to_string(),
        }
    );
}

#[tokio::test]
async fn test_malformed_body_is_a_parsing_error() {
    let (url, _) = spawn_server(StatusCode::OK, json!({"unexpected": true})).await;
    let generator = TgiGenerator::new(&url, "local-model", Box::new(WordCounter));

    let err = generator
        .generate("prompt", &GenerationConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_generation().map(|e| &e.kind),
        Some(GenerationErrorKind::ResponseParsing(_))
    ));
}

#[tokio::test]
async fn test_prompt_over_budget_is_rejected_before_sending() {
    let (url, received) = spawn_server(StatusCode::OK, json!({"generated_text": "unused"})).await;
    let generator = TgiGenerator::new(&url, "local-model", Box::new(WordCounter));
    let config = GenerationConfig::builder()
        .max_prompt_tokens(3usize)
        .build()
        .unwrap();

    let err = generator.generate("one two three", &config).await.unwrap_err();
    let generation = err.as_generation().expect("generation error");
    assert!(generation.is_prompt_too_long());
    assert_eq!(
        generation.kind,
        GenerationErrorKind::PromptTooLong { tokens: 3, max: 3 }
    );
    assert!(received.lock().unwrap().is_empty());

    // One token under the limit goes through.
    generator.generate("one two", &config).await.unwrap();
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreachable_server_is_an_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let generator = TgiGenerator::new(&format!("http://{}", addr), "m", Box::new(WordCounter));

    let err = generator
        .generate("prompt", &GenerationConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_generation().map(|e| &e.kind),
        Some(GenerationErrorKind::Http(_))
    ));
}

#[test]
fn test_endpoint_trims_trailing_slash() {
    let generator = TgiGenerator::new("http://localhost:8080/", "m", Box::new(WordCounter));
    assert_eq!(generator.endpoint(), "http://localhost:8080/generate");
    assert_eq!(generator.provider_name(), "tgi");
    assert_eq!(generator.model_name(), "m");
}
