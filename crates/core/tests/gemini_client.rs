//! Runs the enhancement client against a local stub of the
//! `generateContent` endpoint.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use portrait_core::gemini::ENHANCEMENT_PROMPT;
use portrait_core::session::ENHANCE_FAILED_MESSAGE;
use portrait_core::{
    AppError, Config, EnhancementOutcome, GeminiClient, Phase, SelectedFile, SessionController,
};
use serde_json::{Value, json};
use std::io::Write;
use std::sync::{Arc, Mutex};

const MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone)]
struct SeenRequest {
    path: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

async fn generate_content(
    State(stub): State<Stub>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    // The key may travel as a header or as a `key` query parameter
    let header_key = headers
        .get("x-goog-api-key")
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    let query_key = uri.query().and_then(|query| {
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("key="))
            .map(String::from)
    });
    stub.seen.lock().unwrap().push(SeenRequest {
        path: uri.path().to_string(),
        api_key: header_key.or(query_key),
        body,
    });
    (stub.status, Json(stub.reply.clone()))
}

/// Starts the stub and returns a client config pointing at it.
async fn spawn_stub(status: StatusCode, reply: Value) -> (Config, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        reply,
        seen: Arc::clone(&seen),
    };
    let app = Router::new().fallback(generate_content).with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = Config::builder()
        .with_api_key("test-key")
        .with_model(MODEL)
        .with_base_url(format!("http://{}/v1beta", addr))
        .build()
        .unwrap();
    (config, seen)
}

/// A well-formed `generateContent` reply carrying the given parts.
fn reply_with_parts(parts: Value) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": parts },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {
            "promptTokenCount": 12,
            "candidatesTokenCount": 8,
            "totalTokenCount": 20
        },
        "modelVersion": MODEL
    })
}

fn image_reply() -> Value {
    reply_with_parts(json!([
        { "text": "Re-rendered with an 85mm look." },
        { "inlineData": { "mimeType": "image/png", "data": "ZW5oYW5jZWQ=" } }
    ]))
}

/// All parts of all contents in a request body, in order.
fn request_parts(body: &Value) -> Vec<Value> {
    body["contents"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|content| content["parts"].as_array())
        .flatten()
        .cloned()
        .collect()
}

fn inline_data(body: &Value) -> Vec<Value> {
    request_parts(body)
        .into_iter()
        .filter_map(|part| part.get("inlineData").cloned())
        .collect()
}

fn texts(body: &Value) -> Vec<String> {
    request_parts(body)
        .into_iter()
        .filter_map(|part| part["text"].as_str().map(String::from))
        .collect()
}

#[tokio::test]
async fn sends_portrait_prompt_and_aspect_ratio() {
    let (config, seen) = spawn_stub(StatusCode::OK, image_reply()).await;
    let client = GeminiClient::new(&config).unwrap();

    let enhanced = client
        .enhance_portrait("data:image/jpeg;base64,cG9ydHJhaXQ=", "image/jpeg")
        .await
        .unwrap();
    assert_eq!(enhanced, "data:image/png;base64,ZW5oYW5jZWQ=");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert!(request.path.starts_with("/v1beta/"), "unexpected path {}", request.path);
    assert!(request.path.contains(MODEL), "unexpected path {}", request.path);
    assert!(request.path.ends_with(":generateContent"), "unexpected path {}", request.path);
    assert_eq!(request.api_key.as_deref(), Some("test-key"));

    assert_eq!(
        inline_data(&request.body),
        vec![json!({ "mimeType": "image/jpeg", "data": "cG9ydHJhaXQ=" })]
    );
    assert_eq!(texts(&request.body), vec![ENHANCEMENT_PROMPT.to_string()]);
    assert_eq!(request.body["generationConfig"]["imageConfig"]["aspectRatio"], "3:4");
}

#[tokio::test]
async fn accepts_raw_base64_without_prefix() {
    let (config, seen) = spawn_stub(StatusCode::OK, image_reply()).await;
    let client = GeminiClient::new(&config).unwrap();

    client.enhance_portrait("cG9ydHJhaXQ=", "image/webp").await.unwrap();

    let body = &seen.lock().unwrap()[0].body;
    assert_eq!(
        inline_data(body),
        vec![json!({ "mimeType": "image/webp", "data": "cG9ydHJhaXQ=" })]
    );
}

#[tokio::test]
async fn forwards_loosely_encoded_payloads_untouched() {
    let (config, seen) = spawn_stub(StatusCode::OK, image_reply()).await;
    let client = GeminiClient::new(&config).unwrap();

    // Unpadded and line-wrapped base64 is left for the service to judge
    for payload in ["cG9ydHJhaXQ", "cG9y\ndHJhaXQ="] {
        let enhanced = client
            .enhance_portrait(&format!("data:image/jpeg;base64,{payload}"), "image/jpeg")
            .await
            .unwrap();
        assert_eq!(enhanced, "data:image/png;base64,ZW5oYW5jZWQ=");
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(inline_data(&seen[0].body)[0]["data"], "cG9ydHJhaXQ");
    assert_eq!(inline_data(&seen[1].body)[0]["data"], "cG9y\ndHJhaXQ=");
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let reply = json!({ "error": { "code": 403, "message": "API key not valid." } });
    let (config, _seen) = spawn_stub(StatusCode::FORBIDDEN, reply).await;
    let client = GeminiClient::new(&config).unwrap();

    let err = client.enhance_portrait("cG9ydHJhaXQ=", "image/jpeg").await.unwrap_err();
    match err {
        AppError::Transport(message) => {
            assert!(message.contains("403"), "unexpected message: {message}");
        }
        other => panic!("expected a transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn text_only_reply_is_an_empty_result() {
    let reply = reply_with_parts(json!([{ "text": "I cannot edit this photo." }]));
    let (config, _seen) = spawn_stub(StatusCode::OK, reply).await;
    let client = GeminiClient::new(&config).unwrap();

    let err = client.enhance_portrait("cG9ydHJhaXQ=", "image/jpeg").await.unwrap_err();
    assert!(matches!(err, AppError::EmptyResult));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Grab a free port, then close it again
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config::builder()
        .with_api_key("test-key")
        .with_base_url(format!("http://{}/v1beta/", addr))
        .build()
        .unwrap();
    let client = GeminiClient::new(&config).unwrap();

    let err = client.enhance_portrait("cG9ydHJhaXQ=", "image/jpeg").await.unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));
}

fn portrait_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    file.write_all(b"portrait").unwrap();
    file
}

#[tokio::test]
async fn controller_round_trip_through_the_stub() {
    let (config, _seen) = spawn_stub(StatusCode::OK, image_reply()).await;
    let controller = SessionController::new(GeminiClient::new(&config).unwrap());
    let file = portrait_file();

    controller
        .select_file(SelectedFile::from_path(file.path()))
        .await
        .unwrap();
    assert_eq!(controller.start_enhancement().await, EnhancementOutcome::Completed);

    let session = controller.snapshot();
    assert_eq!(session.phase, Phase::Result);
    let result = session.result.unwrap();
    assert_eq!(result.original_encoding, "data:image/jpeg;base64,cG9ydHJhaXQ=");
    assert_eq!(result.enhanced_encoding, "data:image/png;base64,ZW5oYW5jZWQ=");
}

#[tokio::test]
async fn controller_hides_service_failures_behind_the_generic_message() {
    let reply = json!({ "error": { "code": 500, "message": "Internal error" } });
    let (config, _seen) = spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, reply).await;
    let controller = SessionController::new(GeminiClient::new(&config).unwrap());
    let file = portrait_file();

    controller
        .select_file(SelectedFile::from_path(file.path()))
        .await
        .unwrap();
    assert_eq!(controller.start_enhancement().await, EnhancementOutcome::Failed);

    let session = controller.snapshot();
    assert_eq!(session.phase, Phase::Ready);
    assert_eq!(session.status.message, ENHANCE_FAILED_MESSAGE);
    assert!(session.result.is_none());
}
