//! End-to-end exchanges against an in-process chat completions server.
//!
//! Each test starts its own axum upstream on an ephemeral port, drives the
//! real `HttpChatClient` through the orchestrator, and checks both what was
//! sent upstream and what the conversation ends up showing.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use serde_json::Value;

use lumen_chat::{
    ChatClient, ChatError, ChatRequest, ConversationOrchestrator, HttpChatClient, Mood, Persona,
    SpeechOutput, Utterance,
};

// =============================================================================
// Helpers
// =============================================================================

const TEST_KEY: &str = "sk-test-12345";

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    body: &'static str,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl Upstream {
    fn requests(&self) -> Vec<(Option<String>, Value)> {
        self.seen.lock().unwrap().clone()
    }
}

async fn completions(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let json = serde_json::from_str(&body).unwrap_or(Value::Null);
    upstream.seen.lock().unwrap().push((auth, json));
    (upstream.status, upstream.body.to_string())
}

/// Start an upstream that answers every request with `status` and `body`.
async fn spawn_upstream(status: StatusCode, body: &'static str) -> (String, Upstream) {
    let upstream = Upstream {
        status,
        body,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1/chat/completions", addr), upstream)
}

#[derive(Default)]
struct RecordingSpeech {
    utterances: Mutex<Vec<Utterance>>,
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, utterance: Utterance) {
        self.utterances.lock().unwrap().push(utterance);
    }
}

fn orchestrator_for(endpoint: &str) -> (ConversationOrchestrator, Arc<RecordingSpeech>) {
    let client = Arc::new(HttpChatClient::new(endpoint, TEST_KEY).unwrap());
    let speech = Arc::new(RecordingSpeech::default());
    let orch = ConversationOrchestrator::new(Persona::default(), client, speech.clone());
    (orch, speech)
}

async fn exchange(endpoint: &str, text: &str) -> (ConversationOrchestrator, Arc<RecordingSpeech>) {
    let (mut orch, speech) = orchestrator_for(endpoint);
    orch.set_input(text);
    assert!(orch.submit().is_some());
    assert_eq!(orch.state().input(), "");
    assert!(orch.settle().await);
    assert!(!orch.state().is_loading());
    (orch, speech)
}

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test]
async fn test_request_has_bearer_and_expected_body() {
    let (endpoint, upstream) = spawn_upstream(
        StatusCode::OK,
        r#"{"choices":[{"message":{"content":"hello"}}]}"#,
    )
    .await;

    exchange(&endpoint, "  I love mornings ").await;

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test-12345"));

    let persona = Persona::default();
    assert_eq!(body["model"], persona.model.as_str());
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], persona.system_prompt.as_str());
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "I love mornings");
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
    let temperature = body["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);
}

// =============================================================================
// Outcomes through the orchestrator
// =============================================================================

#[tokio::test]
async fn test_success_reply_is_labeled_and_spoken() {
    let (endpoint, _upstream) = spawn_upstream(
        StatusCode::OK,
        r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":" hello \n"}}]}"#,
    )
    .await;

    let (orch, speech) = exchange(&endpoint, "how are you?").await;

    assert_eq!(orch.state().response(), "Lumen: hello");
    assert_eq!(orch.state().mood(), Mood::Wonder);
    let spoken = speech.utterances.lock().unwrap().clone();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].text, "hello");
    assert_eq!(spoken[0].rate, Mood::Wonder.prosody().rate);
    assert_eq!(spoken[0].pitch, Mood::Wonder.prosody().pitch);
}

#[tokio::test]
async fn test_error_envelope_with_error_status_is_remote() {
    let (endpoint, _upstream) = spawn_upstream(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{"error":{"message":"rate limited","type":"requests"}}"#,
    )
    .await;

    let (orch, speech) = exchange(&endpoint, "hello").await;

    assert_eq!(orch.state().response(), "API error: rate limited");
    assert!(speech.utterances.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_body_is_local_error() {
    let (endpoint, _upstream) = spawn_upstream(StatusCode::OK, "").await;

    let (orch, speech) = exchange(&endpoint, "hello").await;

    assert_eq!(
        orch.state().response(),
        ChatError::EmptyBody.display_message()
    );
    assert!(speech.utterances.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_html_gateway_page_is_malformed_body() {
    let (endpoint, _upstream) =
        spawn_upstream(StatusCode::BAD_GATEWAY, "<html>502 Bad Gateway</html>").await;

    let (orch, speech) = exchange(&endpoint, "hello").await;

    let response = orch.state().response();
    assert!(response.starts_with("Local error: malformed response body"));
    assert!(speech.utterances.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unrecognized_json_is_unexpected_shape() {
    let (endpoint, _upstream) = spawn_upstream(StatusCode::OK, r#"{"result":"hello"}"#).await;

    let (orch, _speech) = exchange(&endpoint, "hello").await;

    assert!(orch
        .state()
        .response()
        .starts_with("Local error: unexpected response shape"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_local_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (orch, speech) = exchange(&format!("http://{}/v1/chat/completions", addr), "hello").await;

    assert!(orch.state().response().starts_with("Local error: "));
    assert!(speech.utterances.lock().unwrap().is_empty());
}

// =============================================================================
// Client used directly
// =============================================================================

#[tokio::test]
async fn test_client_send_returns_raw_content() {
    let (endpoint, upstream) = spawn_upstream(
        StatusCode::OK,
        r#"{"choices":[{"message":{"content":"  spaced  "}}]}"#,
    )
    .await;

    let client = HttpChatClient::new(endpoint, TEST_KEY).unwrap();
    let request = ChatRequest::new(&Persona::default(), "hi");
    let reply = client.send(&request).await.unwrap();

    assert_eq!(reply, "  spaced  ");
    assert_eq!(upstream.requests().len(), 1);
}

#[tokio::test]
async fn test_one_request_per_submit() {
    let (endpoint, upstream) = spawn_upstream(
        StatusCode::OK,
        r#"{"choices":[{"message":{"content":"ok"}}]}"#,
    )
    .await;

    let (mut orch, _speech) = orchestrator_for(&endpoint);
    orch.set_input("first");
    orch.submit();
    orch.set_input("second");
    assert!(orch.submit().is_none());
    orch.settle().await;

    assert!(orch.submit().is_some());
    orch.settle().await;

    let sent: Vec<String> = upstream
        .requests()
        .iter()
        .map(|(_, body)| body["messages"][1]["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(sent, vec!["first", "second"]);
}
