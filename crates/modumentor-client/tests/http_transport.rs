//! Integration tests for [`HttpTransport`] against an in-process stub of the
//! assistant service.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::{Value, json};
use url::Url;

use modumentor_chat::protocol::{ChatRequest, UserRequest};
use modumentor_chat::{
    Action, ChatReply, ClearReply, MessageKind, Outcome, SessionState, ToolStatus, ToolTestReply,
    Transport, TransportError,
};
use modumentor_client::HttpTransport;

// ═══════════════════════════════════════════════════════════════════════
//  Stub server
// ═══════════════════════════════════════════════════════════════════════

async fn chat(Json(req): Json<ChatRequest>) -> Json<Value> {
    if req.message == "fail please" {
        return Json(json!({ "error": "model overloaded" }));
    }
    Json(json!({ "response": format!("echo {} for {}", req.message, req.user_id) }))
}

async fn clear(Json(req): Json<UserRequest>) -> Json<Value> {
    Json(json!({ "success": req.user_id == "web-user" }))
}

async fn help(Json(_req): Json<UserRequest>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "help unavailable" })),
    )
}

async fn test_tools(Json(_req): Json<UserRequest>) -> Json<Value> {
    Json(json!({
        "test_results": {
            "weather": { "status": "success", "response": "Delhi 31C" },
            "email": { "status": "failure", "response": "smtp down" }
        }
    }))
}

async fn analyze(Json(_req): Json<UserRequest>) -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
}

async fn spawn_stub() -> SocketAddr {
    let router = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/clear", post(clear))
        .route("/api/help", post(help))
        .route("/api/test-tools", post(test_tools))
        .route("/api/analyze-conversation", post(analyze))
        .route(
            "/slow/api/chat",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "response": "too late" }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn transport_for(addr: SocketAddr, prefix: &str, timeout: Duration) -> HttpTransport {
    let url = Url::parse(&format!("http://{addr}{prefix}")).unwrap();
    HttpTransport::with_base_url(url, timeout).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════
//  Endpoint round trips
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn chat_posts_message_and_user_id() {
    let addr = spawn_stub().await;
    let transport = transport_for(addr, "", Duration::from_secs(5));

    let reply = transport.chat("hi", "web-user").await.unwrap();
    assert_eq!(reply, ChatReply::Response("echo hi for web-user".into()));
}

#[tokio::test]
async fn chat_error_payload_is_an_application_error() {
    let addr = spawn_stub().await;
    let transport = transport_for(addr, "", Duration::from_secs(5));

    let reply = transport.chat("fail please", "web-user").await.unwrap();
    assert_eq!(reply, ChatReply::Error("model overloaded".into()));
}

#[tokio::test]
async fn error_payload_with_server_status_is_still_decoded() {
    let addr = spawn_stub().await;
    let transport = transport_for(addr, "", Duration::from_secs(5));

    let reply = transport.help("web-user").await.unwrap();
    assert_eq!(reply, ChatReply::Error("help unavailable".into()));
}

#[tokio::test]
async fn clear_history_reports_success_flag() {
    let addr = spawn_stub().await;
    let transport = transport_for(addr, "", Duration::from_secs(5));

    assert_eq!(
        transport.clear_history("web-user").await.unwrap(),
        ClearReply::Success(true)
    );
    assert_eq!(
        transport.clear_history("someone-else").await.unwrap(),
        ClearReply::Success(false)
    );
}

#[tokio::test]
async fn test_tools_decodes_results() {
    let addr = spawn_stub().await;
    let transport = transport_for(addr, "", Duration::from_secs(5));

    let ToolTestReply::Results(results) = transport.test_tools("web-user").await.unwrap() else {
        panic!("expected tool results");
    };
    assert_eq!(results["weather"].status, ToolStatus::Success);
    assert_eq!(results["email"].response, "smtp down");
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let addr = spawn_stub().await;
    let transport = transport_for(addr, "", Duration::from_secs(5));

    let err = transport.analyze_conversation("web-user").await.unwrap_err();
    assert!(matches!(err, TransportError::MalformedResponse { .. }));
}

// ═══════════════════════════════════════════════════════════════════════
//  Transport failures
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn slow_server_times_out() {
    let addr = spawn_stub().await;
    let transport = transport_for(addr, "/slow", Duration::from_millis(200));

    let err = transport.chat("hi", "web-user").await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout { .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_connect_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = transport_for(addr, "", Duration::from_secs(5));
    let err = transport.chat("hi", "web-user").await.unwrap_err();
    assert!(matches!(err, TransportError::Connect { .. }));
}

// ═══════════════════════════════════════════════════════════════════════
//  Session over HTTP
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn session_round_trip_over_http() {
    let addr = spawn_stub().await;
    let transport = transport_for(addr, "", Duration::from_secs(5));
    let mut state = SessionState::new();

    let outcome = state
        .send_user_message(&transport, "web-user", "  weather of delhi ")
        .await;
    assert_eq!(outcome, Outcome::Replied);
    assert_eq!(
        state.last_message().unwrap().text(),
        "echo weather of delhi for web-user"
    );

    let outcome = state
        .run_action(&transport, "web-user", Action::AnalyzeConversation)
        .await;
    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(state.last_message().unwrap().kind(), MessageKind::System);
    assert_eq!(state.messages().len(), 3);
}
