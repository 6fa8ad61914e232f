//! Integration tests for the channel endpoint behind the full router.
//!
//! These go through `app_router`, so request tracing and the request
//! timeout are in the stack exactly as the server runs them.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use dialog_engine::adapters::http::app_router;
use dialog_engine::adapters::{
    InMemoryAuthProvider, InMemorySessionStore, ScriptedClassifier, ScriptedSkillHandler,
    StaticContentSource,
};
use dialog_engine::application::{
    build_registry, DialogServices, DialogSettings, Dispatcher, DispatcherSettings, RetryPolicy,
};
use dialog_engine::domain::dialog::{DialogStackManager, DEFAULT_MAX_STEPS_PER_TURN};
use dialog_engine::domain::interruption::{InterruptionPolicy, SkillCatalog};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn app(store: InMemorySessionStore) -> Router {
    let services = DialogServices {
        auth: Arc::new(InMemoryAuthProvider::accepting_any_code()),
        content: Arc::new(StaticContentSource::new()),
        skills: Arc::new(ScriptedSkillHandler::new()),
        skill_catalog: SkillCatalog::default(),
        skill_retry: RetryPolicy::new(1, Duration::from_secs(1)),
    };
    let registry = build_registry(&services, &DialogSettings::default());
    let dispatcher = Dispatcher::new(
        Arc::new(store),
        Arc::new(ScriptedClassifier::new()),
        services.auth.clone(),
        DialogStackManager::new(Arc::new(registry), DEFAULT_MAX_STEPS_PER_TURN),
        InterruptionPolicy::default(),
        SkillCatalog::default(),
        DispatcherSettings::default(),
    );
    app_router(Arc::new(dispatcher), Duration::from_secs(5))
}

fn message(id: &str, text: &str) -> Request<Body> {
    let body = json!({
        "type": "message",
        "id": id,
        "text": text,
        "conversationId": "conv-http",
        "fromId": "user-http",
        "locale": "en-us"
    });
    Request::builder()
        .method("POST")
        .uri("/api/messages")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn consecutive_posts_continue_the_same_conversation() {
    let store = InMemorySessionStore::new();
    let router = app(store.clone());

    let first = router.clone().oneshot(message("a-1", "hi")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = json_body(first).await;
    assert_eq!(
        first["activities"][0]["text"],
        "Please sign in, then type the six-digit code you were given."
    );
    assert_eq!(first["activities"][0]["replyToId"], "a-1");
    assert_eq!(first["activities"][0]["inputHint"], "expectingInput");

    let second = router.oneshot(message("a-2", "123456")).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second = json_body(second).await;
    let texts: Vec<&str> = second["activities"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["text"].as_str())
        .collect();
    assert_eq!(
        texts,
        vec!["You are now logged in.", "Do you accept our privacy policy?"]
    );
    assert_eq!(store.write_count(), 2);
}

#[tokio::test]
async fn malformed_json_is_rejected_before_any_turn() {
    let store = InMemorySessionStore::new();
    let response = app(store.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/messages")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn health_counts_no_conversations_when_idle() {
    let response = app(InMemorySessionStore::new())
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["activeConversations"], 0);
}
