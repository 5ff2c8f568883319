// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// HTTP API tests driven through tower::ServiceExt::oneshot

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use dexter_core::application::{AutonomyManager, PartnerCollaborator};
use dexter_core::infrastructure::llm::EchoProvider;
use dexter_core::infrastructure::{CollaborationHub, ConversationStore, EventStreamListener};
use dexter_core::presentation::api::{app, AppState};
use dexter_cortex::{
    InMemoryMessageLog, InMemoryWeightStore, MemoryConfig, MemoryManager, Message, MessageLog,
    Role, StorageError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    partner: Arc<PartnerCollaborator>,
    _dir: TempDir,
}

async fn test_app_with_log(log: Arc<dyn MessageLog>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let memory = Arc::new(
        MemoryManager::with_stores(
            &MemoryConfig::default(),
            log,
            Arc::new(InMemoryWeightStore::new()),
        )
        .await,
    );

    let hub = Arc::new(CollaborationHub::new());
    let events = EventStreamListener::new(64);
    hub.subscribe(Arc::new(events.clone()));
    let partner = Arc::new(
        PartnerCollaborator::new(Arc::new(EchoProvider::new())).with_identity("You are Partner."),
    );
    hub.subscribe(partner.clone());

    let conversations = ConversationStore::open(dir.path().join("conversations.db"))
        .await
        .unwrap();

    let router = app(AppState {
        autonomy: Arc::new(AutonomyManager::new(memory, hub).with_partner(partner.clone())),
        conversations: Some(Arc::new(conversations)),
        partner: Some(partner.clone()),
        events,
    });

    TestApp {
        router,
        partner,
        _dir: dir,
    }
}

async fn test_app() -> TestApp {
    test_app_with_log(Arc::new(InMemoryMessageLog::new())).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_reports_up() {
    let app = test_app().await;
    let (status, body) = send(&app.router, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Dexter backend is up"}));
}

#[tokio::test]
async fn test_query_returns_response_and_clarifications() {
    let app = test_app().await;
    let (status, body) = send(
        &app.router,
        post_json("/query", json!({"query": "Build a web app", "session_id": "s-1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Build a web app");
    assert_eq!(body["clarifications"].as_array().unwrap().len(), 3);
    assert_eq!(body["session_id"], "s-1");

    let (status, transcript) = send(&app.router, get("/conversations/s-1")).await;
    assert_eq!(status, StatusCode::OK);
    let messages = transcript["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["sender"], "user");
    assert_eq!(messages[1]["sender"], "dexter");
}

#[tokio::test]
async fn test_partner_address_skips_clarifications() {
    let app = test_app().await;
    let (status, body) = send(
        &app.router,
        post_json(
            "/query",
            json!({"query": "@partner sketch the data model", "session_id": "s-2"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "[Partner]: sketch the data model");
    assert_eq!(body["clarifications"], json!([]));

    let (_, transcript) = send(&app.router, get("/conversations/s-2")).await;
    let messages = transcript["messages"].as_array().unwrap();
    assert_eq!(messages[0]["sender"], "user");
    assert_eq!(messages[1]["sender"], "partner");

    app.partner.wait_for_pending().await;
    let (_, proposals) = send(&app.router, get("/proposals")).await;
    assert_eq!(proposals["proposals"], json!([]));
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let app = test_app().await;
    let (status, _) = send(&app.router, post_json("/query", json!({"query": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clarification_answers_are_counted() {
    let app = test_app().await;
    let (status, body) = send(
        &app.router,
        post_json("/clarifications", json!({"answers": ["a", "b", "c"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"count": 3}));
}

#[tokio::test]
async fn test_knowledge_add_and_query() {
    let app = test_app().await;
    let (status, _) = send(
        &app.router,
        post_json(
            "/knowledge",
            json!({"source": "Dexter", "relation": "is", "target": "agent"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app.router, get("/knowledge/Dexter")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"entity": "Dexter", "relations": [{"relation": "is", "target": "agent"}]})
    );

    let (_, body) = send(&app.router, get("/knowledge/unknown")).await;
    assert_eq!(body["relations"], json!([]));
}

#[tokio::test]
async fn test_proposals_follow_queries() {
    let app = test_app().await;
    send(&app.router, post_json("/query", json!({"query": "Plan a trip"}))).await;
    app.partner.wait_for_pending().await;

    let (status, body) = send(&app.router, get("/proposals")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["proposals"].as_array().unwrap().len(), 1);
}

struct ReadOnlyDisk;

#[async_trait::async_trait]
impl MessageLog for ReadOnlyDisk {
    async fn add(&self, _role: Role, _content: &str) -> Result<(), StorageError> {
        Err(StorageError::Database("attempt to write a readonly database".to_string()))
    }

    async fn get_recent(&self, _limit: usize) -> Result<Vec<Message>, StorageError> {
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(0)
    }
}

#[tokio::test]
async fn test_storage_failure_degrades_to_503() {
    let app = test_app_with_log(Arc::new(ReadOnlyDisk)).await;
    let (status, body) = send(&app.router, post_json("/query", json!({"query": "hello"}))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["warning"], "context may not have been saved");

    // Still serving
    let (status, _) = send(&app.router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
}
