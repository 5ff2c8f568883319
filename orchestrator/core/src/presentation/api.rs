// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// HTTP API - Axum routes over the clarification workflow
//
// Storage failures answer 503 with a warning that context may not have been
// saved; language-model failures answer 502. The process never goes down
// because a store is unreachable.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use dexter_cortex::{Relation, StorageError};

use crate::application::{AutonomyError, AutonomyManager, PartnerCollaborator, Proposal};
use crate::infrastructure::{ConversationEntry, ConversationStore, EventStreamListener};

pub const DEXTER_SENDER: &str = "dexter";
pub const USER_SENDER: &str = "user";
pub const PARTNER_SENDER: &str = "partner";

pub struct AppState {
    pub autonomy: Arc<AutonomyManager>,
    pub conversations: Option<Arc<ConversationStore>>,
    pub partner: Option<Arc<PartnerCollaborator>>,
    pub events: EventStreamListener,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/query", post(query))
        .route("/clarifications", post(clarifications))
        .route("/knowledge", post(add_knowledge))
        .route("/knowledge/{entity}", get(query_knowledge))
        .route("/conversations/{session_id}", get(conversation))
        .route("/proposals", get(proposals))
        .route("/events", get(stream_events))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

#[derive(Debug)]
pub enum ApiError {
    Storage(String),
    Llm(String),
    BadRequest(String),
    NotFound(String),
}

impl From<AutonomyError> for ApiError {
    fn from(e: AutonomyError) -> Self {
        match e {
            AutonomyError::Storage(e) => ApiError::Storage(e.to_string()),
            AutonomyError::Llm(e) => ApiError::Llm(e.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Storage(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Storage(e) => {
                warn!("Storage failure while serving request: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({
                        "error": e,
                        "warning": "context may not have been saved",
                    }),
                )
            }
            ApiError::Llm(e) => {
                warn!("Language model failure while serving request: {}", e);
                (StatusCode::BAD_GATEWAY, json!({ "error": e }))
            }
            ApiError::BadRequest(e) => (StatusCode::BAD_REQUEST, json!({ "error": e })),
            ApiError::NotFound(e) => (StatusCode::NOT_FOUND, json!({ "error": e })),
        };
        (status, Json(body)).into_response()
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Dexter backend is up" }))
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    pub clarifications: Vec<String>,
    pub session_id: String,
}

async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query cannot be empty".to_string()));
    }

    let session_id = request
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!("Query received for session {}", session_id);

    log_transcript(&state, &session_id, USER_SENDER, query).await;

    // The Partner answers directly, without a clarification round
    let (clarifications, sender) = if state.autonomy.addresses_partner(query) {
        (Vec::new(), PARTNER_SENDER)
    } else {
        (state.autonomy.ask_clarifications(query).await?, DEXTER_SENDER)
    };
    let response = state.autonomy.process_request(query).await?;

    log_transcript(&state, &session_id, sender, &response).await;

    Ok(Json(QueryResponse {
        response,
        clarifications,
        session_id,
    }))
}

/// Transcripts are best effort; memory already holds the authoritative copy
async fn log_transcript(state: &AppState, session_id: &str, sender: &str, message: &str) {
    if let Some(store) = &state.conversations {
        if let Err(e) = store.add_message(session_id, sender, message).await {
            warn!("Failed to log conversation for session {}: {}", session_id, e);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClarificationsRequest {
    pub answers: Vec<String>,
}

async fn clarifications(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClarificationsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = state
        .autonomy
        .record_clarification_answers(&request.answers)
        .await?;
    Ok(Json(json!({ "count": count })))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeRequest {
    pub source: String,
    pub relation: String,
    pub target: String,
}

async fn add_knowledge(
    State(state): State<Arc<AppState>>,
    Json(request): Json<KnowledgeRequest>,
) -> Result<(StatusCode, Json<KnowledgeRequest>), ApiError> {
    if request.source.is_empty() || request.relation.is_empty() || request.target.is_empty() {
        return Err(ApiError::BadRequest(
            "source, relation and target are required".to_string(),
        ));
    }

    state
        .autonomy
        .memory()
        .add_knowledge(&request.source, &request.relation, &request.target);
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeResponse {
    pub entity: String,
    pub relations: Vec<Relation>,
}

async fn query_knowledge(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
) -> Json<KnowledgeResponse> {
    let relations = state.autonomy.memory().query_knowledge(&entity);
    Json(KnowledgeResponse { entity, relations })
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub session_id: String,
    pub messages: Vec<ConversationEntry>,
}

async fn conversation(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let store = state
        .conversations
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("conversation logging is disabled".to_string()))?;

    let messages = store.get_messages(&session_id).await?;
    Ok(Json(ConversationResponse {
        session_id,
        messages,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProposalsResponse {
    pub proposals: Vec<Proposal>,
}

async fn proposals(State(state): State<Arc<AppState>>) -> Json<ProposalsResponse> {
    let proposals = state
        .partner
        .as_ref()
        .map(|partner| partner.recent_proposals(crate::application::PROPOSAL_CAPACITY_DEFAULT))
        .unwrap_or_default();
    Json(ProposalsResponse { proposals })
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();
    debug!(
        "Event stream client connected ({} subscribers)",
        state.events.subscriber_count()
    );

    let stream = receiver
        .into_stream()
        .filter_map(|item| match item {
            Ok(event) => Event::default()
                .event(event.event_type.clone())
                .json_data(&event)
                .ok()
                .map(Ok),
            // Lagged subscribers skip what they missed
            Err(_) => None,
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
