// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// Integration tests for the clarification workflow: memory, hub and
// autonomy manager wired together the way the CLI composes them.

use dexter_core::application::{AutonomyManager, PartnerCollaborator};
use dexter_core::domain::events::{
    ASSISTANT_RESPONSE, CLARIFICATIONS_COMPLETE, CLARIFICATION_ANSWER, CLARIFYING_QUESTION,
    USER_QUERY,
};
use dexter_core::infrastructure::llm::EchoProvider;
use dexter_core::infrastructure::{CollaborationHub, ListenerError};
use dexter_core::domain::events::CollaborationEvent;
use dexter_cortex::{
    InMemoryMessageLog, InMemoryWeightStore, MemoryConfig, MemoryManager, Message, MessageLog,
    Relation, Role, StorageError,
};
use parking_lot::Mutex;
use std::sync::Arc;

async fn fresh_memory() -> Arc<MemoryManager> {
    Arc::new(
        MemoryManager::with_stores(
            &MemoryConfig::default(),
            Arc::new(InMemoryMessageLog::new()),
            Arc::new(InMemoryWeightStore::new()),
        )
        .await,
    )
}

fn record_events(hub: &CollaborationHub) -> Arc<Mutex<Vec<CollaborationEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    hub.subscribe_fn(move |event| {
        sink.lock().push(event.clone());
        Ok(())
    });
    events
}

fn event_types(events: &Mutex<Vec<CollaborationEvent>>) -> Vec<String> {
    events.lock().iter().map(|e| e.event_type.clone()).collect()
}

#[tokio::test]
async fn test_memory_round_trip() {
    let memory = fresh_memory().await;
    memory.add_message(Role::User, "hello").await.unwrap();
    memory.add_message(Role::Assistant, "hi").await.unwrap();

    assert_eq!(
        memory.get_recent_context(50).await.unwrap(),
        vec![Message::user("hello"), Message::assistant("hi")]
    );
}

#[tokio::test]
async fn test_knowledge_round_trip() {
    let memory = fresh_memory().await;
    memory.add_knowledge("Dexter", "is", "agent");

    assert_eq!(memory.query_knowledge("Dexter"), vec![Relation::new("is", "agent")]);
}

#[tokio::test]
async fn test_ask_clarifications_emits_query_then_each_question() {
    let hub = Arc::new(CollaborationHub::new());
    let events = record_events(&hub);
    let autonomy = AutonomyManager::new(fresh_memory().await, hub);

    let questions = autonomy.ask_clarifications("build a web app").await.unwrap();

    assert_eq!(questions.len(), 3);
    assert_eq!(
        event_types(&events),
        vec![USER_QUERY, CLARIFYING_QUESTION, CLARIFYING_QUESTION, CLARIFYING_QUESTION]
    );

    let recorded = events.lock();
    assert_eq!(recorded[0].str_field("query"), Some("build a web app"));
    for (i, question) in questions.iter().enumerate() {
        let event = &recorded[i + 1];
        assert_eq!(event.str_field("question"), Some(question.as_str()));
        assert_eq!(event.payload["index"], i);
    }
}

#[tokio::test]
async fn test_query_is_recorded_before_it_is_announced() {
    let hub = Arc::new(CollaborationHub::new());
    let memory = fresh_memory().await;
    let seen = Arc::new(Mutex::new(Vec::new()));

    let observer_memory = memory.clone();
    let sink = seen.clone();
    hub.subscribe_async(move |event| {
        let memory = observer_memory.clone();
        let sink = sink.clone();
        async move {
            if event.is(USER_QUERY) {
                let context = memory
                    .get_recent_context(10)
                    .await
                    .map_err(|e| ListenerError::new(e.to_string()))?;
                sink.lock().extend(context);
            }
            Ok::<(), ListenerError>(())
        }
    });

    AutonomyManager::new(memory, hub)
        .ask_clarifications("plan a trip")
        .await
        .unwrap();

    assert_eq!(*seen.lock(), vec![Message::user("plan a trip")]);
}

#[tokio::test]
async fn test_clarification_count_follows_minimum() {
    for minimum in [1, 3, 6] {
        let hub = Arc::new(CollaborationHub::new());
        let events = record_events(&hub);
        let autonomy =
            AutonomyManager::new(fresh_memory().await, hub).with_minimum_questions(minimum);

        let questions = autonomy.ask_clarifications("write a poem").await.unwrap();
        assert!(questions.len() >= minimum);

        let types = event_types(&events);
        assert_eq!(types.iter().filter(|t| *t == USER_QUERY).count(), 1);
        assert_eq!(
            types.iter().filter(|t| *t == CLARIFYING_QUESTION).count(),
            questions.len()
        );
    }
}

#[tokio::test]
async fn test_answers_are_recorded_and_round_completes() {
    let hub = Arc::new(CollaborationHub::new());
    let events = record_events(&hub);
    let memory = fresh_memory().await;
    let autonomy = AutonomyManager::new(memory.clone(), hub);

    let answers: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let count = autonomy.record_clarification_answers(&answers).await.unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        event_types(&events),
        vec![
            CLARIFICATION_ANSWER,
            CLARIFICATION_ANSWER,
            CLARIFICATION_ANSWER,
            CLARIFICATIONS_COMPLETE
        ]
    );
    assert_eq!(events.lock()[3].payload["count"], 3);
    assert_eq!(
        memory.get_recent_context(10).await.unwrap(),
        vec![Message::user("a"), Message::user("b"), Message::user("c")]
    );
}

#[tokio::test]
async fn test_failing_listener_does_not_break_workflow() {
    let hub = Arc::new(CollaborationHub::new());
    let first = record_events(&hub);
    hub.subscribe_fn(|_| Err(ListenerError::new("listener offline")));
    let third = record_events(&hub);

    let autonomy = AutonomyManager::new(fresh_memory().await, hub);
    autonomy.ask_clarifications("build a web app").await.unwrap();

    assert_eq!(first.lock().len(), 4);
    assert_eq!(third.lock().len(), 4);
}

#[tokio::test]
async fn test_process_request_echoes_and_announces() {
    let hub = Arc::new(CollaborationHub::new());
    let events = record_events(&hub);
    let autonomy = AutonomyManager::new(fresh_memory().await, hub)
        .with_responder(Arc::new(EchoProvider::new()));

    let response = autonomy.process_request("Build a web app").await.unwrap();

    assert_eq!(response, "Build a web app");
    assert_eq!(event_types(&events), vec![ASSISTANT_RESPONSE]);
    let recorded = events.lock();
    assert_eq!(recorded[0].str_field("response"), Some("Build a web app"));
}

#[tokio::test]
async fn test_partner_reviews_assistant_responses() {
    let hub = Arc::new(CollaborationHub::new());
    let partner = Arc::new(PartnerCollaborator::new(Arc::new(EchoProvider::new())));
    hub.subscribe(partner.clone());

    let autonomy = AutonomyManager::new(fresh_memory().await, hub);
    autonomy.process_request("Summarize the news").await.unwrap();
    partner.wait_for_pending().await;

    let proposals = partner.recent_proposals(3);
    assert_eq!(proposals.len(), 1);
    assert!(proposals[0].proposal.contains("Summarize the news"));
}

struct UnreachableLog;

#[async_trait::async_trait]
impl MessageLog for UnreachableLog {
    async fn add(&self, _role: Role, _content: &str) -> Result<(), StorageError> {
        Err(StorageError::Database("unable to open database file".to_string()))
    }

    async fn get_recent(&self, _limit: usize) -> Result<Vec<Message>, StorageError> {
        Err(StorageError::Database("unable to open database file".to_string()))
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(0)
    }
}

#[tokio::test]
async fn test_storage_failure_surfaces_without_broadcast() {
    let memory = Arc::new(
        MemoryManager::with_stores(
            &MemoryConfig::default(),
            Arc::new(UnreachableLog),
            Arc::new(InMemoryWeightStore::new()),
        )
        .await,
    );
    let hub = Arc::new(CollaborationHub::new());
    let events = record_events(&hub);

    let autonomy = AutonomyManager::new(memory, hub);
    let err = autonomy.ask_clarifications("anything").await.unwrap_err();

    assert!(matches!(err, dexter_core::application::AutonomyError::Storage(_)));
    assert!(events.lock().is_empty());
}
