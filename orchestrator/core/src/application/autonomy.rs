// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # AutonomyManager - Clarification Workflow
//!
//! Drives one query through its lifecycle:
//!
//! ```text
//! received → clarifying → awaiting_answers → complete
//! ```
//!
//! There is no state field. Callers sequence [`AutonomyManager::ask_clarifications`],
//! [`AutonomyManager::record_clarification_answers`] and
//! [`AutonomyManager::process_request`] themselves.
//!
//! Every step records into memory before broadcasting, so listeners that
//! read memory in response to an event observe the recorded message.
//!
//! When a Partner is attached, queries starting with `@partner` skip Dexter
//! and go to the Partner instead; the reply comes back as `[Partner]: ...`.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use dexter_cortex::{MemoryManager, Role, StorageError, CONTEXT_LIMIT_DEFAULT};

use crate::domain::clarification::{QuestionGenerator, TemplateQuestionGenerator};
use crate::domain::events::{
    ASSISTANT_RESPONSE, CLARIFICATIONS_COMPLETE, CLARIFICATION_ANSWER, CLARIFYING_QUESTION,
    PARTNER_RESPONSE, USER_QUERY,
};
use crate::domain::llm::{ChatMessage, ChatProvider, ChatRole, LLMError};
use crate::application::partner::{partner_address, PartnerCollaborator, PARTNER_PREFIX};
use crate::infrastructure::collaboration_hub::CollaborationHub;
use crate::infrastructure::llm::EchoProvider;

pub const MINIMUM_QUESTIONS_DEFAULT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum AutonomyError {
    #[error("Memory storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Language model failed: {0}")]
    Llm(#[from] LLMError),
}

pub struct AutonomyManager {
    memory: Arc<MemoryManager>,
    hub: Arc<CollaborationHub>,
    question_generator: Arc<dyn QuestionGenerator>,
    responder: Arc<dyn ChatProvider>,
    minimum_questions: usize,
    identity: Option<String>,
    context_limit: usize,
    partner: Option<Arc<PartnerCollaborator>>,
}

impl AutonomyManager {
    /// Template questions, echo responses, three questions per round
    pub fn new(memory: Arc<MemoryManager>, hub: Arc<CollaborationHub>) -> Self {
        Self {
            memory,
            hub,
            question_generator: Arc::new(TemplateQuestionGenerator::new()),
            responder: Arc::new(EchoProvider::new()),
            minimum_questions: MINIMUM_QUESTIONS_DEFAULT,
            identity: None,
            context_limit: CONTEXT_LIMIT_DEFAULT,
            partner: None,
        }
    }

    pub fn with_question_generator(mut self, generator: Arc<dyn QuestionGenerator>) -> Self {
        self.question_generator = generator;
        self
    }

    pub fn with_responder(mut self, responder: Arc<dyn ChatProvider>) -> Self {
        self.responder = responder;
        self
    }

    pub fn with_minimum_questions(mut self, minimum: usize) -> Self {
        self.minimum_questions = minimum;
        self
    }

    /// System prompt prepended to every response request. Blank means none.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        let identity = identity.into();
        self.identity = (!identity.trim().is_empty()).then_some(identity);
        self
    }

    pub fn with_context_limit(mut self, limit: usize) -> Self {
        self.context_limit = limit;
        self
    }

    /// Route `@partner` queries to this collaborator
    pub fn with_partner(mut self, partner: Arc<PartnerCollaborator>) -> Self {
        self.partner = Some(partner);
        self
    }

    /// True when `query` will be answered by the Partner rather than Dexter
    pub fn addresses_partner(&self, query: &str) -> bool {
        self.partner.is_some() && partner_address(query).is_some()
    }

    pub fn memory(&self) -> &Arc<MemoryManager> {
        &self.memory
    }

    pub fn hub(&self) -> &Arc<CollaborationHub> {
        &self.hub
    }

    pub fn minimum_questions(&self) -> usize {
        self.minimum_questions
    }

    /// Record the query, announce it, then generate and announce clarifying
    /// questions one event per question.
    pub async fn ask_clarifications(&self, query: &str) -> Result<Vec<String>, AutonomyError> {
        self.memory.add_message(Role::User, query).await?;
        self.hub.broadcast(USER_QUERY, json!({ "query": query })).await;

        let questions = self
            .question_generator
            .generate(query, self.minimum_questions)
            .await;
        debug!("Generated {} clarifying questions", questions.len());

        for (index, question) in questions.iter().enumerate() {
            self.hub
                .broadcast(
                    CLARIFYING_QUESTION,
                    json!({ "question": question, "index": index }),
                )
                .await;
        }

        Ok(questions)
    }

    /// Record the user's answers in order and signal the end of the round.
    /// Returns the number of answers recorded.
    pub async fn record_clarification_answers(
        &self,
        answers: &[String],
    ) -> Result<usize, AutonomyError> {
        for (index, answer) in answers.iter().enumerate() {
            self.memory.add_message(Role::User, answer).await?;
            self.hub
                .broadcast(
                    CLARIFICATION_ANSWER,
                    json!({ "answer": answer, "index": index }),
                )
                .await;
        }

        self.hub
            .broadcast(CLARIFICATIONS_COMPLETE, json!({ "count": answers.len() }))
            .await;
        Ok(answers.len())
    }

    /// Record the query, ask the responder with recent context, record and
    /// announce the reply.
    pub async fn process_request(&self, query: &str) -> Result<String, AutonomyError> {
        if let (Some(partner), Some(message)) = (&self.partner, partner_address(query)) {
            return self.address_partner(partner, message).await;
        }

        self.memory.add_message(Role::User, query).await?;

        let context = self.memory.get_recent_context(self.context_limit).await?;
        let messages = self.build_messages(&context, query);

        let response = self.responder.chat(&messages).await?;
        info!(
            "Response from '{}' provider ({} chars)",
            self.responder.name(),
            response.len()
        );

        self.memory.add_message(Role::Assistant, &response).await?;
        self.hub
            .broadcast(
                ASSISTANT_RESPONSE,
                json!({ "query": query, "response": response }),
            )
            .await;

        Ok(response)
    }

    async fn address_partner(
        &self,
        partner: &PartnerCollaborator,
        message: &str,
    ) -> Result<String, AutonomyError> {
        let context = self.memory.get_recent_context(self.context_limit).await?;
        self.memory
            .add_message(Role::User, &format!("{} {}", PARTNER_PREFIX, message))
            .await?;

        let reply = partner.respond(message, &context).await?;
        info!("Partner answered a direct request ({} chars)", reply.len());

        self.memory.add_message(Role::Assistant, &reply).await?;
        self.hub
            .broadcast(
                PARTNER_RESPONSE,
                json!({ "query": message, "response": reply }),
            )
            .await;

        Ok(format!("[Partner]: {}", reply))
    }

    fn build_messages(&self, context: &[dexter_cortex::Message], query: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(context.len() + 2);
        if let Some(identity) = &self.identity {
            messages.push(ChatMessage::system(identity.clone()));
        }
        messages.extend(context.iter().map(ChatMessage::from));

        // The query must be the final turn even when context came from an
        // older long-term window
        let ends_with_query = messages
            .last()
            .map(|m| m.role == ChatRole::User && m.content == query)
            .unwrap_or(false);
        if !ends_with_query {
            messages.push(ChatMessage::user(query));
        }

        messages
    }
}
