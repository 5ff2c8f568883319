// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Partner: background reviewer of Dexter's answers
//!
//! Listens for `assistant_response` events and asks its own chat provider
//! for one improvement or next step. Analysis runs on a spawned task so the
//! broadcast is never held up; only the newest few proposals are kept.
//!
//! The Partner also answers directly when a user message starts with
//! [`PARTNER_PREFIX`], speaking with its own identity over Dexter's context.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::events::{CollaborationEvent, ASSISTANT_RESPONSE};
use crate::domain::llm::{ChatMessage, ChatProvider, LLMError};
use dexter_cortex::{Message, Role};
use crate::infrastructure::collaboration_hub::{CollaborationListener, ListenerError};

pub const PROPOSAL_CAPACITY_DEFAULT: usize = 3;

/// Messages starting with this address the Partner instead of Dexter
pub const PARTNER_PREFIX: &str = "@partner";

const ANALYSIS_PROMPT: &str =
    "Analyze this conversation and suggest one brief improvement or next step.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proposal {
    pub proposal: String,
    pub created_at: DateTime<Utc>,
}

struct PartnerInner {
    provider: Arc<dyn ChatProvider>,
    proposals: Mutex<VecDeque<Proposal>>,
    capacity: usize,
}

impl PartnerInner {
    async fn analyze(&self, query: &str, response: &str) -> Result<Proposal, LLMError> {
        let messages = [
            ChatMessage::system(ANALYSIS_PROMPT),
            ChatMessage::user(format!("User: {}\nDexter: {}", query, response)),
        ];
        let suggestion = self.provider.chat(&messages).await?;

        let proposal = Proposal {
            proposal: suggestion.trim().to_string(),
            created_at: Utc::now(),
        };

        let mut proposals = self.proposals.lock();
        proposals.push_back(proposal.clone());
        while proposals.len() > self.capacity {
            proposals.pop_front();
        }

        Ok(proposal)
    }
}

/// The text after [`PARTNER_PREFIX`], trimmed, or `None` when the message
/// is meant for Dexter.
pub fn partner_address(message: &str) -> Option<&str> {
    message.strip_prefix(PARTNER_PREFIX).map(str::trim)
}

pub struct PartnerCollaborator {
    inner: Arc<PartnerInner>,
    pending: Mutex<Vec<JoinHandle<()>>>,
    identity: Option<String>,
}

impl PartnerCollaborator {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self::with_capacity(provider, PROPOSAL_CAPACITY_DEFAULT)
    }

    pub fn with_capacity(provider: Arc<dyn ChatProvider>, capacity: usize) -> Self {
        Self {
            inner: Arc::new(PartnerInner {
                provider,
                proposals: Mutex::new(VecDeque::with_capacity(capacity)),
                capacity,
            }),
            pending: Mutex::new(Vec::new()),
            identity: None,
        }
    }

    /// System prompt used when addressed directly. Blank means none.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        let identity = identity.into();
        self.identity = (!identity.trim().is_empty()).then_some(identity);
        self
    }

    /// Answer a message addressed to the Partner, with recent conversation
    /// rendered into the system prompt.
    pub async fn respond(&self, message: &str, context: &[Message]) -> Result<String, LLMError> {
        let messages = self.direct_messages(message, context);
        let reply = self.inner.provider.chat(&messages).await?;
        debug!(
            "Partner answered directly via '{}' ({} chars)",
            self.inner.provider.name(),
            reply.len()
        );
        Ok(reply)
    }

    fn direct_messages(&self, message: &str, context: &[Message]) -> Vec<ChatMessage> {
        let rendered = context
            .iter()
            .map(|m| match m.role {
                Role::User => format!("User: {}", m.content),
                Role::Assistant => format!("Dexter: {}", m.content),
            })
            .collect::<Vec<_>>()
            .join("\n");

        let system = match &self.identity {
            Some(identity) => format!("{}\n\nContext: {}", identity, rendered),
            None => format!("Context: {}", rendered),
        };
        vec![ChatMessage::system(system), ChatMessage::user(message)]
    }

    /// Run one analysis inline
    pub async fn analyze(&self, query: &str, response: &str) -> Result<Proposal, LLMError> {
        self.inner.analyze(query, response).await
    }

    /// Up to `limit` proposals, newest last
    pub fn recent_proposals(&self, limit: usize) -> Vec<Proposal> {
        let proposals = self.inner.proposals.lock();
        let skip = proposals.len().saturating_sub(limit);
        proposals.iter().skip(skip).cloned().collect()
    }

    /// Wait for every analysis spawned so far
    pub async fn wait_for_pending(&self) {
        let handles = std::mem::take(&mut *self.pending.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Partner analysis task ended abnormally: {}", e);
            }
        }
    }
}

#[async_trait]
impl CollaborationListener for PartnerCollaborator {
    async fn notify(&self, event: &CollaborationEvent) -> Result<(), ListenerError> {
        if !event.is(ASSISTANT_RESPONSE) {
            return Ok(());
        }

        let query = event.str_field("query").unwrap_or_default().to_string();
        let response = event.str_field("response").unwrap_or_default().to_string();
        let inner = self.inner.clone();

        let handle = tokio::spawn(async move {
            match inner.analyze(&query, &response).await {
                Ok(proposal) => debug!("Partner proposal recorded: {}", proposal.proposal),
                Err(e) => warn!("Partner analysis failed: {}", e),
            }
        });

        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
        Ok(())
    }

    fn name(&self) -> &str {
        "partner"
    }
}
