// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// Echo Chat Provider
//
// Offline provider that answers with the latest user message.
// Default for Dexter so the workflow runs without a model server.

use crate::domain::llm::{ChatMessage, ChatProvider, ChatRole, LLMError};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoProvider;

impl EchoProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatProvider for EchoProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LLMError> {
        messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.clone())
            .ok_or_else(|| LLMError::InvalidInput("no user message to echo".to_string()))
    }

    async fn health_check(&self) -> Result<(), LLMError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "echo"
    }
}
