// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// Ollama Chat Provider Adapter
//
// Anti-Corruption Layer for Ollama's /api/chat endpoint.
// Supports air-gapped deployments with local LLMs.

use crate::domain::llm::{ChatMessage, ChatProvider, LLMError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OllamaChatProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

impl OllamaChatProvider {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LLMError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LLMError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: 0.7,
            api_key: None,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ChatProvider for OllamaChatProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LLMError> {
        if messages.is_empty() {
            return Err(LLMError::InvalidInput("no messages to send".to_string()));
        }

        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let mut builder = self.client.post(self.url("/api/chat")).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                404 => LLMError::ModelNotFound(self.model.clone()),
                401 | 403 => LLMError::Authentication(error_text),
                429 => LLMError::RateLimit,
                _ => LLMError::Provider(format!("HTTP {}: {}", status, error_text)),
            });
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::Provider(format!("Failed to parse response: {}", e)))?;

        Ok(chat_response.message.content)
    }

    async fn health_check(&self) -> Result<(), LLMError> {
        // Listing models is the cheapest call that proves the server is up
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LLMError::Network(format!("HTTP {}", response.status())))
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chat_returns_message_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "llama3.1:8b",
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": {"role": "assistant", "content": "hi there"}, "done": true}"#)
            .create_async()
            .await;

        let provider = OllamaChatProvider::new(server.url(), "llama3.1:8b").unwrap();
        let reply = provider.chat(&[ChatMessage::user("hello")]).await.unwrap();

        assert_eq!(reply, "hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_model_maps_to_model_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_body("model not found")
            .create_async()
            .await;

        let provider = OllamaChatProvider::new(server.url(), "ghost").unwrap();
        let err = provider.chat(&[ChatMessage::user("hello")]).await.unwrap_err();
        assert!(matches!(err, LLMError::ModelNotFound(model) if model == "ghost"));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(500)
            .create_async()
            .await;

        let provider = OllamaChatProvider::new(server.url(), "llama3.1:8b").unwrap();
        let err = provider.chat(&[ChatMessage::user("hello")]).await.unwrap_err();
        assert!(matches!(err, LLMError::Provider(_)));
    }

    #[tokio::test]
    async fn test_health_check_lists_tags() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models": []}"#)
            .create_async()
            .await;

        let provider = OllamaChatProvider::new(format!("{}/", server.url()), "m").unwrap();
        provider.health_check().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_conversation_is_rejected() {
        let provider = OllamaChatProvider::new("http://localhost:1", "m").unwrap();
        let err = provider.chat(&[]).await.unwrap_err();
        assert!(matches!(err, LLMError::InvalidInput(_)));
    }
}
