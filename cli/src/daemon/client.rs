// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for a running Dexter server

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;

use dexter_core::presentation::api::QueryResponse;

use super::base_url;

#[derive(Debug, Clone)]
pub struct DexterClient {
    client: Client,
    base_url: String,
}

impl DexterClient {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        Self::with_base_url(base_url(host, port))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        // No global timeout: a query waits on the language model
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn query(&self, query: &str, session_id: &str) -> Result<QueryResponse> {
        #[derive(Serialize)]
        struct QueryRequest<'a> {
            query: &'a str,
            session_id: &'a str,
        }

        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&QueryRequest { query, session_id })
            .send()
            .await
            .context("Failed to send query")?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let error = body["error"].as_str().unwrap_or("unknown error");
            match body["warning"].as_str() {
                Some(warning) => anyhow::bail!("Query failed ({}): {} ({})", status, error, warning),
                None => anyhow::bail!("Query failed ({}): {}", status, error),
            }
        }

        response
            .json()
            .await
            .context("Failed to parse query response")
    }

    pub async fn answer_clarifications(&self, answers: &[String]) -> Result<usize> {
        let response = self
            .client
            .post(format!("{}/clarifications", self.base_url))
            .json(&serde_json::json!({ "answers": answers }))
            .send()
            .await
            .context("Failed to send clarification answers")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to record answers: {}", error_text);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse clarification response")?;
        Ok(body["count"].as_u64().unwrap_or(0) as usize)
    }
}
