// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Clarifying questions written by a language model
//!
//! The model is asked for one question per line. Its answer is cleaned of
//! list markers and topped up with template questions when it comes back
//! short. A provider failure degrades to the template questions.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::clarification::{
    QuestionGenerator, TemplateQuestionGenerator, FALLBACK_QUESTION,
};
use crate::domain::llm::{ChatMessage, ChatProvider};

pub struct LlmQuestionGenerator {
    provider: Arc<dyn ChatProvider>,
}

impl LlmQuestionGenerator {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    fn prompt(minimum: usize) -> String {
        format!(
            "Before acting on the user's request, ask at least {} short clarifying questions. \
             Write one question per line and nothing else.",
            minimum
        )
    }

    /// Split a model reply into questions
    pub fn parse_questions(reply: &str) -> Vec<String> {
        reply
            .lines()
            .map(strip_list_marker)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn pad(mut questions: Vec<String>, query: &str, minimum: usize) -> Vec<String> {
        if questions.len() >= minimum {
            return questions;
        }

        for candidate in TemplateQuestionGenerator::questions(query, minimum) {
            if questions.len() >= minimum {
                break;
            }
            if !questions.contains(&candidate) {
                questions.push(candidate);
            }
        }

        while questions.len() < minimum {
            questions.push(FALLBACK_QUESTION.to_string());
        }

        questions
    }
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or(line);

    // "1." / "2)" numbering
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }

    line.trim()
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(&self, query: &str, minimum: usize) -> Vec<String> {
        let messages = [ChatMessage::system(Self::prompt(minimum)), ChatMessage::user(query)];

        match self.provider.chat(&messages).await {
            Ok(reply) => {
                let questions = Self::parse_questions(&reply);
                debug!("Model proposed {} clarifying questions", questions.len());
                Self::pad(questions, query, minimum)
            }
            Err(e) => {
                warn!(
                    "Question generation via '{}' failed, using templates: {}",
                    self.provider.name(),
                    e
                );
                TemplateQuestionGenerator::questions(query, minimum)
            }
        }
    }
}
