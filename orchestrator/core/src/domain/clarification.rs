// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Clarification
//!
//! Strategy interface for producing clarifying questions, plus the default
//! keyword-templated generator.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Question generation for the clarification round

use async_trait::async_trait;

/// Asked when the templates run out
pub const FALLBACK_QUESTION: &str = "Could you please provide more details about your request?";

/// Topic used when the query has no usable keyword
pub const DEFAULT_TOPIC: &str = "this request";

const TEMPLATES: [&str; 4] = [
    "What is your primary goal regarding {topic}?",
    "Are there any specific requirements or constraints for {topic}?",
    "Who is the intended audience for {topic}?",
    "Do you have a preferred format or level of detail for {topic}?",
];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "of", "to", "in", "on", "for", "with", "at", "by",
    "from", "about", "into", "is", "are", "was", "be", "it", "this", "that", "these", "those",
    "i", "me", "my", "we", "our", "you", "your", "please", "can", "could", "would", "will",
    "should", "do", "does", "help", "want", "need", "like", "some", "us", "build", "make",
    "create", "write", "give", "show", "tell", "get", "how", "what", "why", "when", "where",
];

/// Produces clarifying questions for a query.
///
/// Implementations must return at least `minimum` questions.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, query: &str, minimum: usize) -> Vec<String>;
}

/// Deterministic generator: one keyword, fixed templates, generic padding.
/// Always returns exactly `minimum` questions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateQuestionGenerator;

impl TemplateQuestionGenerator {
    pub fn new() -> Self {
        Self
    }

    /// First non-stopword token, lowercased with surrounding punctuation
    /// trimmed
    pub fn extract_topic(query: &str) -> String {
        query
            .split_whitespace()
            .map(|token| {
                token
                    .trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .find(|token| !token.is_empty() && !STOPWORDS.contains(&token.as_str()))
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string())
    }

    pub fn questions(query: &str, minimum: usize) -> Vec<String> {
        let topic = Self::extract_topic(query);

        let mut questions: Vec<String> = TEMPLATES
            .iter()
            .take(minimum)
            .map(|template| template.replace("{topic}", &topic))
            .collect();

        while questions.len() < minimum {
            questions.push(FALLBACK_QUESTION.to_string());
        }

        questions
    }
}

#[async_trait]
impl QuestionGenerator for TemplateQuestionGenerator {
    async fn generate(&self, query: &str, minimum: usize) -> Vec<String> {
        Self::questions(query, minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_skips_request_verbs_and_articles() {
        assert_eq!(TemplateQuestionGenerator::extract_topic("build a web app"), "web");
        assert_eq!(
            TemplateQuestionGenerator::extract_topic("Please write the README!"),
            "readme"
        );
    }

    #[test]
    fn test_topic_trims_punctuation() {
        assert_eq!(TemplateQuestionGenerator::extract_topic("\"Rust?\""), "rust");
    }

    #[test]
    fn test_topic_defaults_when_only_stopwords() {
        assert_eq!(TemplateQuestionGenerator::extract_topic("can you help me"), DEFAULT_TOPIC);
        assert_eq!(TemplateQuestionGenerator::extract_topic(""), DEFAULT_TOPIC);
    }

    #[test]
    fn test_default_minimum_uses_templates() {
        let questions = TemplateQuestionGenerator::questions("build a web app", 3);
        assert_eq!(
            questions,
            vec![
                "What is your primary goal regarding web?",
                "Are there any specific requirements or constraints for web?",
                "Who is the intended audience for web?",
            ]
        );
    }

    #[test]
    fn test_large_minimum_pads_with_fallback() {
        let questions = TemplateQuestionGenerator::questions("deploy service", 6);
        assert_eq!(questions.len(), 6);
        assert_eq!(questions[3], "Do you have a preferred format or level of detail for deploy?");
        assert_eq!(questions[4], FALLBACK_QUESTION);
        assert_eq!(questions[5], FALLBACK_QUESTION);
    }

    #[test]
    fn test_generate_returns_exactly_minimum() {
        let generator = TemplateQuestionGenerator::new();
        for minimum in 0..8 {
            let questions = tokio_test::block_on(generator.generate("summarize the report", minimum));
            assert_eq!(questions.len(), minimum);
        }
    }
}
