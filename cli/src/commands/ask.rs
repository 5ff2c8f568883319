// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `dexter ask`: one query through the full clarification workflow,
//! in-process, with answers read from stdin.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::embedded::Services;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskOutcome {
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub response: String,
}

pub async fn handle_command(
    query: String,
    skip_clarifications: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, services) = Services::load(config_path).await?;
    let mut stdin = BufReader::new(tokio::io::stdin());

    let outcome = run(&services, &query, skip_clarifications, &mut stdin).await?;

    println!();
    println!("{} {}", "Dexter:".cyan().bold(), outcome.response);

    if let Some(partner) = &services.partner {
        partner.wait_for_pending().await;
        for proposal in partner.recent_proposals(1) {
            println!("{} {}", "Partner:".magenta().bold(), proposal.proposal.dimmed());
        }
    }

    Ok(())
}

/// Ask, collect one answer line per question, record them, then respond.
/// A closed input leaves the remaining questions unanswered.
pub async fn run<R>(
    services: &Services,
    query: &str,
    skip_clarifications: bool,
    input: &mut R,
) -> Result<AskOutcome>
where
    R: AsyncBufRead + Unpin,
{
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("query cannot be empty");
    }

    let autonomy = &services.autonomy;
    let mut questions = Vec::new();
    let mut answers = Vec::new();

    if !skip_clarifications && !autonomy.addresses_partner(query) {
        questions = autonomy
            .ask_clarifications(query)
            .await
            .context("Failed to ask clarifying questions")?;

        let mut lines = input.lines();
        for (i, question) in questions.iter().enumerate() {
            println!("{} {}", format!("[{}]", i + 1).yellow(), question);
            match lines.next_line().await.context("Failed to read answer")? {
                Some(line) if !line.trim().is_empty() => answers.push(line.trim().to_string()),
                Some(_) => {}
                None => break,
            }
        }

        if !answers.is_empty() {
            autonomy
                .record_clarification_answers(&answers)
                .await
                .context("Failed to record answers")?;
        }
    }

    let response = autonomy
        .process_request(query)
        .await
        .context("Failed to process request")?;

    Ok(AskOutcome {
        questions,
        answers,
        response,
    })
}
