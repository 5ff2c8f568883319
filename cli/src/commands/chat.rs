// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `dexter chat`: interactive session against a running server

use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

use crate::daemon::{check_server_running, DexterClient, ServerStatus};

const EXIT_COMMANDS: &[&str] = &["exit", "quit"];

pub async fn handle_command(host: &str, port: u16, session_id: Option<String>) -> Result<()> {
    match check_server_running(host, port).await? {
        ServerStatus::Running => {}
        ServerStatus::Unhealthy { error } => {
            anyhow::bail!("Dexter server at {}:{} is unhealthy: {}", host, port, error)
        }
        ServerStatus::Stopped => anyhow::bail!(
            "No Dexter server at {}:{}. Start one with `dexter serve`.",
            host,
            port
        ),
    }

    let client = DexterClient::new(host, port)?;
    let session_id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    println!(
        "{}",
        format!("Connected to {} (session {})", client.base_url(), session_id).green()
    );
    println!("{}", "Type 'exit' or 'quit' to leave.".dimmed());

    let mut stdin = BufReader::new(tokio::io::stdin());
    let turns = run(&client, &session_id, &mut stdin).await?;
    debug!("Chat session {} ended after {} turns", session_id, turns);

    Ok(())
}

/// Read-eval-print loop; returns the number of answered queries.
///
/// Clarifying questions that come back with a reply are asked one line at
/// a time; non-blank answers are posted to the server so they inform the
/// next turn.
pub async fn run<R>(client: &DexterClient, session_id: &str, input: &mut R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut turns = 0;

    loop {
        print!("{} ", "you>".bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if is_exit(query) {
            break;
        }

        match client.query(query, session_id).await {
            Ok(reply) => {
                println!("{} {}", "dexter>".cyan().bold(), reply.response);
                turns += 1;

                if reply.clarifications.is_empty() {
                    continue;
                }
                let (answers, closed) = read_answers(&mut lines, &reply.clarifications).await?;
                if !answers.is_empty() {
                    match client.answer_clarifications(&answers).await {
                        Ok(count) => debug!("Recorded {} clarification answers", count),
                        Err(e) => eprintln!("{} {:#}", "error:".red().bold(), e),
                    }
                }
                if closed {
                    println!();
                    break;
                }
            }
            Err(e) => eprintln!("{} {:#}", "error:".red().bold(), e),
        }
    }

    Ok(turns)
}

/// One answer line per question; blank lines skip. The flag is set when
/// input closed before every question was answered.
async fn read_answers<B>(lines: &mut Lines<B>, questions: &[String]) -> Result<(Vec<String>, bool)>
where
    B: AsyncBufRead + Unpin,
{
    println!("{}", "A few questions (blank line to skip):".dimmed());
    let mut answers = Vec::new();

    for (i, question) in questions.iter().enumerate() {
        print!("  {} {} ", format!("[{}]", i + 1).yellow(), question);
        std::io::stdout().flush()?;

        match lines.next_line().await? {
            Some(line) if !line.trim().is_empty() => answers.push(line.trim().to_string()),
            Some(_) => {}
            None => return Ok((answers, true)),
        }
    }

    Ok((answers, false))
}

fn is_exit(line: &str) -> bool {
    EXIT_COMMANDS
        .iter()
        .any(|command| line.eq_ignore_ascii_case(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(!is_exit("exit now"));
    }

    #[tokio::test]
    async fn test_loop_counts_answered_turns_and_stops_on_exit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .with_status(200)
            .with_body(
                json!({
                    "response": "ok",
                    "clarifications": [],
                    "session_id": "s-1"
                })
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let client = DexterClient::with_base_url(server.url()).unwrap();
        let mut input: &[u8] = b"hello\n\nagain\nexit\nnever sent\n";

        let turns = run(&client, "s-1", &mut input).await.unwrap();

        assert_eq!(turns, 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_clarifications_are_answered_and_posted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(200)
            .with_body(
                json!({
                    "response": "ok",
                    "clarifications": ["Who is it for?", "Any deadline?", "Budget?"],
                    "session_id": "s-1"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let answers = server
            .mock("POST", "/clarifications")
            .match_body(mockito::Matcher::PartialJson(
                json!({"answers": ["recruiters", "friday"]}),
            ))
            .with_status(200)
            .with_body(r#"{"count":2}"#)
            .expect(1)
            .create_async()
            .await;

        let client = DexterClient::with_base_url(server.url()).unwrap();
        let mut input: &[u8] = b"build a portfolio
recruiters

friday
quit
";

        let turns = run(&client, "s-1", &mut input).await.unwrap();

        assert_eq!(turns, 1);
        answers.assert_async().await;
    }

    #[tokio::test]
    async fn test_all_blank_answers_post_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(200)
            .with_body(
                json!({
                    "response": "ok",
                    "clarifications": ["Who is it for?"],
                    "session_id": "s-1"
                })
                .to_string(),
            )
            .create_async()
            .await;
        let answers = server
            .mock("POST", "/clarifications")
            .expect(0)
            .create_async()
            .await;

        let client = DexterClient::with_base_url(server.url()).unwrap();
        let mut input: &[u8] = b"hello

";

        let turns = run(&client, "s-1", &mut input).await.unwrap();

        assert_eq!(turns, 1);
        answers.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_query_keeps_session_alive() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(502)
            .with_body(r#"{"error":"model offline"}"#)
            .create_async()
            .await;

        let client = DexterClient::with_base_url(server.url()).unwrap();
        let mut input: &[u8] = b"hello\nhello again\n";

        let turns = run(&client, "s-1", &mut input).await.unwrap();
        assert_eq!(turns, 0);
    }
}
