// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// Conversation Store - Per-session transcripts
//
// One SQLite row per message, keyed by session id. Timestamps are stored as
// fixed-width RFC 3339 UTC strings so that text order equals time order.

use chrono::{DateTime, SecondsFormat, Utc};
use dexter_cortex::StorageError;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub sender: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

pub struct ConversationStore {
    pool: SqlitePool,
}

impl ConversationStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                sender TEXT NOT NULL,
                message TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversations_session ON conversations (session_id)",
        )
        .execute(&pool)
        .await?;

        info!("Conversation store opened at {}", path.display());
        Ok(Self { pool })
    }

    /// Append a message stamped with the current UTC time
    pub async fn add_message(
        &self,
        session_id: &str,
        sender: &str,
        message: &str,
    ) -> Result<ConversationEntry, StorageError> {
        let timestamp = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO conversations (session_id, sender, message, timestamp)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(session_id)
        .bind(sender)
        .bind(message)
        .bind(timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?;

        Ok(ConversationEntry {
            sender: sender.to_string(),
            message: message.to_string(),
            timestamp,
        })
    }

    /// Full transcript for `session_id`, oldest first
    pub async fn get_messages(&self, session_id: &str) -> Result<Vec<ConversationEntry>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT sender, message, timestamp
            FROM conversations
            WHERE session_id = ?1
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<ConversationEntry, StorageError> {
                let raw: String = row.try_get("timestamp")?;
                let timestamp = DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| StorageError::Corrupt(format!("timestamp '{}': {}", raw, e)))?
                    .with_timezone(&Utc);

                Ok(ConversationEntry {
                    sender: row.try_get("sender")?,
                    message: row.try_get("message")?,
                    timestamp,
                })
            })
            .collect()
    }
}
