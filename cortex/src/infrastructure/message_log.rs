// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Long-term memory: the durable message log
//!
//! The SQLite adapter keeps a single `messages` table whose autoincrement
//! id is the insertion order. Reads take the newest `limit` rows and flip
//! them back to oldest-first.

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::{Message, Role, StorageError};
use crate::infrastructure::repository::MessageLog;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteMessageLog {
    pool: SqlitePool,
}

impl SqliteMessageLog {
    /// Open (or create) the log at `path`. Missing parent directories are
    /// created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                role TEXT NOT NULL,
                content TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        info!("Long-term memory opened at {}", path.display());
        Ok(Self { pool })
    }

    /// Close the pool, flushing the WAL
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl MessageLog for SqliteMessageLog {
    async fn add(&self, role: Role, content: &str) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO messages (role, content) VALUES (?1, ?2)")
            .bind(role.as_str())
            .bind(content)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<Message>, StorageError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT role, content
            FROM messages
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut messages = rows
            .into_iter()
            .map(|row| -> Result<Message, StorageError> {
                let role: String = row.try_get("role")?;
                let content: String = row.try_get("content")?;
                let role = role
                    .parse::<Role>()
                    .map_err(|e| StorageError::Corrupt(e.to_string()))?;
                Ok(Message::new(role, content))
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        messages.reverse();
        debug!("Loaded {} messages from long-term memory", messages.len());
        Ok(messages)
    }

    async fn count(&self) -> Result<usize, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM messages")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(usize::try_from(total).unwrap_or(0))
    }
}

/// Process-local log, lost on exit
#[derive(Default)]
pub struct InMemoryMessageLog {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn add(&self, role: Role, content: &str) -> Result<(), StorageError> {
        self.messages.write().push(Message::new(role, content));
        Ok(())
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<Message>, StorageError> {
        let messages = self.messages.read();
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.messages.read().len())
    }
}
