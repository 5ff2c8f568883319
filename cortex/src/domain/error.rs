// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Error types for the memory tiers
//!
//! The two persistent tiers fail differently on purpose. A long-term log
//! write that fails surfaces as [`StorageError`] to whoever called
//! `add_message`. A learner weight save that fails is a
//! [`LearnerPersistError`], which the memory manager only logs.

/// Failure of the durable message log (or any other SQL-backed store)
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

/// Failure to load or save learner weights
#[derive(Debug, thiserror::Error)]
pub enum LearnerPersistError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for LearnerPersistError {
    fn from(e: std::io::Error) -> Self {
        LearnerPersistError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for LearnerPersistError {
    fn from(e: serde_json::Error) -> Self {
        LearnerPersistError::Serialization(e.to_string())
    }
}
