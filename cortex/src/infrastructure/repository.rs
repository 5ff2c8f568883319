// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Repository interfaces for the memory bounded context
//! Defines the contracts for the durable message log and learner weight storage

use async_trait::async_trait;

use crate::domain::{LearnerPersistError, Message, Role, StorageError};

/// Append-only, ordered log of every message ever stored
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Append a message. A returned `Ok` means the write is durable.
    async fn add(&self, role: Role, content: &str) -> Result<(), StorageError>;

    /// The last `limit` messages in insertion order (oldest first)
    async fn get_recent(&self, limit: usize) -> Result<Vec<Message>, StorageError>;

    /// Total number of stored messages
    async fn count(&self) -> Result<usize, StorageError>;
}

/// Storage for the learner's flat weight vector
#[async_trait]
pub trait WeightStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    async fn load(&self) -> Result<Option<Vec<f64>>, LearnerPersistError>;

    async fn save(&self, weights: &[f64]) -> Result<(), LearnerPersistError>;
}
