// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # MemoryManager - Layered Conversational Memory
//!
//! Facade over the four memory tiers:
//!
//! - **Short-term**: [`BoundedContextBuffer`], the latest N messages.
//! - **Long-term**: a [`MessageLog`], every message ever stored.
//! - **Knowledge graph**: [`RelationGraph`], in-memory entity relations.
//! - **Neural memory**: [`OnlineScalarLearner`], trained on every message.
//!
//! ## Write path
//!
//! `add_message` fans out short-term → long-term → learner, in that order,
//! under a single async mutex. A long-term failure is returned to the caller
//! after the short-term write has already happened; the learner is then left
//! untouched. Learner weight saves are best effort and only logged.
//!
//! ## Read path
//!
//! `get_recent_context` serves the short-term snapshot whenever it is
//! non-empty and only consults the long-term log after a cold start.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{
    BoundedContextBuffer, LongTermBackend, MemoryConfig, Message, OnlineScalarLearner,
    Relation, RelationGraph, Role, StorageError,
};
use crate::infrastructure::{
    InMemoryMessageLog, InMemoryWeightStore, JsonFileWeightStore, MessageLog, SqliteMessageLog,
    WeightStore,
};

struct WorkingState {
    short_term: BoundedContextBuffer,
    learner: OnlineScalarLearner,
}

pub struct MemoryManager {
    state: Mutex<WorkingState>,
    long_term: Arc<dyn MessageLog>,
    weights: Arc<dyn WeightStore>,
    graph: RwLock<RelationGraph>,
}

impl MemoryManager {
    /// Build the adapters named in `config` and restore learner state
    pub async fn from_config(config: &MemoryConfig) -> Result<Self, StorageError> {
        let long_term: Arc<dyn MessageLog> = match config.long_term.backend {
            LongTermBackend::Sqlite => {
                Arc::new(SqliteMessageLog::open(&config.long_term.database_path).await?)
            }
            LongTermBackend::InMemory => Arc::new(InMemoryMessageLog::new()),
        };

        let weights: Arc<dyn WeightStore> = if config.learner.ephemeral {
            Arc::new(InMemoryWeightStore::new())
        } else {
            Arc::new(JsonFileWeightStore::new(&config.learner.weights_path))
        };

        Ok(Self::with_stores(config, long_term, weights).await)
    }

    /// Compose a manager from explicit ports. Unreadable learner state is
    /// logged and replaced with zeros.
    pub async fn with_stores(
        config: &MemoryConfig,
        long_term: Arc<dyn MessageLog>,
        weights: Arc<dyn WeightStore>,
    ) -> Self {
        let stored = match weights.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to load learner weights, starting from zeros: {}", e);
                None
            }
        };

        let learner = OnlineScalarLearner::with_weights(
            config.learner.dimension,
            config.learner.learning_rate,
            stored,
        );

        Self {
            state: Mutex::new(WorkingState {
                short_term: BoundedContextBuffer::new(config.short_term_limit),
                learner,
            }),
            long_term,
            weights,
            graph: RwLock::new(RelationGraph::new()),
        }
    }

    /// Record a message in every tier.
    ///
    /// # Errors
    ///
    /// [`StorageError`] when the long-term write fails. The message is
    /// already in short-term memory at that point.
    pub async fn add_message(&self, role: Role, content: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;

        state.short_term.add(role, content);
        self.long_term.add(role, content).await?;

        let error = state.learner.update(content, role.learning_target());
        debug!("Learner updated on {} message, error before step {:.4}", role, error);

        if let Err(e) = self.weights.save(state.learner.weights()).await {
            warn!("Failed to persist learner weights: {}", e);
        }

        Ok(())
    }

    /// Short-term snapshot, or the last `limit` long-term messages when
    /// short-term memory is empty. `limit` does not cap the snapshot.
    pub async fn get_recent_context(&self, limit: usize) -> Result<Vec<Message>, StorageError> {
        {
            let state = self.state.lock().await;
            if !state.short_term.is_empty() {
                return Ok(state.short_term.snapshot());
            }
        }

        self.long_term.get_recent(limit).await
    }

    pub fn add_knowledge(&self, source: &str, relation: &str, target: &str) {
        self.graph.write().add_relationship(source, relation, target);
    }

    pub fn query_knowledge(&self, entity: &str) -> Vec<Relation> {
        self.graph.read().query(entity).to_vec()
    }

    /// Learner score for `content` without training on it
    pub async fn predict(&self, content: &str) -> f64 {
        self.state.lock().await.learner.predict(content)
    }

    /// Current learner weights (copied)
    pub async fn learner_weights(&self) -> Vec<f64> {
        self.state.lock().await.learner.weights().to_vec()
    }

    pub async fn short_term_len(&self) -> usize {
        self.state.lock().await.short_term.len()
    }
}
