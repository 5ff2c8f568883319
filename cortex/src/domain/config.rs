// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Memory configuration (the `memory:` section of `dexter-config.yaml`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::context_buffer::SHORT_TERM_LIMIT_DEFAULT;
use super::learner::{LEARNER_DIMENSION_DEFAULT, LEARNER_LEARNING_RATE_DEFAULT};

/// Default number of messages returned by a context read
pub const CONTEXT_LIMIT_DEFAULT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Capacity of the short-term window
    #[serde(default = "default_short_term_limit")]
    pub short_term_limit: usize,

    /// Messages read from long-term memory when short-term is empty
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,

    #[serde(default)]
    pub long_term: LongTermConfig,

    #[serde(default)]
    pub learner: LearnerConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_limit: default_short_term_limit(),
            context_limit: default_context_limit(),
            long_term: LongTermConfig::default(),
            learner: LearnerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongTermBackend {
    Sqlite,
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermConfig {
    #[serde(default = "default_backend")]
    pub backend: LongTermBackend,

    /// SQLite database file (ignored for `in_memory`)
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for LongTermConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerConfig {
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// JSON file holding the flat weight vector
    #[serde(default = "default_weights_path")]
    pub weights_path: PathBuf,

    /// Keep weights in memory only (useful for tests and throwaway sessions)
    #[serde(default)]
    pub ephemeral: bool,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            learning_rate: default_learning_rate(),
            weights_path: default_weights_path(),
            ephemeral: false,
        }
    }
}

fn default_short_term_limit() -> usize {
    SHORT_TERM_LIMIT_DEFAULT
}

fn default_context_limit() -> usize {
    CONTEXT_LIMIT_DEFAULT
}

fn default_backend() -> LongTermBackend {
    LongTermBackend::Sqlite
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./data/memory.db")
}

fn default_dimension() -> usize {
    LEARNER_DIMENSION_DEFAULT
}

fn default_learning_rate() -> f64 {
    LEARNER_LEARNING_RATE_DEFAULT
}

fn default_weights_path() -> PathBuf {
    PathBuf::from("./data/learner_weights.json")
}
