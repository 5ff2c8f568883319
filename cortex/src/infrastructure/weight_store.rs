// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Learner weight persistence
//!
//! Weights are a flat JSON array of numbers. Saves go through a sibling
//! temp file and a rename so a crash mid-write never leaves a truncated
//! array behind.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use crate::domain::LearnerPersistError;
use crate::infrastructure::repository::WeightStore;

pub struct JsonFileWeightStore {
    path: PathBuf,
}

impl JsonFileWeightStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl WeightStore for JsonFileWeightStore {
    async fn load(&self) -> Result<Option<Vec<f64>>, LearnerPersistError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No learner weights at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let weights: Vec<f64> = serde_json::from_slice(&bytes)?;
        Ok(Some(weights))
    }

    async fn save(&self, weights: &[f64]) -> Result<(), LearnerPersistError> {
        // JSON has no NaN or infinity; serde_json would write them as null
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(LearnerPersistError::Serialization(
                "refusing to save non-finite learner weights".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec(weights)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryWeightStore {
    weights: RwLock<Option<Vec<f64>>>,
}

impl InMemoryWeightStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WeightStore for InMemoryWeightStore {
    async fn load(&self) -> Result<Option<Vec<f64>>, LearnerPersistError> {
        Ok(self.weights.read().clone())
    }

    async fn save(&self, weights: &[f64]) -> Result<(), LearnerPersistError> {
        *self.weights.write() = Some(weights.to_vec());
        Ok(())
    }
}
