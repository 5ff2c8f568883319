// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer for the memory bounded context

pub mod repository;
pub mod message_log;
pub mod weight_store;

pub use repository::{MessageLog, WeightStore};
pub use message_log::{InMemoryMessageLog, SqliteMessageLog};
pub use weight_store::{InMemoryWeightStore, JsonFileWeightStore};
