// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Lib
//!
//! Layered conversational memory for Dexter: a short-term window, a durable
//! message log, an in-memory knowledge graph and an online learner, behind
//! the [`MemoryManager`] facade.
//!
//! # Architecture
//!
//! - **Layer:** Learning & Memory Layer
//! - **Purpose:** Conversation memory for the orchestrator

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
pub use application::*;
pub use infrastructure::*;
