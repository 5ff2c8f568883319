// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Lib
//!
//! Dexter orchestrator core: the clarification workflow, the collaboration
//! hub and its listeners, chat providers and the HTTP API.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Orchestrates memory, collaboration and language models

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
