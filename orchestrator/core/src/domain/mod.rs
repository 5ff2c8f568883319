// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Domain types for the Dexter orchestrator: collaboration events, the
//! clarification strategy, the chat-provider port and configuration.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Orchestrator domain model

pub mod events;
pub mod clarification;
pub mod llm;
pub mod config;
