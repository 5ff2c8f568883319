// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Memory domain types: messages, the short-term window, the knowledge
//! graph and the online learner. Nothing here performs I/O.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure memory data structures

pub mod message;
pub mod error;
pub mod context_buffer;
pub mod graph;
pub mod learner;
pub mod config;

pub use message::*;
pub use error::*;
pub use context_buffer::*;
pub use graph::*;
pub use learner::*;
pub use config::*;
