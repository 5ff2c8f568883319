// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Dexter CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Composition root, HTTP server and terminal commands

pub mod daemon;
pub mod commands;
pub mod embedded;
