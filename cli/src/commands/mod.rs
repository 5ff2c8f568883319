// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Dexter CLI

pub mod ask;
pub mod chat;
pub mod config;

pub use self::config::ConfigCommand;
