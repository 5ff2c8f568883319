// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod memory_manager;

pub use memory_manager::MemoryManager;
