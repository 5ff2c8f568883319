// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// Chat Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates between the domain ChatProvider port and an
// external API.

pub mod echo;
pub mod ollama;
pub mod registry;

pub use echo::EchoProvider;
pub use ollama::OllamaChatProvider;
pub use registry::create_provider;
