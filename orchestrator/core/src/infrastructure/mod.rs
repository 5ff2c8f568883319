// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Adapters for the orchestrator: the collaboration hub, the SSE event
//! stream, chat providers and the conversation transcript store.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Concrete adapters behind the domain ports

pub mod collaboration_hub;
pub mod event_stream;
pub mod conversation_store;
pub mod llm;

pub use collaboration_hub::{
    AsyncFnListener, BroadcastReport, CollaborationHub, CollaborationListener, FnListener,
    ListenerError,
};
pub use event_stream::{EventReceiver, EventStreamError, EventStreamListener};
pub use conversation_store::{ConversationEntry, ConversationStore};
