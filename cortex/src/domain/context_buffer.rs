// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Short-term memory: a bounded FIFO window over the latest messages

use std::collections::VecDeque;

use super::message::{Message, Role};

/// Default number of messages kept in the short-term window
pub const SHORT_TERM_LIMIT_DEFAULT: usize = 50;

/// Fixed-capacity ring of recent messages.
///
/// # Invariants
///
/// - `len() <= capacity()` after every call.
/// - Appending past capacity evicts the oldest message first.
#[derive(Debug, Clone)]
pub struct BoundedContextBuffer {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl BoundedContextBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push_back(Message::new(role, content));
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    /// Copy of the window, oldest first
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BoundedContextBuffer {
    fn default() -> Self {
        Self::new(SHORT_TERM_LIMIT_DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let mut buffer = BoundedContextBuffer::new(5);
        buffer.add(Role::User, "hello");
        buffer.add(Role::Assistant, "hi");

        assert_eq!(
            buffer.snapshot(),
            vec![Message::user("hello"), Message::assistant("hi")]
        );
    }

    #[test]
    fn test_overflow_keeps_last_n_messages() {
        let capacity = 3;
        let mut buffer = BoundedContextBuffer::new(capacity);

        for i in 0..(capacity + 4) {
            buffer.add(Role::User, format!("message {}", i));
            assert!(buffer.len() <= capacity);
        }

        let contents: Vec<_> = buffer.snapshot().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["message 4", "message 5", "message 6"]);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut buffer = BoundedContextBuffer::new(2);
        buffer.add(Role::User, "first");

        let before = buffer.snapshot();
        buffer.add(Role::User, "second");

        assert_eq!(before.len(), 1);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let mut buffer = BoundedContextBuffer::new(0);
        buffer.add(Role::User, "dropped");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(BoundedContextBuffer::default().capacity(), SHORT_TERM_LIMIT_DEFAULT);
    }
}
