//! In-memory chat log
//!
//! Lives for the lifetime of the process. Nothing is persisted.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub user: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct ChatLog {
    messages: RwLock<Vec<ChatMessage>>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    /// Append, then hand the whole log to `publish` before the write lock
    /// is released, so overlapping appends publish in append order.
    pub async fn append_with<F>(&self, message: ChatMessage, publish: F)
    where
        F: FnOnce(&[ChatMessage]),
    {
        let mut messages = self.messages.write().await;
        messages.push(message);
        publish(&messages);
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}
