use async_trait::async_trait;

use super::chat_model::ChatMessage;
use crate::errors::Result;

/// Pushes chat messages to connected clients.
pub trait ChatBroadcaster: Send + Sync {
    fn broadcast(&self, message: &ChatMessage);
}

/// Broadcaster that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpChatBroadcaster;

impl ChatBroadcaster for NoOpChatBroadcaster {
    fn broadcast(&self, _message: &ChatMessage) {}
}

#[async_trait]
pub trait ChatServiceTrait: Send + Sync {
    async fn send(&self, sender: &str, text: &str) -> Result<ChatMessage>;

    /// Up to `limit` most recent messages, oldest first.
    fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>>;
}
