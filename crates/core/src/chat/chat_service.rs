use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use uuid::Uuid;

use super::chat_model::{ChatMessage, ChatMessageKind};
use super::chat_traits::{ChatBroadcaster, ChatServiceTrait};
use crate::constants::{CHAT_HISTORY_LIMIT, CHAT_MESSAGE_MAX_LEN};
use crate::errors::{Error, Result, ValidationError};
use crate::events::{IntegrationEvent, IntegrationEventHandler};

const SYSTEM_SENDER: &str = "system";

pub struct ChatService {
    history: Mutex<VecDeque<ChatMessage>>,
    broadcaster: Arc<dyn ChatBroadcaster>,
}

impl ChatService {
    pub fn new(broadcaster: Arc<dyn ChatBroadcaster>) -> Self {
        Self {
            history: Mutex::new(VecDeque::with_capacity(CHAT_HISTORY_LIMIT)),
            broadcaster,
        }
    }

    fn post(&self, sender: &str, text: String, kind: ChatMessageKind) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            sender: sender.to_string(),
            text,
            sent_at: Utc::now(),
            kind,
        };
        {
            let mut history = self
                .history
                .lock()
                .map_err(|_| Error::Unexpected("Chat history lock poisoned".to_string()))?;
            if history.len() == CHAT_HISTORY_LIMIT {
                history.pop_front();
            }
            history.push_back(message.clone());
        }
        self.broadcaster.broadcast(&message);
        Ok(message)
    }
}

#[async_trait]
impl ChatServiceTrait for ChatService {
    async fn send(&self, sender: &str, text: &str) -> Result<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::MissingField("text".to_string()).into());
        }
        if text.chars().count() > CHAT_MESSAGE_MAX_LEN {
            return Err(ValidationError::InvalidInput(format!(
                "Chat message exceeds {} characters",
                CHAT_MESSAGE_MAX_LEN
            ))
            .into());
        }
        self.post(sender, text.to_string(), ChatMessageKind::User)
    }

    fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        let history = self
            .history
            .lock()
            .map_err(|_| Error::Unexpected("Chat history lock poisoned".to_string()))?;
        let skip = history.len().saturating_sub(limit);
        Ok(history.iter().skip(skip).cloned().collect())
    }
}

#[async_trait]
impl IntegrationEventHandler for ChatService {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn handle(&self, event: &IntegrationEvent) -> Result<()> {
        if let IntegrationEvent::PolicyCreated(e) = event {
            let text = format!(
                "New policy sold: {} ({}) for {} by {}, premium {}",
                e.policy_number,
                e.product_code,
                e.policy_holder.full_name(),
                e.agent_login,
                e.total_premium
            );
            let message = self.post(SYSTEM_SENDER, text, ChatMessageKind::System)?;
            info!("Chat notification {} posted", message.id);
        }
        Ok(())
    }
}
