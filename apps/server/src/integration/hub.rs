//! Pushes integration events and chat messages to connected clients.

use async_trait::async_trait;
use policyhub_core::chat::{ChatBroadcaster, ChatMessage};
use policyhub_core::errors::Result;
use policyhub_core::events::{IntegrationEvent, IntegrationEventHandler};

use crate::events::{
    EventBus, ServerEvent, CHAT_MESSAGE_EVENT, POLICY_CREATED_EVENT, POLICY_TERMINATED_EVENT,
};

pub struct HubBroadcastHandler {
    event_bus: EventBus,
}

impl HubBroadcastHandler {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

#[async_trait]
impl IntegrationEventHandler for HubBroadcastHandler {
    fn name(&self) -> &'static str {
        "hub"
    }

    async fn handle(&self, event: &IntegrationEvent) -> Result<()> {
        let name = match event {
            IntegrationEvent::PolicyCreated(_) => POLICY_CREATED_EVENT,
            IntegrationEvent::PolicyTerminated(_) => POLICY_TERMINATED_EVENT,
        };
        self.event_bus
            .publish(ServerEvent::with_payload(name, event.to_payload()?));
        Ok(())
    }
}

pub struct EventBusChatBroadcaster {
    event_bus: EventBus,
}

impl EventBusChatBroadcaster {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

impl ChatBroadcaster for EventBusChatBroadcaster {
    fn broadcast(&self, message: &ChatMessage) {
        match serde_json::to_value(message) {
            Ok(payload) => self
                .event_bus
                .publish(ServerEvent::with_payload(CHAT_MESSAGE_EVENT, payload)),
            Err(e) => tracing::error!("Failed to serialize chat message {}: {}", message.id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use policyhub_core::chat::ChatMessageKind;
    use policyhub_core::events::PolicyTerminated;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn policy_events_are_forwarded_with_hub_names() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let handler = HubBroadcastHandler::new(bus);

        handler
            .handle(&IntegrationEvent::PolicyTerminated(PolicyTerminated {
                policy_number: "P-3".to_string(),
                product_code: "HSI".to_string(),
                policy_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                policy_to: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                termination_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                amount_to_return: dec!(120),
                agent_login: "danny.solid".to_string(),
            }))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, POLICY_TERMINATED_EVENT);
        assert_eq!(event.payload.unwrap()["policyNumber"], "P-3");
    }

    #[tokio::test]
    async fn chat_messages_are_broadcast() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        EventBusChatBroadcaster::new(bus).broadcast(&ChatMessage {
            id: "m-1".to_string(),
            sender: "jimmy.solid".to_string(),
            text: "hello".to_string(),
            sent_at: Utc::now(),
            kind: ChatMessageKind::User,
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, CHAT_MESSAGE_EVENT);
        assert_eq!(event.payload.unwrap()["text"], "hello");
    }
}
