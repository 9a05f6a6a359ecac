use serde_json::Value;
use tokio::sync::broadcast;

/// Event names pushed to connected dashboard clients.
pub const POLICY_CREATED_EVENT: &str = "policy:created";
pub const POLICY_TERMINATED_EVENT: &str = "policy:terminated";
pub const CHAT_MESSAGE_EVENT: &str = "chat:message";

#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: &'static str,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn with_payload(name: &'static str, payload: Value) -> Self {
        Self {
            name,
            payload: Some(payload),
        }
    }
}

/// Broadcast hub fanning events out to every connected SSE client.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // No connected clients is not an error.
        let _ = self.sender.send(event);
    }
}
