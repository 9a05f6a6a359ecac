use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Transport-neutral wrapper around one published message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub id: String,
    pub message_type: String,
    pub published_at: DateTime<Utc>,
    /// Name of the publishing service.
    pub source: String,
    pub payload: serde_json::Value,
}

impl Envelope {
    pub fn new(message_type: &str, source: &str, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message_type: message_type.to_string(),
            published_at: Utc::now(),
            source: source.to_string(),
            payload,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessagingError;
    use serde_json::json;

    #[test]
    fn wire_format_uses_camel_case() {
        let envelope = Envelope::new("PolicyCreated", "policy", json!({"policyNumber": "P-1"}));
        let value: serde_json::Value = serde_json::from_slice(&envelope.to_bytes().unwrap()).unwrap();
        assert_eq!(value["messageType"], "PolicyCreated");
        assert_eq!(value["source"], "policy");
        assert_eq!(value["payload"]["policyNumber"], "P-1");
        assert!(value.get("publishedAt").is_some());
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        assert!(matches!(
            Envelope::from_bytes(b"not json"),
            Err(MessagingError::Serialization(_))
        ));
    }
}
