//! Integration event types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::policies::PolicyHolder;

pub const POLICY_CREATED: &str = "PolicyCreated";
pub const POLICY_TERMINATED: &str = "PolicyTerminated";

/// Events published by the policy service and consumed by downstream
/// projections in other services.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntegrationEvent {
    PolicyCreated(PolicyCreated),
    PolicyTerminated(PolicyTerminated),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCreated {
    pub policy_number: String,
    pub product_code: String,
    pub policy_from: NaiveDate,
    pub policy_to: NaiveDate,
    pub policy_holder: PolicyHolder,
    pub total_premium: Decimal,
    pub agent_login: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyTerminated {
    pub policy_number: String,
    pub product_code: String,
    pub policy_from: NaiveDate,
    pub policy_to: NaiveDate,
    pub termination_date: NaiveDate,
    pub amount_to_return: Decimal,
    pub agent_login: String,
}

impl IntegrationEvent {
    /// Message type carried in transport envelopes.
    pub fn message_type(&self) -> &'static str {
        match self {
            IntegrationEvent::PolicyCreated(_) => POLICY_CREATED,
            IntegrationEvent::PolicyTerminated(_) => POLICY_TERMINATED,
        }
    }

    pub fn policy_number(&self) -> &str {
        match self {
            IntegrationEvent::PolicyCreated(e) => &e.policy_number,
            IntegrationEvent::PolicyTerminated(e) => &e.policy_number,
        }
    }

    pub fn to_payload(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::Unexpected(format!("Failed to encode event: {}", e)))
    }

    /// Decodes a payload received from a transport. The declared message type
    /// must agree with the payload's own tag.
    pub fn from_payload(message_type: &str, payload: serde_json::Value) -> Result<Self> {
        let event: IntegrationEvent = serde_json::from_value(payload).map_err(|e| {
            Error::Unexpected(format!("Failed to decode {} event: {}", message_type, e))
        })?;
        if event.message_type() != message_type {
            return Err(Error::Unexpected(format!(
                "Envelope declares {} but carries {}",
                message_type,
                event.message_type()
            )));
        }
        Ok(event)
    }
}
