//! Bridges transport deliveries to the local mediator.

use async_trait::async_trait;
use policyhub_core::events::{IntegrationEvent, Mediator, POLICY_CREATED, POLICY_TERMINATED};
use policyhub_messaging::{Envelope, EnvelopeHandler};

/// Decodes envelopes into integration events and fans them out to the
/// handlers registered on the mediator.
///
/// Any handler failure fails the envelope so the transport can redeliver it.
pub struct MediatorEnvelopeHandler {
    mediator: Mediator,
}

impl MediatorEnvelopeHandler {
    pub fn new(mediator: Mediator) -> Self {
        Self { mediator }
    }
}

#[async_trait]
impl EnvelopeHandler for MediatorEnvelopeHandler {
    async fn handle(&self, envelope: &Envelope) -> anyhow::Result<()> {
        if envelope.message_type != POLICY_CREATED && envelope.message_type != POLICY_TERMINATED {
            tracing::debug!(
                "Ignoring {} envelope {} from {}",
                envelope.message_type,
                envelope.id,
                envelope.source
            );
            return Ok(());
        }

        let event = IntegrationEvent::from_payload(&envelope.message_type, envelope.payload.clone())?;
        let report = self.mediator.publish(&event).await;
        if !report.is_success() {
            anyhow::bail!(
                "{} for policy {} failed in: {}",
                envelope.message_type,
                event.policy_number(),
                report.failed.join(", ")
            );
        }
        tracing::debug!(
            "{} {} delivered to {} handler(s)",
            envelope.message_type,
            envelope.id,
            report.delivered
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use policyhub_core::errors::{Error, Result};
    use policyhub_core::events::{IntegrationEventHandler, PolicyCreated};
    use policyhub_core::policies::PolicyHolder;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Recorder(AtomicUsize);

    #[async_trait]
    impl IntegrationEventHandler for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn handle(&self, _event: &IntegrationEvent) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl IntegrationEventHandler for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn handle(&self, _event: &IntegrationEvent) -> Result<()> {
            Err(Error::Repository("store offline".to_string()))
        }
    }

    fn created_envelope() -> Envelope {
        let event = IntegrationEvent::PolicyCreated(PolicyCreated {
            policy_number: "P-7".to_string(),
            product_code: "CAR".to_string(),
            policy_from: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            policy_to: NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            policy_holder: PolicyHolder {
                first_name: "Ewa".to_string(),
                last_name: "Lis".to_string(),
                tax_id: "1".to_string(),
            },
            total_premium: dec!(2082.50),
            agent_login: "agnes.smith".to_string(),
        });
        Envelope::new(event.message_type(), "policies", event.to_payload().unwrap())
    }

    #[tokio::test]
    async fn envelope_reaches_every_handler() {
        let recorder = Arc::new(Recorder(AtomicUsize::new(0)));
        let handler = MediatorEnvelopeHandler::new(Mediator::new().with_handler(recorder.clone()));

        handler.handle(&created_envelope()).await.unwrap();
        assert_eq!(recorder.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_handler_fails_the_envelope() {
        let recorder = Arc::new(Recorder(AtomicUsize::new(0)));
        let handler = MediatorEnvelopeHandler::new(
            Mediator::new()
                .with_handler(Arc::new(Broken))
                .with_handler(recorder.clone()),
        );

        let err = handler.handle(&created_envelope()).await.unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert_eq!(recorder.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn foreign_and_garbled_envelopes() {
        let handler = MediatorEnvelopeHandler::new(Mediator::new());
        let foreign = Envelope::new("InvoiceIssued", "billing", serde_json::json!({}));
        handler.handle(&foreign).await.unwrap();

        let garbled = Envelope::new(POLICY_CREATED, "policies", serde_json::json!({"type": 1}));
        assert!(handler.handle(&garbled).await.is_err());
    }
}
