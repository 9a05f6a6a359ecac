//! Domain event sink that publishes integration events to a transport.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use policyhub_core::events::{DomainEventSink, IntegrationEvent};
use policyhub_messaging::{Envelope, Transport};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const INITIAL_PUBLISH_BACKOFF: Duration = Duration::from_millis(100);

/// Queues events emitted by the policy service and publishes them from a
/// background worker.
///
/// Initialisation happens in two phases: `new()` opens the channel so services
/// can be built with the sink, `start_worker()` spawns the publisher once the
/// transport is ready. Events emitted in between are buffered.
pub struct TransportEventSink {
    tx: mpsc::UnboundedSender<IntegrationEvent>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<IntegrationEvent>>>,
}

impl TransportEventSink {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    pub fn start_worker(
        &self,
        transport: Arc<dyn Transport>,
        source: String,
        max_retries: u32,
        shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<JoinHandle<()>> {
        let rx = self
            .rx
            .lock()
            .map_err(|_| anyhow::anyhow!("Event sink lock poisoned"))?
            .take()
            .ok_or_else(|| anyhow::anyhow!("Event sink worker already started"))?;
        Ok(tokio::spawn(publish_worker(
            rx,
            transport,
            source,
            max_retries,
            shutdown,
        )))
    }
}

impl Default for TransportEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainEventSink for TransportEventSink {
    fn emit(&self, event: IntegrationEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("Event publisher has stopped, integration event dropped");
        }
    }
}

async fn publish_worker(
    mut rx: mpsc::UnboundedReceiver<IntegrationEvent>,
    transport: Arc<dyn Transport>,
    source: String,
    max_retries: u32,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!("Integration event publisher started on {}", transport.name());
    loop {
        tokio::select! {
            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else { break };
                publish_with_retry(transport.as_ref(), &source, &event, max_retries).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    // Publish what was emitted before shutdown; later emits are refused.
    rx.close();
    let mut drained = 0usize;
    while let Some(event) = rx.recv().await {
        publish_with_retry(transport.as_ref(), &source, &event, max_retries).await;
        drained += 1;
    }
    if drained > 0 {
        tracing::info!("Published {} queued events on shutdown", drained);
    }
    tracing::info!("Integration event publisher stopped");
}

/// Publishes one event, retrying transport failures with doubling backoff.
/// Returns whether the event went out.
async fn publish_with_retry(
    transport: &dyn Transport,
    source: &str,
    event: &IntegrationEvent,
    max_retries: u32,
) -> bool {
    let payload = match event.to_payload() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Dropping {} event: {}", event.message_type(), e);
            return false;
        }
    };
    let envelope = Envelope::new(event.message_type(), source, payload);

    let mut backoff = INITIAL_PUBLISH_BACKOFF;
    let mut attempt = 0;
    loop {
        match transport.publish(&envelope).await {
            Ok(()) => {
                tracing::debug!(
                    "Published {} {} for policy {}",
                    envelope.message_type,
                    envelope.id,
                    event.policy_number()
                );
                return true;
            }
            Err(e) if attempt < max_retries => {
                attempt += 1;
                tracing::warn!(
                    "Publishing {} failed (attempt {}/{}): {}",
                    envelope.id,
                    attempt,
                    max_retries,
                    e
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => {
                tracing::error!(
                    "Giving up on {} for policy {}: {}",
                    envelope.message_type,
                    event.policy_number(),
                    e
                );
                return false;
            }
        }
    }
}
