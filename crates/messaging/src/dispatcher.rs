//! Subscription loop with reconnect.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::envelope::Envelope;
use crate::transport::{Delivery, Subscription, Transport};

/// Consumer of envelopes received by a [`Dispatcher`].
#[async_trait]
pub trait EnvelopeHandler: Send + Sync {
    async fn handle(&self, envelope: &Envelope) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(10),
        }
    }
}

/// Feeds every envelope from a transport subscription to a handler.
///
/// Envelopes are handled one at a time. A successful handler acks the
/// delivery, a failing one nacks it. When the subscription errors or ends
/// the dispatcher waits and subscribes again, doubling the wait up to
/// `max_backoff`.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    handler: Arc<dyn EnvelopeHandler>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, handler: Arc<dyn EnvelopeHandler>) -> Self {
        Self {
            transport,
            handler,
            config: DispatcherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Subscribes, then runs the loop on a spawned task until `shutdown`
    /// flips to `true` or its sender is dropped.
    ///
    /// The first subscription is made before this returns, so envelopes
    /// published afterwards on a live transport are not missed.
    pub async fn start(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let first = match self.transport.subscribe().await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                warn!(
                    "Initial {} subscription failed, retrying in background: {}",
                    self.transport.name(),
                    e
                );
                None
            }
        };
        tokio::spawn(self.run(first, shutdown))
    }

    async fn run(self, mut subscription: Option<Subscription>, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = self.config.initial_backoff;
        info!("{} dispatcher started", self.transport.name());
        loop {
            if *shutdown.borrow() {
                break;
            }
            let mut current = match subscription.take() {
                Some(current) => current,
                None => match self.transport.subscribe().await {
                    Ok(current) => {
                        info!("Re-subscribed to {} transport", self.transport.name());
                        current
                    }
                    Err(e) => {
                        warn!("Subscribing to {} failed: {}", self.transport.name(), e);
                        if wait_or_shutdown(backoff, &mut shutdown).await {
                            break;
                        }
                        backoff = (backoff * 2).min(self.config.max_backoff);
                        continue;
                    }
                },
            };

            let stopped = loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break true;
                        }
                    }
                    item = current.next() => match item {
                        Some(Ok(delivery)) => {
                            backoff = self.config.initial_backoff;
                            self.dispatch(delivery).await;
                        }
                        Some(Err(e)) => {
                            warn!("{} transport error, reconnecting: {}", self.transport.name(), e);
                            break false;
                        }
                        None => {
                            warn!("{} subscription ended, reconnecting", self.transport.name());
                            break false;
                        }
                    }
                }
            };
            if stopped || wait_or_shutdown(backoff, &mut shutdown).await {
                break;
            }
            backoff = (backoff * 2).min(self.config.max_backoff);
        }
        info!("{} dispatcher stopped", self.transport.name());
    }

    async fn dispatch(&self, delivery: Delivery) {
        let id = delivery.envelope.id.clone();
        let message_type = delivery.envelope.message_type.clone();
        match self.handler.handle(&delivery.envelope).await {
            Ok(()) => {
                debug!("Handled {} {}", message_type, id);
                if let Err(e) = delivery.ack().await {
                    warn!("Failed to ack {} {}: {}", message_type, id, e);
                }
            }
            Err(e) => {
                warn!("Handler failed for {} {}: {:#}", message_type, id, e);
                if let Err(e) = delivery.nack().await {
                    warn!("Failed to nack {} {}: {}", message_type, id, e);
                }
            }
        }
    }
}

/// Sleeps for `delay`; returns true when shutdown was requested meanwhile.
async fn wait_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => *shutdown.borrow(),
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}
