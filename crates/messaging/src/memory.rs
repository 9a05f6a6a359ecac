//! Single-process bus over a tokio broadcast channel.

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, warn};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::transport::{Delivery, Subscription, Transport};

const DEFAULT_CAPACITY: usize = 1024;

/// Every subscriber receives every envelope published after it subscribed.
/// Subscribers that fall more than `capacity` envelopes behind skip ahead.
#[derive(Clone)]
pub struct InMemoryBus {
    sender: broadcast::Sender<Envelope>,
}

impl InMemoryBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl Transport for InMemoryBus {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn publish(&self, envelope: &Envelope) -> Result<()> {
        match self.sender.send(envelope.clone()) {
            Ok(receivers) => debug!("{} delivered to {} subscriber(s)", envelope.id, receivers),
            Err(_) => debug!("{} dropped, no subscribers", envelope.id),
        }
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription> {
        let stream = BroadcastStream::new(self.sender.subscribe()).filter_map(|item| async move {
            match item {
                Ok(envelope) => Some(Ok(Delivery::new(envelope))),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!("In-memory subscriber lagged, skipped {} envelope(s)", skipped);
                    None
                }
            }
        });
        Ok(Box::pin(stream))
    }
}
