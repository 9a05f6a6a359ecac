use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;

use crate::envelope::Envelope;
use crate::error::{MessagingError, Result};

/// Stream of deliveries produced by [`Transport::subscribe`].
pub type Subscription = Pin<Box<dyn Stream<Item = Result<Delivery>> + Send>>;

/// Settles a delivery with the transport that produced it.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    /// Processing succeeded; the message must not be delivered again.
    async fn ack(&self) -> Result<()>;

    /// Processing failed; the transport may redeliver.
    async fn nack(&self) -> Result<()>;
}

/// An envelope received from a subscription.
///
/// Deliveries from durable transports must be settled with [`Delivery::ack`]
/// or [`Delivery::nack`] before the next one is pulled from the stream.
pub struct Delivery {
    pub envelope: Envelope,
    acknowledger: Option<Arc<dyn Acknowledger>>,
}

impl Delivery {
    /// A delivery that needs no settlement (fire-and-forget transports).
    pub fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            acknowledger: None,
        }
    }

    pub fn with_acknowledger(envelope: Envelope, acknowledger: Arc<dyn Acknowledger>) -> Self {
        Self {
            envelope,
            acknowledger: Some(acknowledger),
        }
    }

    pub async fn ack(self) -> Result<()> {
        match self.acknowledger {
            Some(acknowledger) => acknowledger.ack().await,
            None => Ok(()),
        }
    }

    pub async fn nack(self) -> Result<()> {
        match self.acknowledger {
            Some(acknowledger) => acknowledger.nack().await,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("envelope", &self.envelope)
            .field("settleable", &self.acknowledger.is_some())
            .finish()
    }
}

/// A pub/sub transport for envelopes.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn publish(&self, envelope: &Envelope) -> Result<()>;

    async fn subscribe(&self) -> Result<Subscription>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Memory,
    Udp,
    File,
}

impl FromStr for TransportKind {
    type Err = MessagingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(TransportKind::Memory),
            "udp" => Ok(TransportKind::Udp),
            "file" | "filequeue" => Ok(TransportKind::File),
            other => Err(MessagingError::Configuration(format!(
                "Unknown transport '{}', expected memory, udp or file",
                other
            ))),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportKind::Memory => "memory",
            TransportKind::Udp => "udp",
            TransportKind::File => "file",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_kind_parses_case_insensitively() {
        assert_eq!("UDP".parse::<TransportKind>().unwrap(), TransportKind::Udp);
        assert_eq!(" file ".parse::<TransportKind>().unwrap(), TransportKind::File);
        assert_eq!(TransportKind::Memory.to_string(), "memory");
        assert!("kafka".parse::<TransportKind>().is_err());
    }
}
