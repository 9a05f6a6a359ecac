//! Messaging layer for PolicyHub integration events.
//!
//! Events travel between processes wrapped in an [`Envelope`]. A
//! [`Transport`] moves envelopes; three interchangeable implementations are
//! provided and selected at start-up through [`TransportKind`]:
//!
//! - [`InMemoryBus`]: broadcast channel, single process
//! - [`UdpTransport`]: one JSON datagram per envelope and peer
//! - [`FileQueueTransport`]: durable directory queues with retry and an error folder
//!
//! The [`Dispatcher`] drives a subscription, hands each envelope to an
//! [`EnvelopeHandler`] and re-subscribes with backoff when the transport fails.

pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod file_queue;
pub mod memory;
pub mod transport;
pub mod udp;

pub use dispatcher::{Dispatcher, DispatcherConfig, EnvelopeHandler};
pub use envelope::Envelope;
pub use error::{MessagingError, Result};
pub use file_queue::{FileQueueConfig, FileQueueTransport};
pub use memory::InMemoryBus;
pub use transport::{Acknowledger, Delivery, Subscription, Transport, TransportKind};
pub use udp::UdpTransport;
