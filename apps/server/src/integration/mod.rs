//! Integration event plumbing between services.
//!
//! Outbound: the policy service emits into [`TransportEventSink`], whose worker
//! wraps events in envelopes and publishes them on the configured transport.
//! Inbound: a dispatcher feeds envelopes to [`MediatorEnvelopeHandler`], which
//! hands decoded events to the local projections and to the client hub.

mod consumer;
mod hub;
mod sink;
mod transport;

pub use consumer::MediatorEnvelopeHandler;
pub use hub::{EventBusChatBroadcaster, HubBroadcastHandler};
pub use sink::TransportEventSink;
pub use transport::build_transport;
