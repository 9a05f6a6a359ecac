//! Envelope transport over plain UDP datagrams.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::net::UdpSocket;

use crate::envelope::Envelope;
use crate::error::{MessagingError, Result};
use crate::transport::{Delivery, Subscription, Transport};

/// Largest UDP payload over IPv4.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Sends each envelope as one JSON datagram to every peer and receives on a
/// bound local socket. Delivery is best effort: no acknowledgement, no
/// ordering, no retransmission.
///
/// The receiving socket is shared, so concurrent subscriptions split the
/// incoming datagrams between them.
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    peers: Vec<SocketAddr>,
}

impl UdpTransport {
    pub async fn bind(local: SocketAddr, peers: Vec<SocketAddr>) -> Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        debug!(
            "UDP transport bound to {} with {} peer(s)",
            socket.local_addr()?,
            peers.len()
        );
        Ok(Self {
            socket: Arc::new(socket),
            peers,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    fn name(&self) -> &'static str {
        "udp"
    }

    async fn publish(&self, envelope: &Envelope) -> Result<()> {
        let bytes = envelope.to_bytes()?;
        if bytes.len() > MAX_DATAGRAM_SIZE {
            return Err(MessagingError::MessageTooLarge {
                size: bytes.len(),
                max: MAX_DATAGRAM_SIZE,
            });
        }
        for peer in &self.peers {
            self.socket.send_to(&bytes, peer).await?;
        }
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription> {
        let socket = self.socket.clone();
        let stream = futures::stream::unfold(socket, |socket| async move {
            let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((len, from)) => match Envelope::from_bytes(&buf[..len]) {
                        Ok(envelope) => return Some((Ok(Delivery::new(envelope)), socket)),
                        Err(e) => {
                            warn!("Discarding undecodable datagram from {}: {}", from, e);
                        }
                    },
                    Err(e) => return Some((Err(MessagingError::Io(e)), socket)),
                }
            }
        });
        Ok(Box::pin(stream))
    }
}
