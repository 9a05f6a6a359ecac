//! Transport selection from configuration.

use std::sync::Arc;

use policyhub_messaging::{
    FileQueueConfig, FileQueueTransport, InMemoryBus, Transport, TransportKind, UdpTransport,
};

use crate::config::Config;

pub async fn build_transport(config: &Config) -> anyhow::Result<Arc<dyn Transport>> {
    let transport: Arc<dyn Transport> = match config.transport {
        TransportKind::Memory => Arc::new(InMemoryBus::default()),
        TransportKind::Udp => {
            if config.udp_peers.is_empty() {
                tracing::warn!("PH_UDP_PEERS is empty, published events reach no one");
            }
            let udp = UdpTransport::bind(config.udp_bind, config.udp_peers.clone()).await?;
            tracing::info!(
                "UDP transport bound to {} with {} peer(s)",
                udp.local_addr()?,
                config.udp_peers.len()
            );
            Arc::new(udp)
        }
        TransportKind::File => {
            let mut queue = FileQueueConfig::new(&config.queue_root, &config.queue_name);
            queue.destinations = config.queue_destinations.clone();
            queue.max_retries = config.queue_max_retries;
            queue.poll_interval = config.queue_poll_interval;
            let file = FileQueueTransport::open(queue).await?;
            tracing::info!(
                "File queue transport reading {}",
                file.queue_dir().display()
            );
            Arc::new(file)
        }
    };
    Ok(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_transport_creates_queue_directories() {
        let root = tempfile::tempdir().unwrap();
        let config = Config {
            transport: TransportKind::File,
            queue_root: root.path().to_path_buf(),
            queue_name: "dashboard".to_string(),
            ..Config::default()
        };

        let transport = build_transport(&config).await.unwrap();
        assert_eq!(transport.name(), "file");
        assert!(root.path().join("dashboard").join(".error").is_dir());
    }

    #[tokio::test]
    async fn udp_transport_binds_ephemeral_port() {
        let config = Config {
            transport: TransportKind::Udp,
            udp_bind: "127.0.0.1:0".parse().unwrap(),
            ..Config::default()
        };
        let transport = build_transport(&config).await.unwrap();
        assert_eq!(transport.name(), "udp");
    }
}
