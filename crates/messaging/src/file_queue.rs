//! Durable queues backed by a shared directory.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<queue>/<timestamp>-<id>.json   pending messages, oldest first
//! <root>/<queue>/.error/                 messages that exhausted their retries
//! ```

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::fs;

use crate::envelope::Envelope;
use crate::error::{MessagingError, Result};
use crate::transport::{Acknowledger, Delivery, Subscription, Transport};

const ERROR_DIR: &str = ".error";
const MESSAGE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

#[derive(Debug, Clone)]
pub struct FileQueueConfig {
    pub root: PathBuf,
    /// Queue this endpoint consumes.
    pub queue: String,
    /// Queues every published envelope is written to.
    pub destinations: Vec<String>,
    pub poll_interval: Duration,
    /// Failed deliveries before a message is moved to `.error`.
    pub max_retries: u32,
}

impl FileQueueConfig {
    pub fn new(root: impl Into<PathBuf>, queue: &str) -> Self {
        Self {
            root: root.into(),
            queue: queue.to_string(),
            destinations: Vec::new(),
            poll_interval: Duration::from_millis(250),
            max_retries: 5,
        }
    }

    pub fn with_destinations(mut self, destinations: &[&str]) -> Self {
        self.destinations = destinations.iter().map(|d| d.to_string()).collect();
        self
    }
}

type RetryCounts = Arc<Mutex<HashMap<PathBuf, u32>>>;

pub struct FileQueueTransport {
    config: FileQueueConfig,
    retries: RetryCounts,
}

impl FileQueueTransport {
    /// Creates the consumed queue directory and its error folder.
    pub async fn open(config: FileQueueConfig) -> Result<Self> {
        if config.queue.trim().is_empty() {
            return Err(MessagingError::Configuration(
                "File queue name must not be empty".to_string(),
            ));
        }
        fs::create_dir_all(config.root.join(&config.queue).join(ERROR_DIR)).await?;
        Ok(Self {
            config,
            retries: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn queue_dir(&self) -> PathBuf {
        self.config.root.join(&self.config.queue)
    }

    pub fn error_dir(&self) -> PathBuf {
        self.queue_dir().join(ERROR_DIR)
    }
}

fn message_file_name(envelope: &Envelope) -> String {
    // Zero padded so lexical order is publish order.
    format!(
        "{:020}-{}.{}",
        envelope.published_at.timestamp_micros().max(0),
        envelope.id,
        MESSAGE_EXTENSION
    )
}

async fn write_atomically(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<()> {
    fs::create_dir_all(dir).await?;
    let temp = dir.join(format!("{}.{}", file_name, TEMP_EXTENSION));
    fs::write(&temp, bytes).await?;
    fs::rename(&temp, dir.join(file_name)).await?;
    Ok(())
}

/// Pending message files in `dir`, oldest first.
async fn scan(dir: &Path) -> Result<VecDeque<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_message = path.extension().is_some_and(|ext| ext == MESSAGE_EXTENSION);
        if is_message && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into())
}

async fn quarantine(path: &Path, error_dir: &Path) -> Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid message path {}", path.display()),
        )
    })?;
    fs::create_dir_all(error_dir).await?;
    fs::rename(path, error_dir.join(file_name)).await?;
    Ok(())
}

#[async_trait]
impl Transport for FileQueueTransport {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn publish(&self, envelope: &Envelope) -> Result<()> {
        let bytes = envelope.to_bytes()?;
        let file_name = message_file_name(envelope);
        for destination in &self.config.destinations {
            write_atomically(&self.config.root.join(destination), &file_name, &bytes).await?;
            debug!("{} queued for {}", envelope.id, destination);
        }
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription> {
        let reader = QueueReader {
            dir: self.queue_dir(),
            error_dir: self.error_dir(),
            pending: VecDeque::new(),
            poll_interval: self.config.poll_interval,
            max_retries: self.config.max_retries,
            retries: self.retries.clone(),
            scanned_once: false,
        };
        let stream = futures::stream::unfold(reader, |mut reader| async move {
            let item = reader.next_delivery().await;
            Some((item, reader))
        });
        Ok(Box::pin(stream))
    }
}

struct QueueReader {
    dir: PathBuf,
    error_dir: PathBuf,
    pending: VecDeque<PathBuf>,
    poll_interval: Duration,
    max_retries: u32,
    retries: RetryCounts,
    scanned_once: bool,
}

impl QueueReader {
    async fn next_delivery(&mut self) -> Result<Delivery> {
        loop {
            while let Some(path) = self.pending.pop_front() {
                let bytes = match fs::read(&path).await {
                    Ok(bytes) => bytes,
                    // Settled by an earlier delivery
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(e) => return Err(e.into()),
                };
                match Envelope::from_bytes(&bytes) {
                    Ok(envelope) => {
                        let acknowledger = FileAcknowledger {
                            path,
                            error_dir: self.error_dir.clone(),
                            max_retries: self.max_retries,
                            retries: self.retries.clone(),
                        };
                        return Ok(Delivery::with_acknowledger(envelope, Arc::new(acknowledger)));
                    }
                    Err(e) => {
                        warn!("Moving undecodable message {} to error queue: {}", path.display(), e);
                        quarantine(&path, &self.error_dir).await?;
                    }
                }
            }

            if self.scanned_once {
                tokio::time::sleep(self.poll_interval).await;
            }
            self.scanned_once = true;
            self.pending = scan(&self.dir).await?;
        }
    }
}

struct FileAcknowledger {
    path: PathBuf,
    error_dir: PathBuf,
    max_retries: u32,
    retries: RetryCounts,
}

impl FileAcknowledger {
    fn forget(&self) {
        if let Ok(mut retries) = self.retries.lock() {
            retries.remove(&self.path);
        }
    }

    fn record_failure(&self) -> Result<u32> {
        let mut retries = self
            .retries
            .lock()
            .map_err(|_| MessagingError::Closed("Retry table poisoned".to_string()))?;
        let count = retries.entry(self.path.clone()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}

#[async_trait]
impl Acknowledger for FileAcknowledger {
    async fn ack(&self) -> Result<()> {
        self.forget();
        match fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn nack(&self) -> Result<()> {
        let failures = self.record_failure()?;
        if failures >= self.max_retries {
            self.forget();
            quarantine(&self.path, &self.error_dir).await?;
            info!(
                "Message {} moved to error queue after {} failed deliveries",
                self.path.display(),
                failures
            );
        } else {
            debug!(
                "Message {} will be retried ({}/{})",
                self.path.display(),
                failures,
                self.max_retries
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;
    use tempfile::TempDir;

    async fn transport(root: &Path, queue: &str, destinations: &[&str], max_retries: u32) -> FileQueueTransport {
        let mut config = FileQueueConfig::new(root, queue).with_destinations(destinations);
        config.poll_interval = Duration::from_millis(10);
        config.max_retries = max_retries;
        FileQueueTransport::open(config).await.unwrap()
    }

    async fn next(subscription: &mut Subscription) -> Delivery {
        tokio::time::timeout(Duration::from_secs(5), subscription.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap()
    }

    async fn count_files(dir: &Path) -> usize {
        scan(dir).await.unwrap().len()
    }

    #[tokio::test]
    async fn messages_are_delivered_in_order_and_deleted_on_ack() {
        let root = TempDir::new().unwrap();
        let consumer = transport(root.path(), "dashboard", &[], 3).await;
        let producer = transport(root.path(), "policy", &["dashboard", "search"], 3).await;

        for n in 0..3 {
            let mut envelope = Envelope::new("PolicyCreated", "policy", json!({ "n": n }));
            envelope.published_at += chrono::Duration::milliseconds(n);
            producer.publish(&envelope).await.unwrap();
        }
        assert_eq!(count_files(&root.path().join("search")).await, 3);

        let mut subscription = consumer.subscribe().await.unwrap();
        for n in 0..3 {
            let delivery = next(&mut subscription).await;
            assert_eq!(delivery.envelope.payload["n"], n);
            delivery.ack().await.unwrap();
        }
        assert_eq!(count_files(&consumer.queue_dir()).await, 0);
    }

    #[tokio::test]
    async fn failing_message_moves_to_error_after_max_retries() {
        let root = TempDir::new().unwrap();
        let consumer = transport(root.path(), "payments", &[], 2).await;
        let producer = transport(root.path(), "policy", &["payments"], 2).await;
        producer
            .publish(&Envelope::new("PolicyCreated", "policy", json!({})))
            .await
            .unwrap();

        let mut subscription = consumer.subscribe().await.unwrap();
        next(&mut subscription).await.nack().await.unwrap();
        assert_eq!(count_files(&consumer.queue_dir()).await, 1);

        next(&mut subscription).await.nack().await.unwrap();
        assert_eq!(count_files(&consumer.queue_dir()).await, 0);
        assert_eq!(count_files(&consumer.error_dir()).await, 1);
    }

    #[tokio::test]
    async fn pending_messages_survive_a_new_transport() {
        let root = TempDir::new().unwrap();
        let producer = transport(root.path(), "policy", &["chat"], 3).await;
        producer
            .publish(&Envelope::new("PolicyCreated", "policy", json!({"n": 7})))
            .await
            .unwrap();

        {
            let consumer = transport(root.path(), "chat", &[], 3).await;
            let mut subscription = consumer.subscribe().await.unwrap();
            next(&mut subscription).await.nack().await.unwrap();
        }

        let restarted = transport(root.path(), "chat", &[], 3).await;
        let mut subscription = restarted.subscribe().await.unwrap();
        let delivery = next(&mut subscription).await;
        assert_eq!(delivery.envelope.payload["n"], 7);
    }

    #[tokio::test]
    async fn undecodable_files_are_quarantined() {
        let root = TempDir::new().unwrap();
        let consumer = transport(root.path(), "search", &[], 3).await;
        fs::write(consumer.queue_dir().join("00000000000000000001-bad.json"), b"nope")
            .await
            .unwrap();
        let producer = transport(root.path(), "policy", &["search"], 3).await;
        producer
            .publish(&Envelope::new("PolicyCreated", "policy", json!({"ok": true})))
            .await
            .unwrap();

        let mut subscription = consumer.subscribe().await.unwrap();
        let delivery = next(&mut subscription).await;
        assert_eq!(delivery.envelope.payload["ok"], true);
        assert_eq!(count_files(&consumer.error_dir()).await, 1);
    }

    #[tokio::test]
    async fn empty_queue_name_is_rejected() {
        let root = TempDir::new().unwrap();
        let result = FileQueueTransport::open(FileQueueConfig::new(root.path(), " ")).await;
        assert!(matches!(result, Err(MessagingError::Configuration(_))));
    }
}
