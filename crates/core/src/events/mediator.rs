//! In-process mediator for integration events.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use super::IntegrationEvent;
use crate::errors::Result;

/// A local consumer of integration events (projection, notifier, ...).
#[async_trait]
pub trait IntegrationEventHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &IntegrationEvent) -> Result<()>;
}

/// Delivers every published event to all registered handlers.
///
/// Handlers run sequentially in registration order. A failing handler is
/// logged and does not prevent delivery to the remaining ones.
#[derive(Clone, Default)]
pub struct Mediator {
    handlers: Vec<Arc<dyn IntegrationEventHandler>>,
}

/// Outcome of a single [`Mediator::publish`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: Vec<String>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Mediator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn IntegrationEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn with_handler(mut self, handler: Arc<dyn IntegrationEventHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub async fn publish(&self, event: &IntegrationEvent) -> PublishReport {
        let mut report = PublishReport::default();
        for handler in &self.handlers {
            match handler.handle(event).await {
                Ok(()) => {
                    debug!(
                        "{} handled {} for policy {}",
                        handler.name(),
                        event.message_type(),
                        event.policy_number()
                    );
                    report.delivered += 1;
                }
                Err(e) => {
                    warn!(
                        "{} failed to handle {} for policy {}: {}",
                        handler.name(),
                        event.message_type(),
                        event.policy_number(),
                        e
                    );
                    report.failed.push(handler.name().to_string());
                }
            }
        }
        report
    }
}
