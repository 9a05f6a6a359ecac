//! Integration event sink trait and implementations.

use std::sync::{Arc, Mutex};

use super::IntegrationEvent;

/// Trait for receiving integration events.
///
/// Services emit events through this trait after successful mutations.
/// `emit()` must not block: implementations queue events for asynchronous
/// delivery and a failure to emit never fails the domain operation.
pub trait DomainEventSink: Send + Sync {
    /// Emit a single event.
    fn emit(&self, event: IntegrationEvent);

    /// Emit multiple events. Default implementation calls `emit()` for each event.
    fn emit_batch(&self, events: Vec<IntegrationEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

/// No-op implementation for contexts that don't publish events.
#[derive(Clone, Default)]
pub struct NoOpDomainEventSink;

impl DomainEventSink for NoOpDomainEventSink {
    fn emit(&self, _event: IntegrationEvent) {}
}

/// Mock sink for testing - collects emitted events.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    events: Arc<Mutex<Vec<IntegrationEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<IntegrationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: IntegrationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
