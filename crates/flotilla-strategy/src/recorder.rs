//! Event recording: one human-readable event per completed step.
//!
//! Recording is fire-and-forget: a recorder never reports failure back to
//! the executor.

use std::sync::Mutex;

use tracing::{info, warn};

use flotilla_core::ObjectKey;

/// Reason attached to events emitted when a step completes.
pub const STRATEGY_APPLIED: &str = "StrategyApplied";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Normal,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub object: ObjectKey,
    pub event_type: EventType,
    pub reason: String,
    pub message: String,
}

impl Event {
    pub fn normal(object: ObjectKey, reason: &str, message: String) -> Self {
        Self {
            object,
            event_type: EventType::Normal,
            reason: reason.to_string(),
            message,
        }
    }
}

pub trait EventRecorder {
    fn record(&self, event: Event);
}

/// Writes events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRecorder;

impl EventRecorder for TracingRecorder {
    fn record(&self, event: Event) {
        match event.event_type {
            EventType::Normal => info!(
                object = %event.object,
                event_reason = %event.reason,
                "{}", event.message
            ),
            EventType::Warning => warn!(
                object = %event.object,
                event_reason = %event.reason,
                "{}", event.message
            ),
        }
    }
}

/// Keeps events in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<Event>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl EventRecorder for MemoryRecorder {
    fn record(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
