//! Event sink trait and implementations.

use super::FlowEvent;
use uuid::Uuid;

/// Receives flow events from the engine.
///
/// Emission is synchronous and must never fail; sinks that forward events
/// somewhere unreliable are expected to buffer or drop internally.
pub trait FlowEventSink: Send + Sync {
    /// Delivers one event, tagged with the emitting flow session.
    fn emit(&self, session_id: Uuid, event: &FlowEvent);
}

/// Sink that discards all events. The default when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl FlowEventSink for NoOpEventSink {
    fn emit(&self, _session_id: Uuid, _event: &FlowEvent) {}
}

/// Sink that logs events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl FlowEventSink for TracingEventSink {
    fn emit(&self, session_id: Uuid, event: &FlowEvent) {
        tracing::info!(
            session_id = %session_id,
            event = event.name(),
            detail = ?event,
            "flow event"
        );
    }
}

/// Sink that collects events in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<FlowEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<FlowEvent> {
        self.events.read().clone()
    }

    /// Number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Events whose kind name matches.
    #[must_use]
    pub fn of_kind(&self, name: &str) -> Vec<FlowEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.name() == name)
            .cloned()
            .collect()
    }

    /// Clears collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl FlowEventSink for CollectingEventSink {
    fn emit(&self, _session_id: Uuid, event: &FlowEvent) {
        self.events.write().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::GlobalStep;
    use crate::stages::StageId;

    #[test]
    fn test_noop_sink_accepts_everything() {
        let sink = NoOpEventSink;
        sink.emit(Uuid::new_v4(), &FlowEvent::FlowFinished);
    }

    #[test]
    fn test_collecting_sink_records_in_order() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        let session = Uuid::new_v4();
        sink.emit(
            session,
            &FlowEvent::StepAdvanced {
                from: GlobalStep::new(0, 1),
                to: GlobalStep::new(0, 2),
            },
        );
        sink.emit(
            session,
            &FlowEvent::RegistrationGap {
                stage_id: StageId::Product,
            },
        );

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.of_kind("registration_gap").len(), 1);
        assert_eq!(sink.of_kind("flow_finished").len(), 0);

        sink.clear();
        assert!(sink.is_empty());
    }
}
