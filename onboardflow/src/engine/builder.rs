//! Builder wiring the engine to its collaborators.

use super::TransitionEngine;
use crate::celebration::CelebrationStateMachine;
use crate::completion::{CompletionCoordinator, CompletionLog, RewardLedger};
use crate::controller::ControllerRegistry;
use crate::events::{FlowEventSink, NoOpEventSink};
use crate::ports::{GrantDefaultRewards, NoOpNotifier, Notifier, ProgressStore, RewardService};
use crate::stages::StageTable;
use std::sync::Arc;

/// Builds a [`TransitionEngine`] with explicit collaborators.
///
/// Every collaborator has a local default so a flow can run entirely in
/// memory: the onboarding stage table, a fresh registry, default-granting
/// rewards, and discarding notifier/event sinks.
pub struct EngineBuilder {
    table: Arc<StageTable>,
    registry: Arc<ControllerRegistry>,
    rewards: Arc<dyn RewardService>,
    notifier: Arc<dyn Notifier>,
    progress_store: Option<Arc<dyn ProgressStore>>,
    events: Arc<dyn FlowEventSink>,
    user_id: String,
    confirmed_points: u64,
}

impl EngineBuilder {
    /// Creates a builder with the default onboarding flow and in-memory
    /// collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::new(StageTable::onboarding()),
            registry: Arc::new(ControllerRegistry::new()),
            rewards: Arc::new(GrantDefaultRewards),
            notifier: Arc::new(NoOpNotifier),
            progress_store: None,
            events: Arc::new(NoOpEventSink),
            user_id: "local".to_string(),
            confirmed_points: 0,
        }
    }

    /// Uses a custom stage table.
    #[must_use]
    pub fn with_table(mut self, table: StageTable) -> Self {
        self.table = Arc::new(table);
        self
    }

    /// Shares an existing controller registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ControllerRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the reward collaborator.
    #[must_use]
    pub fn with_reward_service(mut self, rewards: Arc<dyn RewardService>) -> Self {
        self.rewards = rewards;
        self
    }

    /// Sets the notification collaborator.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Sets the progress store used for resume and save.
    #[must_use]
    pub fn with_progress_store(mut self, store: Arc<dyn ProgressStore>) -> Self {
        self.progress_store = Some(store);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn FlowEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Sets the user the reward collaborator is called for.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Seeds the reward ledger with points already confirmed durable, for
    /// resumed flows.
    #[must_use]
    pub fn with_confirmed_points(mut self, points: u64) -> Self {
        self.confirmed_points = points;
        self
    }

    /// Assembles the engine.
    #[must_use]
    pub fn build(self) -> TransitionEngine {
        let celebration = Arc::new(CelebrationStateMachine::new());
        let log = Arc::new(CompletionLog::new());
        let ledger = Arc::new(RewardLedger::with_confirmed(self.confirmed_points));
        let coordinator = CompletionCoordinator::new(
            Arc::clone(&log),
            Arc::clone(&ledger),
            Arc::clone(&self.rewards),
            Arc::clone(&self.notifier),
            Arc::clone(&celebration),
            Arc::clone(&self.events),
            self.user_id,
        );
        TransitionEngine::assemble(
            self.table,
            self.registry,
            celebration,
            log,
            ledger,
            coordinator,
            self.progress_store,
            self.notifier,
            self.events,
        )
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::GlobalStep;
    use crate::stages::StageId;

    #[test]
    fn test_defaults() {
        let engine = EngineBuilder::new().build();
        assert_eq!(engine.current_step(), GlobalStep::START);
        assert_eq!(engine.current_stage_id(), StageId::Introduction);
        assert_eq!(engine.table().len(), 10);
        assert!(engine.completion_log().is_empty());
        assert_eq!(engine.reward_ledger().total(), 0);
    }

    #[test]
    fn test_seeded_ledger() {
        let engine = EngineBuilder::new().with_confirmed_points(150).build();
        assert_eq!(engine.reward_ledger().confirmed_total(), 150);
    }

    #[test]
    fn test_shared_registry() {
        let registry = Arc::new(ControllerRegistry::new());
        let engine = EngineBuilder::new()
            .with_registry(Arc::clone(&registry))
            .build();
        assert!(Arc::ptr_eq(engine.registry(), &registry));
    }
}
