//! Pre-wired flow fixture for engine tests.

use super::mocks::{CollectingNotifier, InMemoryProgressStore, MockController, MockRewardService};
use crate::controller::{ControllerRegistry, StageController};
use crate::engine::{EngineBuilder, TransitionEngine};
use crate::events::{CollectingEventSink, FlowEventSink};
use crate::navigation::GlobalStep;
use crate::ports::{Notifier, ProgressStore, RewardService};
use crate::stages::{StageId, StageTable};
use std::sync::Arc;

/// A [`TransitionEngine`] wired to in-memory mocks, with every
/// collaborator kept reachable for assertions.
pub struct TestFlow {
    /// The engine under test.
    pub engine: TransitionEngine,
    /// Shared controller registry.
    pub registry: Arc<ControllerRegistry>,
    /// Recording reward collaborator.
    pub rewards: Arc<MockRewardService>,
    /// Collecting notifier.
    pub notifier: Arc<CollectingNotifier>,
    /// Collecting event sink.
    pub events: Arc<CollectingEventSink>,
    /// In-memory progress store.
    pub progress: Arc<InMemoryProgressStore>,
}

impl TestFlow {
    /// A flow over the default onboarding table with no controllers
    /// registered yet.
    #[must_use]
    pub fn new() -> Self {
        Self::with_table(StageTable::onboarding())
    }

    /// A flow over a custom stage table.
    #[must_use]
    pub fn with_table(table: StageTable) -> Self {
        let registry = Arc::new(ControllerRegistry::new());
        let rewards = Arc::new(MockRewardService::granting());
        let notifier = Arc::new(CollectingNotifier::new());
        let events = Arc::new(CollectingEventSink::new());
        let progress = Arc::new(InMemoryProgressStore::new());
        // Coerce each mock to its trait object up front; `Arc::clone` at
        // the call sites would infer the trait object type and mismatch.
        let rewards_dyn: Arc<dyn RewardService> = rewards.clone();
        let notifier_dyn: Arc<dyn Notifier> = notifier.clone();
        let events_dyn: Arc<dyn FlowEventSink> = events.clone();
        let progress_dyn: Arc<dyn ProgressStore> = progress.clone();
        let engine = EngineBuilder::new()
            .with_table(table)
            .with_registry(Arc::clone(&registry))
            .with_reward_service(rewards_dyn)
            .with_notifier(notifier_dyn)
            .with_event_sink(events_dyn)
            .with_progress_store(progress_dyn)
            .with_user_id("tester")
            .build();
        Self {
            engine,
            registry,
            rewards,
            notifier,
            events,
            progress,
        }
    }

    /// Registers a fresh permissive controller for a stage and returns it.
    pub fn register(&self, stage_id: StageId) -> Arc<MockController> {
        let controller = Arc::new(MockController::new());
        let handle: Arc<dyn StageController> = controller.clone();
        self.registry.register(stage_id, handle);
        controller
    }

    /// Registers a controller already on its final sub-step.
    pub fn register_final(&self, stage_id: StageId) -> Arc<MockController> {
        let controller = Arc::new(MockController::final_step());
        let handle: Arc<dyn StageController> = controller.clone();
        self.registry.register(stage_id, handle);
        controller
    }

    /// Restores the flow to a position, as a resumed session would.
    pub async fn start_at(&self, step: GlobalStep) {
        self.progress
            .save(step)
            .await
            .unwrap_or_else(|_| unreachable!("in-memory store does not fail"));
        self.engine.resume().await;
    }

    /// Names of every event emitted so far, in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.events().iter().map(|e| e.name()).collect()
    }
}

impl Default for TestFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NextOutcome;

    #[tokio::test]
    async fn test_fixture_starts_at_flow_start() {
        let flow = TestFlow::new();
        assert_eq!(flow.engine.current_step(), GlobalStep::START);
        assert!(flow.notifier.is_empty());
        assert!(flow.events.is_empty());
    }

    #[tokio::test]
    async fn test_start_at_restores_position() {
        let flow = TestFlow::new();
        flow.start_at(GlobalStep::new(4, 3)).await;
        assert_eq!(flow.engine.current_step(), GlobalStep::new(4, 3));
    }

    #[tokio::test]
    async fn test_engine_shares_the_fixture_collaborators() {
        let flow = TestFlow::new();
        flow.register_final(StageId::Introduction);
        flow.start_at(GlobalStep::new(0, 4)).await;

        flow.engine.request_next().await;

        // The handles the engine holds are the very instances the fixture
        // exposes, so every collaborator sees the traffic.
        assert_eq!(flow.rewards.call_count(), 1);
        assert!(flow.event_names().contains(&"stage_completed"));
        assert_eq!(flow.progress.saved(), Some(GlobalStep::new(0, 4)));
        assert!(Arc::ptr_eq(flow.engine.registry(), &flow.registry));
    }

    #[tokio::test]
    async fn test_registered_controller_drives_navigation() {
        let flow = TestFlow::new();
        let controller = flow.register(StageId::Introduction);
        controller.set_can_advance(false);

        match flow.engine.request_next().await {
            NextOutcome::Rejected(_) => {}
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
