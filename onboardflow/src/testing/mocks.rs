//! Mock controllers and collaborators for testing.

use crate::controller::{StageController, SubmitResult};
use crate::errors::{FlowError, FlowResult};
use crate::navigation::GlobalStep;
use crate::ports::{
    Notice, Notifier, PersistResult, PersistenceService, ProgressStore, RewardResponse,
    RewardService,
};
use crate::stages::StageId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// A stage controller with configurable answers and call tracking.
#[derive(Debug)]
pub struct MockController {
    can_advance: Mutex<bool>,
    can_retreat: Mutex<bool>,
    final_sub_step: Mutex<bool>,
    submit_result: Mutex<SubmitResult>,
    submit_delay: Mutex<Option<Duration>>,
    submit_calls: Mutex<usize>,
}

impl MockController {
    /// A controller that allows everything and is not on its final
    /// sub-step.
    #[must_use]
    pub fn new() -> Self {
        Self {
            can_advance: Mutex::new(true),
            can_retreat: Mutex::new(true),
            final_sub_step: Mutex::new(false),
            submit_result: Mutex::new(SubmitResult::ok()),
            submit_delay: Mutex::new(None),
            submit_calls: Mutex::new(0),
        }
    }

    /// A controller positioned on its final sub-step with a succeeding
    /// submission.
    #[must_use]
    pub fn final_step() -> Self {
        let controller = Self::new();
        controller.set_final_sub_step(true);
        controller
    }

    /// A controller that blocks forward navigation.
    #[must_use]
    pub fn blocking() -> Self {
        let controller = Self::new();
        controller.set_can_advance(false);
        controller
    }

    /// Sets the `can_advance` answer.
    pub fn set_can_advance(&self, value: bool) {
        *self.can_advance.lock() = value;
    }

    /// Sets the `can_retreat` answer.
    pub fn set_can_retreat(&self, value: bool) {
        *self.can_retreat.lock() = value;
    }

    /// Sets the `is_final_sub_step` answer.
    pub fn set_final_sub_step(&self, value: bool) {
        *self.final_sub_step.lock() = value;
    }

    /// Sets the result every `submit` call resolves with.
    pub fn set_submit_result(&self, result: SubmitResult) {
        *self.submit_result.lock() = result;
    }

    /// Makes `submit` suspend for a duration before resolving.
    pub fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.lock() = Some(delay);
    }

    /// Number of times `submit` was invoked.
    #[must_use]
    pub fn submit_calls(&self) -> usize {
        *self.submit_calls.lock()
    }
}

impl Default for MockController {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StageController for MockController {
    fn can_advance(&self) -> bool {
        *self.can_advance.lock()
    }

    fn can_retreat(&self) -> bool {
        *self.can_retreat.lock()
    }

    fn is_final_sub_step(&self) -> bool {
        *self.final_sub_step.lock()
    }

    async fn submit(&self) -> SubmitResult {
        *self.submit_calls.lock() += 1;
        let delay = *self.submit_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.submit_result.lock().clone()
    }
}

/// Reward service with a configurable response and call recording.
#[derive(Debug)]
pub struct MockRewardService {
    response: Mutex<RewardResponse>,
    calls: Mutex<Vec<(String, StageId)>>,
}

impl MockRewardService {
    /// A service that grants every request with the stage default.
    #[must_use]
    pub fn granting() -> Self {
        Self {
            response: Mutex::new(RewardResponse::granted()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes subsequent requests grant an explicit amount.
    pub fn grant_points(&self, points: u32) {
        *self.response.lock() = RewardResponse::granted_points(points);
    }

    /// Makes subsequent requests fail.
    pub fn fail_with(&self, error: impl Into<String>) {
        *self.response.lock() = RewardResponse::failed(error);
    }

    /// Number of reward requests received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// The recorded `(user_id, stage_id)` pairs.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, StageId)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RewardService for MockRewardService {
    async fn complete_stage(&self, user_id: &str, stage_id: StageId) -> RewardResponse {
        self.calls.lock().push((user_id.to_string(), stage_id));
        self.response.lock().clone()
    }
}

/// Notifier that collects notices in memory.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    /// Creates an empty collecting notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected notices in delivery order.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Number of collected notices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    /// Returns true if nothing was delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Progress store backed by memory, with an optional failure switch.
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    step: Mutex<Option<GlobalStep>>,
    failing: Mutex<bool>,
    save_count: Mutex<usize>,
}

impl InMemoryProgressStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with a saved position.
    #[must_use]
    pub fn with_saved(step: GlobalStep) -> Self {
        Self {
            step: Mutex::new(Some(step)),
            failing: Mutex::new(false),
            save_count: Mutex::new(0),
        }
    }

    /// Makes every load and save fail.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    /// The currently stored position.
    #[must_use]
    pub fn saved(&self) -> Option<GlobalStep> {
        *self.step.lock()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.save_count.lock()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn load(&self) -> FlowResult<Option<GlobalStep>> {
        if *self.failing.lock() {
            return Err(FlowError::Progress("store offline".to_string()));
        }
        Ok(*self.step.lock())
    }

    async fn save(&self, step: GlobalStep) -> FlowResult<()> {
        if *self.failing.lock() {
            return Err(FlowError::Progress("store offline".to_string()));
        }
        *self.step.lock() = Some(step);
        *self.save_count.lock() += 1;
        Ok(())
    }
}

/// Persistence collaborator backed by memory, for stage controller tests.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    entities: Mutex<HashMap<String, Vec<serde_json::Value>>>,
}

impl InMemoryPersistence {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored entities of a kind.
    #[must_use]
    pub fn entities_of(&self, entity_kind: &str) -> Vec<serde_json::Value> {
        self.entities
            .lock()
            .get(entity_kind)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl PersistenceService for InMemoryPersistence {
    async fn create_or_update(
        &self,
        entity_kind: &str,
        payload: serde_json::Value,
    ) -> PersistResult {
        self.entities
            .lock()
            .entry(entity_kind.to_string())
            .or_default()
            .push(payload.clone());
        PersistResult::ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_controller_tracks_submits() {
        let controller = MockController::final_step();
        assert!(controller.is_final_sub_step());
        assert_eq!(controller.submit_calls(), 0);

        let result = controller.submit().await;
        assert!(result.is_success());
        assert_eq!(controller.submit_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_reward_service_records_calls() {
        let service = MockRewardService::granting();
        service.complete_stage("u1", StageId::Product).await;
        service.fail_with("down");
        let response = service.complete_stage("u1", StageId::Notes).await;

        assert!(!response.success);
        assert_eq!(service.call_count(), 2);
        assert_eq!(service.calls()[0].1, StageId::Product);
    }

    #[tokio::test]
    async fn test_in_memory_progress_store_round_trip() {
        let store = InMemoryProgressStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save(GlobalStep::new(3, 2)).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(GlobalStep::new(3, 2)));
        assert_eq!(store.save_count(), 1);

        store.set_failing(true);
        assert!(store.load().await.is_err());
        assert!(store.save(GlobalStep::START).await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_persistence() {
        let store = InMemoryPersistence::new();
        let result = store
            .create_or_update("product", serde_json::json!({"name": "Widget"}))
            .await;
        assert!(result.success);
        assert_eq!(store.entities_of("product").len(), 1);
        assert!(store.entities_of("note").is_empty());
    }
}
