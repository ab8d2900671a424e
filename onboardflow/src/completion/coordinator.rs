//! Orchestrates the sequence behind a stage's final submission.
//!
//! Per attempt: submit → record completion (rewarding at most once) →
//! show the celebration. Advancing the navigation position is not this
//! component's job; that happens only when the celebration is dismissed.

use super::{CompletionLog, CompletionRecord, RewardLedger};
use crate::celebration::{Celebration, CelebrationStateMachine};
use crate::controller::StageController;
use crate::events::{FlowEvent, FlowEventSink};
use crate::ports::{Notice, Notifier, RewardService};
use crate::stages::StageDefinition;
use std::sync::Arc;
use uuid::Uuid;

/// Result of one completion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The stage completed; the celebration overlay is now showing.
    Completed {
        /// Points attached to the completion.
        reward_points: u32,
        /// Whether the reward collaborator granted the points.
        reward_awarded: bool,
    },
    /// Submission failed; position unchanged, retryable.
    SubmitFailed {
        /// Failure message surfaced to the user.
        message: String,
    },
}

/// Sequences persist → reward → celebrate for stage completions.
pub struct CompletionCoordinator {
    log: Arc<CompletionLog>,
    ledger: Arc<RewardLedger>,
    rewards: Arc<dyn RewardService>,
    notifier: Arc<dyn Notifier>,
    celebration: Arc<CelebrationStateMachine>,
    events: Arc<dyn FlowEventSink>,
    user_id: String,
}

impl CompletionCoordinator {
    /// Creates a coordinator over shared flow state and collaborators.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        log: Arc<CompletionLog>,
        ledger: Arc<RewardLedger>,
        rewards: Arc<dyn RewardService>,
        notifier: Arc<dyn Notifier>,
        celebration: Arc<CelebrationStateMachine>,
        events: Arc<dyn FlowEventSink>,
        user_id: String,
    ) -> Self {
        Self {
            log,
            ledger,
            rewards,
            notifier,
            celebration,
            events,
            user_id,
        }
    }

    /// Runs one completion attempt for the active stage.
    ///
    /// The completion record is created before the celebration shows, and
    /// the celebration shows synchronously before this returns; there is no
    /// secondary trigger.
    pub async fn complete_stage(
        &self,
        session_id: Uuid,
        definition: &StageDefinition,
        controller: &Arc<dyn StageController>,
    ) -> CompletionOutcome {
        let stage_id = definition.id;

        let submitted = controller.submit().await;
        if !submitted.is_success() {
            let message = submitted
                .message
                .unwrap_or_else(|| "Please check the form for errors and try again.".to_string());
            tracing::warn!(stage = %stage_id, %message, "stage submission failed");
            self.notifier
                .notify(Notice::destructive("Submission failed", message.clone()));
            self.events.emit(
                session_id,
                &FlowEvent::SubmitFailed {
                    stage_id,
                    message: message.clone(),
                },
            );
            return CompletionOutcome::SubmitFailed { message };
        }

        let (reward_points, reward_awarded) = match self.log.get(stage_id) {
            // Re-submission of a completed stage: reward stays untouched.
            Some(existing) => (existing.reward_points, existing.reward_awarded),
            None => self.record_first_completion(session_id, definition).await,
        };

        self.celebration.show(Celebration {
            stage_id,
            reward_points,
            message: format!("{} complete!", definition.title),
        });
        self.events
            .emit(session_id, &FlowEvent::CelebrationShown { stage_id });
        self.events.emit(
            session_id,
            &FlowEvent::StageCompleted {
                stage_id,
                reward_awarded,
                reward_points,
            },
        );
        tracing::info!(stage = %stage_id, reward_points, "stage completed");

        CompletionOutcome::Completed {
            reward_points,
            reward_awarded,
        }
    }

    /// First successful completion for a stage: request the reward and
    /// create the record. The running total is updated optimistically and
    /// reconciled once the collaborator answers.
    async fn record_first_completion(
        &self,
        session_id: Uuid,
        definition: &StageDefinition,
    ) -> (u32, bool) {
        let stage_id = definition.id;
        self.ledger
            .apply_provisional(stage_id, definition.reward_points);

        let response = self.rewards.complete_stage(&self.user_id, stage_id).await;
        if response.success {
            let points = response.reward_awarded.unwrap_or(definition.reward_points);
            self.ledger.confirm(stage_id, points);
            self.log.insert(CompletionRecord::rewarded(stage_id, points));
            self.events
                .emit(session_id, &FlowEvent::RewardGranted { stage_id, points });
            (points, true)
        } else {
            // Non-fatal: the stage is complete, only the bonus is withheld.
            let message = response
                .error
                .unwrap_or_else(|| "reward service unavailable".to_string());
            self.ledger.rollback(stage_id);
            self.log.insert(CompletionRecord::unrewarded(stage_id));
            tracing::warn!(stage = %stage_id, %message, "reward request failed");
            self.notifier.notify(Notice::warning(
                "Reward unavailable",
                "Your progress was saved, but the reward could not be granted.",
            ));
            self.events
                .emit(session_id, &FlowEvent::RewardFailed { stage_id, message });
            (0, false)
        }
    }
}

impl std::fmt::Debug for CompletionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionCoordinator")
            .field("user_id", &self.user_id)
            .field("completed", &self.log.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::ports::NoticeVariant;
    use crate::stages::{StageId, StageTable};
    use crate::testing::{CollectingNotifier, MockController, MockRewardService};

    struct Harness {
        coordinator: CompletionCoordinator,
        log: Arc<CompletionLog>,
        ledger: Arc<RewardLedger>,
        rewards: Arc<MockRewardService>,
        notifier: Arc<CollectingNotifier>,
        celebration: Arc<CelebrationStateMachine>,
        events: Arc<CollectingEventSink>,
    }

    fn harness() -> Harness {
        let log = Arc::new(CompletionLog::new());
        let ledger = Arc::new(RewardLedger::new());
        let rewards = Arc::new(MockRewardService::granting());
        let notifier = Arc::new(CollectingNotifier::new());
        let celebration = Arc::new(CelebrationStateMachine::new());
        let events = Arc::new(CollectingEventSink::new());
        let rewards_dyn: Arc<dyn RewardService> = rewards.clone();
        let notifier_dyn: Arc<dyn Notifier> = notifier.clone();
        let events_dyn: Arc<dyn FlowEventSink> = events.clone();
        let coordinator = CompletionCoordinator::new(
            Arc::clone(&log),
            Arc::clone(&ledger),
            rewards_dyn,
            notifier_dyn,
            Arc::clone(&celebration),
            events_dyn,
            "user-1".to_string(),
        );
        Harness {
            coordinator,
            log,
            ledger,
            rewards,
            notifier,
            celebration,
            events,
        }
    }

    fn product_definition() -> StageDefinition {
        StageTable::onboarding()
            .definition(StageId::Product)
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_success_records_then_celebrates() {
        let h = harness();
        let controller: Arc<dyn StageController> = Arc::new(MockController::final_step());

        let outcome = h
            .coordinator
            .complete_stage(Uuid::new_v4(), &product_definition(), &controller)
            .await;

        assert_eq!(
            outcome,
            CompletionOutcome::Completed {
                reward_points: 50,
                reward_awarded: true
            }
        );
        assert!(h.log.contains(StageId::Product));
        assert!(h.celebration.is_showing());
        assert_eq!(h.ledger.confirmed_total(), 50);
        assert_eq!(h.rewards.call_count(), 1);
        // Record exists before the celebration event in the stream.
        let names: Vec<_> = h.events.events().iter().map(FlowEvent::name).collect();
        let reward_pos = names.iter().position(|n| *n == "reward_granted").unwrap();
        let shown_pos = names.iter().position(|n| *n == "celebration_shown").unwrap();
        assert!(reward_pos < shown_pos);
    }

    #[tokio::test]
    async fn test_submit_failure_leaves_no_record() {
        let h = harness();
        let controller = MockController::final_step();
        controller.set_submit_result(crate::controller::SubmitResult::failed("name required"));
        let controller: Arc<dyn StageController> = Arc::new(controller);

        let outcome = h
            .coordinator
            .complete_stage(Uuid::new_v4(), &product_definition(), &controller)
            .await;

        assert!(matches!(outcome, CompletionOutcome::SubmitFailed { .. }));
        assert!(h.log.is_empty());
        assert!(!h.celebration.is_showing());
        assert_eq!(h.rewards.call_count(), 0);
        let notices = h.notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].variant, NoticeVariant::Destructive);
    }

    #[tokio::test]
    async fn test_repeat_completion_skips_reward() {
        let h = harness();
        let controller: Arc<dyn StageController> = Arc::new(MockController::final_step());
        let definition = product_definition();

        let session = Uuid::new_v4();
        h.coordinator
            .complete_stage(session, &definition, &controller)
            .await;
        h.celebration.dismiss();
        h.coordinator
            .complete_stage(session, &definition, &controller)
            .await;

        assert_eq!(h.rewards.call_count(), 1);
        assert_eq!(h.ledger.total(), 50);
        assert_eq!(h.log.len(), 1);
        // Second attempt still celebrates.
        assert!(h.celebration.is_showing());
    }

    #[tokio::test]
    async fn test_reward_failure_is_non_fatal() {
        let h = harness();
        h.rewards.fail_with("ledger offline");
        let controller: Arc<dyn StageController> = Arc::new(MockController::final_step());

        let outcome = h
            .coordinator
            .complete_stage(Uuid::new_v4(), &product_definition(), &controller)
            .await;

        assert_eq!(
            outcome,
            CompletionOutcome::Completed {
                reward_points: 0,
                reward_awarded: false
            }
        );
        let record = h.log.get(StageId::Product).unwrap();
        assert!(!record.reward_awarded);
        // Optimistic application rolled back.
        assert_eq!(h.ledger.total(), 0);
        assert!(h.celebration.is_showing());
        let notices = h.notifier.notices();
        assert_eq!(notices[0].variant, NoticeVariant::Warning);
    }

    #[tokio::test]
    async fn test_collaborator_points_override_default() {
        let h = harness();
        h.rewards.grant_points(75);
        let controller: Arc<dyn StageController> = Arc::new(MockController::final_step());

        let outcome = h
            .coordinator
            .complete_stage(Uuid::new_v4(), &product_definition(), &controller)
            .await;

        assert_eq!(
            outcome,
            CompletionOutcome::Completed {
                reward_points: 75,
                reward_awarded: true
            }
        );
        assert_eq!(h.ledger.confirmed_total(), 75);
    }
}
