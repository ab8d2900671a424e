//! The transition engine: computes legality of navigation requests and
//! drives stage completion.
//!
//! All mutation of the flow position funnels through this type. Requests
//! are answered with outcome enums; a rejected navigation is an expected
//! answer, not an error.

mod builder;

pub use builder::EngineBuilder;

use crate::celebration::CelebrationStateMachine;
use crate::completion::{
    CompletionCoordinator, CompletionLog, CompletionOutcome, RewardLedger,
};
use crate::controller::ControllerRegistry;
use crate::events::{FlowEvent, FlowEventSink};
use crate::navigation::{FlowProgress, GlobalStep, NavigationState};
use crate::ports::{Notice, Notifier, ProgressStore};
use crate::stages::{StageId, StageTable};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Why a navigation request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The celebration overlay is showing; only dismissal is accepted.
    CelebrationShowing,
    /// A submission is already in flight for this flow.
    SubmitInFlight,
    /// The active stage reported it cannot advance. The stage UI owns the
    /// explanation; the engine stays silent.
    ValidationBlocked,
    /// Already at the first sub-step of the first stage.
    AtFlowStart,
    /// The active stage is required and cannot be skipped.
    StageRequired,
    /// The skip target is not a stage in this flow.
    TargetOutOfRange,
}

/// Answer to a forward navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// Plain advance; render the new position.
    Advanced(GlobalStep),
    /// The stage's final submission succeeded; the celebration overlay is
    /// showing and the position will advance on dismissal.
    StageCompleted {
        /// The completed stage.
        stage_id: StageId,
        /// Points attached to the completion.
        reward_points: u32,
        /// Whether the reward collaborator granted the points.
        reward_awarded: bool,
    },
    /// The stage's final submission failed; position unchanged, retryable.
    SubmitFailed {
        /// The stage whose submission failed.
        stage_id: StageId,
        /// Failure message surfaced to the user.
        message: String,
    },
    /// Already past the final step of the final stage.
    FlowFinished,
    /// The request was rejected; position unchanged.
    Rejected(BlockReason),
}

/// Answer to a backward navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackOutcome {
    /// Moved one step backward.
    Retreated(GlobalStep),
    /// The request was rejected; position unchanged.
    Rejected(BlockReason),
}

/// Answer to a skip request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipOutcome {
    /// Jumped to the first sub-step of the target stage.
    Skipped(GlobalStep),
    /// The request was rejected; position unchanged.
    Rejected(BlockReason),
}

/// Derived button state for the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationAvailability {
    /// Whether a back request would currently be accepted.
    pub can_go_back: bool,
    /// Whether a forward request would currently be accepted.
    pub can_go_next: bool,
}

/// Finite-state navigation controller for one flow instance.
///
/// Access is serialized by the host's event loop; internal locks exist only
/// to make the shared references sound and are never held across awaits.
pub struct TransitionEngine {
    session_id: Uuid,
    table: Arc<StageTable>,
    registry: Arc<ControllerRegistry>,
    nav: Mutex<NavigationState>,
    celebration: Arc<CelebrationStateMachine>,
    log: Arc<CompletionLog>,
    ledger: Arc<RewardLedger>,
    coordinator: CompletionCoordinator,
    progress_store: Option<Arc<dyn ProgressStore>>,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn FlowEventSink>,
    in_flight: AtomicBool,
}

impl TransitionEngine {
    /// Starts a builder with the default onboarding flow.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        table: Arc<StageTable>,
        registry: Arc<ControllerRegistry>,
        celebration: Arc<CelebrationStateMachine>,
        log: Arc<CompletionLog>,
        ledger: Arc<RewardLedger>,
        coordinator: CompletionCoordinator,
        progress_store: Option<Arc<dyn ProgressStore>>,
        notifier: Arc<dyn Notifier>,
        events: Arc<dyn FlowEventSink>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            nav: Mutex::new(NavigationState::new(Arc::clone(&table))),
            table,
            registry,
            celebration,
            log,
            ledger,
            coordinator,
            progress_store,
            notifier,
            events,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Identifier of this flow session, tagged on every emitted event.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The stage table this flow runs against.
    #[must_use]
    pub fn table(&self) -> &Arc<StageTable> {
        &self.table
    }

    /// The controller registry shared with the stage UIs.
    #[must_use]
    pub fn registry(&self) -> &Arc<ControllerRegistry> {
        &self.registry
    }

    /// The celebration overlay state.
    #[must_use]
    pub fn celebration(&self) -> &Arc<CelebrationStateMachine> {
        &self.celebration
    }

    /// Completion records for this flow instance.
    #[must_use]
    pub fn completion_log(&self) -> &Arc<CompletionLog> {
        &self.log
    }

    /// Running reward total.
    #[must_use]
    pub fn reward_ledger(&self) -> &Arc<RewardLedger> {
        &self.ledger
    }

    /// The current flow position.
    #[must_use]
    pub fn current_step(&self) -> GlobalStep {
        self.nav.lock().current()
    }

    /// Identity of the active stage.
    #[must_use]
    pub fn current_stage_id(&self) -> StageId {
        self.nav.lock().current_definition().id
    }

    /// Derived overall progress.
    #[must_use]
    pub fn progress(&self) -> FlowProgress {
        self.nav.lock().progress()
    }

    /// Handles a forward navigation request.
    ///
    /// On the active stage's final sub-step (as reported by its controller)
    /// this submits and, on success, shows the celebration instead of
    /// advancing; the advance happens on [`Self::dismiss_celebration`].
    pub async fn request_next(&self) -> NextOutcome {
        if self.celebration.is_showing() {
            return NextOutcome::Rejected(BlockReason::CelebrationShowing);
        }
        if self.in_flight.load(Ordering::SeqCst) {
            return NextOutcome::Rejected(BlockReason::SubmitInFlight);
        }

        let (from, definition) = {
            let nav = self.nav.lock();
            (nav.current(), nav.current_definition().clone())
        };
        let stage_id = definition.id;
        let controller = self.registry.lookup(stage_id);

        if let Some(controller) = &controller {
            if controller.is_final_sub_step() {
                if self.in_flight.swap(true, Ordering::SeqCst) {
                    return NextOutcome::Rejected(BlockReason::SubmitInFlight);
                }
                let outcome = self
                    .coordinator
                    .complete_stage(self.session_id, &definition, controller)
                    .await;
                self.in_flight.store(false, Ordering::SeqCst);
                return match outcome {
                    CompletionOutcome::Completed {
                        reward_points,
                        reward_awarded,
                    } => NextOutcome::StageCompleted {
                        stage_id,
                        reward_points,
                        reward_awarded,
                    },
                    CompletionOutcome::SubmitFailed { message } => {
                        NextOutcome::SubmitFailed { stage_id, message }
                    }
                };
            }
            if !controller.can_advance() {
                return NextOutcome::Rejected(BlockReason::ValidationBlocked);
            }
        } else if definition.required {
            // Unmount race: fail open rather than strand the user.
            tracing::warn!(
                stage = %stage_id,
                "required stage has no registered controller at transition time"
            );
            self.events
                .emit(self.session_id, &FlowEvent::RegistrationGap { stage_id });
        }

        let to = {
            let mut nav = self.nav.lock();
            if nav.is_last_step() {
                drop(nav);
                self.events.emit(self.session_id, &FlowEvent::FlowFinished);
                return NextOutcome::FlowFinished;
            }
            // A final sub-step without a completion hook is a plain stage
            // advance, not a completion.
            if !nav.advance_sub_step() {
                nav.advance_stage();
            }
            nav.current()
        };

        self.save_progress(to).await;
        self.events
            .emit(self.session_id, &FlowEvent::StepAdvanced { from, to });
        NextOutcome::Advanced(to)
    }

    /// Handles a backward navigation request. No validation gate; rejected
    /// only at the flow start and while the celebration is showing.
    pub async fn request_back(&self) -> BackOutcome {
        if self.celebration.is_showing() {
            return BackOutcome::Rejected(BlockReason::CelebrationShowing);
        }
        if self.in_flight.load(Ordering::SeqCst) {
            return BackOutcome::Rejected(BlockReason::SubmitInFlight);
        }

        let (from, moved, to) = {
            let mut nav = self.nav.lock();
            let from = nav.current();
            let moved = nav.retreat();
            (from, moved, nav.current())
        };
        if !moved {
            return BackOutcome::Rejected(BlockReason::AtFlowStart);
        }

        self.save_progress(to).await;
        self.events
            .emit(self.session_id, &FlowEvent::StepRetreated { from, to });
        BackOutcome::Retreated(to)
    }

    /// Handles a skip request to the first sub-step of `target_stage_index`.
    ///
    /// Permitted only while the active stage is not required.
    pub async fn request_skip(&self, target_stage_index: usize) -> SkipOutcome {
        if self.celebration.is_showing() {
            return SkipOutcome::Rejected(BlockReason::CelebrationShowing);
        }
        if self.in_flight.load(Ordering::SeqCst) {
            return SkipOutcome::Rejected(BlockReason::SubmitInFlight);
        }

        let (from, required) = {
            let nav = self.nav.lock();
            (nav.current(), nav.current_definition().required)
        };
        if required {
            return SkipOutcome::Rejected(BlockReason::StageRequired);
        }

        let to = {
            let mut nav = self.nav.lock();
            if !nav.jump_to_stage(target_stage_index) {
                return SkipOutcome::Rejected(BlockReason::TargetOutOfRange);
            }
            nav.current()
        };

        self.save_progress(to).await;
        self.notifier.notify(Notice::info(
            "Stage skipped",
            "You can always come back to complete this stage later.",
        ));
        self.events
            .emit(self.session_id, &FlowEvent::StageSkipped { from, to });
        SkipOutcome::Skipped(to)
    }

    /// Dismisses the celebration overlay and performs the deferred stage
    /// advance. Returns the new position, or `None` when nothing was
    /// showing.
    ///
    /// The gate in [`Self::request_next`] plus the single advance here is
    /// what guarantees exactly one stage advance per completion.
    pub async fn dismiss_celebration(&self) -> Option<GlobalStep> {
        let celebration = self.celebration.dismiss()?;

        let (from, to) = {
            let mut nav = self.nav.lock();
            let from = nav.current();
            nav.advance_stage();
            (from, nav.current())
        };

        self.save_progress(to).await;
        self.events.emit(
            self.session_id,
            &FlowEvent::CelebrationDismissed {
                stage_id: celebration.stage_id,
            },
        );
        if to != from {
            self.events
                .emit(self.session_id, &FlowEvent::StepAdvanced { from, to });
        }
        Some(to)
    }

    /// Derived button state for the host UI.
    #[must_use]
    pub fn availability(&self) -> NavigationAvailability {
        if self.celebration.is_showing() || self.in_flight.load(Ordering::SeqCst) {
            return NavigationAvailability {
                can_go_back: false,
                can_go_next: false,
            };
        }

        let (first, last, stage_id) = {
            let nav = self.nav.lock();
            (
                nav.is_first_step(),
                nav.is_last_step(),
                nav.current_definition().id,
            )
        };
        let controller = self.registry.lookup(stage_id);
        NavigationAvailability {
            can_go_back: !first && controller.as_ref().map_or(true, |c| c.can_retreat()),
            can_go_next: !last && controller.as_ref().map_or(true, |c| c.can_advance()),
        }
    }

    /// Restores the saved position from the progress store, if one is
    /// configured and holds a value. A load failure is logged and the flow
    /// starts from the current position.
    pub async fn resume(&self) -> GlobalStep {
        if let Some(store) = &self.progress_store {
            match store.load().await {
                Ok(Some(step)) => {
                    let restored = {
                        let mut nav = self.nav.lock();
                        nav.restore(step);
                        nav.current()
                    };
                    self.events
                        .emit(self.session_id, &FlowEvent::FlowResumed { step: restored });
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "failed to load saved flow progress");
                }
            }
        }
        self.current_step()
    }

    /// Saves the current position and ends the session early.
    pub async fn save_and_finish_later(&self) -> GlobalStep {
        let step = self.current_step();
        self.save_progress(step).await;
        self.events.emit(self.session_id, &FlowEvent::FlowFinished);
        step
    }

    /// Returns the flow to the start position and persists that.
    pub async fn reset(&self) -> GlobalStep {
        self.celebration.dismiss();
        {
            self.nav.lock().reset();
        }
        self.save_progress(GlobalStep::START).await;
        self.events.emit(self.session_id, &FlowEvent::FlowReset);
        GlobalStep::START
    }

    async fn save_progress(&self, step: GlobalStep) {
        if let Some(store) = &self.progress_store {
            if let Err(err) = store.save(step).await {
                // Position persistence is best-effort; never surfaced.
                tracing::warn!(error = %err, position = %step, "failed to save flow progress");
            }
        }
    }
}

impl std::fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("session_id", &self.session_id)
            .field("position", &self.current_step())
            .field("celebrating", &self.celebration.is_showing())
            .finish()
    }
}
