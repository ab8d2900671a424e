//! Typed flow events for observability.
//!
//! The engine emits one event per state change through an injected
//! [`FlowEventSink`]. Events are a monitoring surface, never a control
//! surface: nothing in the core reacts to its own events.

mod sink;

pub use sink::{CollectingEventSink, FlowEventSink, NoOpEventSink, TracingEventSink};

use crate::navigation::GlobalStep;
use crate::stages::StageId;
use serde::{Deserialize, Serialize};

/// A state change in the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowEvent {
    /// Forward navigation moved the position.
    StepAdvanced {
        /// Position before the transition.
        from: GlobalStep,
        /// Position after the transition.
        to: GlobalStep,
    },
    /// Backward navigation moved the position.
    StepRetreated {
        /// Position before the transition.
        from: GlobalStep,
        /// Position after the transition.
        to: GlobalStep,
    },
    /// A skippable stage was jumped over.
    StageSkipped {
        /// Position before the jump.
        from: GlobalStep,
        /// Position after the jump.
        to: GlobalStep,
    },
    /// A stage's final submission succeeded.
    StageCompleted {
        /// The completed stage.
        stage_id: StageId,
        /// Whether a reward was granted for this completion.
        reward_awarded: bool,
        /// Points attached to the completion.
        reward_points: u32,
    },
    /// A stage's final submission failed.
    SubmitFailed {
        /// The stage whose submission failed.
        stage_id: StageId,
        /// Failure message.
        message: String,
    },
    /// The reward collaborator granted points.
    RewardGranted {
        /// The rewarded stage.
        stage_id: StageId,
        /// Points granted.
        points: u32,
    },
    /// The reward collaborator failed; the completion stands.
    RewardFailed {
        /// The stage whose reward failed.
        stage_id: StageId,
        /// Failure message.
        message: String,
    },
    /// A required stage had no registered controller at transition time.
    RegistrationGap {
        /// The stage missing its controller.
        stage_id: StageId,
    },
    /// The celebration overlay became visible.
    CelebrationShown {
        /// The celebrated stage.
        stage_id: StageId,
    },
    /// The celebration overlay was dismissed.
    CelebrationDismissed {
        /// The stage that was being celebrated.
        stage_id: StageId,
    },
    /// The flow position was restored from the progress store.
    FlowResumed {
        /// The restored position.
        step: GlobalStep,
    },
    /// The flow position was reset to the start.
    FlowReset,
    /// The user reached past the final step of the final stage.
    FlowFinished,
}

impl FlowEvent {
    /// Stable name of the event kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StepAdvanced { .. } => "step_advanced",
            Self::StepRetreated { .. } => "step_retreated",
            Self::StageSkipped { .. } => "stage_skipped",
            Self::StageCompleted { .. } => "stage_completed",
            Self::SubmitFailed { .. } => "submit_failed",
            Self::RewardGranted { .. } => "reward_granted",
            Self::RewardFailed { .. } => "reward_failed",
            Self::RegistrationGap { .. } => "registration_gap",
            Self::CelebrationShown { .. } => "celebration_shown",
            Self::CelebrationDismissed { .. } => "celebration_dismissed",
            Self::FlowResumed { .. } => "flow_resumed",
            Self::FlowReset => "flow_reset",
            Self::FlowFinished => "flow_finished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = FlowEvent::RewardGranted {
            stage_id: StageId::Product,
            points: 50,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "reward_granted");
        assert_eq!(json["stage_id"], "product");
        assert_eq!(json["points"], 50);
    }

    #[test]
    fn test_event_names() {
        let event = FlowEvent::FlowReset;
        assert_eq!(event.name(), "flow_reset");
        let event = FlowEvent::CelebrationShown {
            stage_id: StageId::Notes,
        };
        assert_eq!(event.name(), "celebration_shown");
    }
}
