//! The transient celebration overlay shown between stage completion and the
//! advance to the next stage.
//!
//! The machine has two states, `Idle` and `Showing`. It enters `Showing`
//! through exactly one path, the completion coordinator, and leaves it
//! through exactly one path, explicit dismissal. There is no timer-driven
//! trigger or dismissal anywhere in the core.

use crate::stages::StageId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Phase of the celebration overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CelebrationPhase {
    /// No overlay; navigation runs normally.
    Idle,
    /// Overlay visible; navigation is suspended until dismissal.
    Showing,
}

/// Payload of a showing celebration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Celebration {
    /// The stage that was just completed.
    pub stage_id: StageId,
    /// Points attached to the completion (zero when the reward was
    /// withheld).
    pub reward_points: u32,
    /// User-facing message for the overlay.
    pub message: String,
}

/// Overlay state machine gating navigation between completion and advance.
#[derive(Debug, Default)]
pub struct CelebrationStateMachine {
    current: Mutex<Option<Celebration>>,
}

impl CelebrationStateMachine {
    /// Creates a machine in the `Idle` phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> CelebrationPhase {
        if self.current.lock().is_some() {
            CelebrationPhase::Showing
        } else {
            CelebrationPhase::Idle
        }
    }

    /// Returns true while the overlay is visible.
    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.current.lock().is_some()
    }

    /// A clone of the showing celebration, if any.
    #[must_use]
    pub fn current(&self) -> Option<Celebration> {
        self.current.lock().clone()
    }

    /// Transitions `Idle → Showing`.
    ///
    /// Returns false and leaves the existing overlay in place if one is
    /// already showing; the engine rejects further completions while
    /// showing, so that only arises from misuse.
    pub fn show(&self, celebration: Celebration) -> bool {
        let mut current = self.current.lock();
        if current.is_some() {
            return false;
        }
        *current = Some(celebration);
        true
    }

    /// Transitions `Showing → Idle`, returning the dismissed celebration.
    ///
    /// Returns `None` when nothing was showing.
    pub fn dismiss(&self) -> Option<Celebration> {
        self.current.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Celebration {
        Celebration {
            stage_id: StageId::Product,
            reward_points: 50,
            message: "Create Product complete".to_string(),
        }
    }

    #[test]
    fn test_starts_idle() {
        let machine = CelebrationStateMachine::new();
        assert_eq!(machine.phase(), CelebrationPhase::Idle);
        assert!(!machine.is_showing());
        assert!(machine.current().is_none());
    }

    #[test]
    fn test_show_then_dismiss() {
        let machine = CelebrationStateMachine::new();
        assert!(machine.show(sample()));
        assert_eq!(machine.phase(), CelebrationPhase::Showing);
        assert_eq!(machine.current().map(|c| c.reward_points), Some(50));

        let dismissed = machine.dismiss().unwrap();
        assert_eq!(dismissed.stage_id, StageId::Product);
        assert_eq!(machine.phase(), CelebrationPhase::Idle);
    }

    #[test]
    fn test_show_while_showing_is_rejected() {
        let machine = CelebrationStateMachine::new();
        assert!(machine.show(sample()));

        let mut second = sample();
        second.stage_id = StageId::Notes;
        assert!(!machine.show(second));
        // First celebration still in place.
        assert_eq!(machine.current().map(|c| c.stage_id), Some(StageId::Product));
    }

    #[test]
    fn test_dismiss_when_idle_is_none() {
        let machine = CelebrationStateMachine::new();
        assert!(machine.dismiss().is_none());
    }
}
