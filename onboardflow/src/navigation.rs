//! Authoritative flow position and derived progress.

use crate::stages::{StageDefinition, StageTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Position within the overall flow: `(stage_index, sub_step)`.
///
/// `sub_step` is 1-based. Bounds are defined by the [`StageTable`] the
/// position is interpreted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStep {
    /// Index of the active stage in the flow order.
    pub stage_index: usize,
    /// 1-based position within the active stage.
    pub sub_step: usize,
}

impl GlobalStep {
    /// The flow start position.
    pub const START: Self = Self {
        stage_index: 0,
        sub_step: 1,
    };

    /// Creates a position.
    #[must_use]
    pub fn new(stage_index: usize, sub_step: usize) -> Self {
        Self {
            stage_index,
            sub_step,
        }
    }
}

impl std::fmt::Display for GlobalStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}.{}]", self.stage_index, self.sub_step)
    }
}

/// Derived progress over the whole flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowProgress {
    /// Overall step the user is on, counting every sub-step of every stage.
    pub current_overall_step: usize,
    /// Total sub-steps across the flow.
    pub total_overall_steps: usize,
    /// `current / total` as a percentage.
    pub percent: f64,
}

/// The authoritative flow position.
///
/// Mutated only by the transition engine and the completion coordinator.
/// Every operation keeps the position inside the bounds of the stage table:
/// a transition that would leave range is a no-op and reports `false`.
#[derive(Debug, Clone)]
pub struct NavigationState {
    table: Arc<StageTable>,
    step: GlobalStep,
}

impl NavigationState {
    /// Creates a state positioned at the flow start.
    #[must_use]
    pub fn new(table: Arc<StageTable>) -> Self {
        Self {
            table,
            step: GlobalStep::START,
        }
    }

    /// The current position.
    #[must_use]
    pub fn current(&self) -> GlobalStep {
        self.step
    }

    /// The stage table this position is interpreted against.
    #[must_use]
    pub fn table(&self) -> &Arc<StageTable> {
        &self.table
    }

    /// Definition of the active stage.
    #[must_use]
    pub fn current_definition(&self) -> &StageDefinition {
        self.table.definition_at(self.step.stage_index)
    }

    /// Returns true at the very first sub-step of the first stage.
    #[must_use]
    pub fn is_first_step(&self) -> bool {
        self.step == GlobalStep::START
    }

    /// Returns true at the last sub-step of the last stage.
    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.step.stage_index == self.table.last_index()
            && self.step.sub_step == self.current_definition().total_steps
    }

    /// Returns true when the active stage is on its final sub-step.
    #[must_use]
    pub fn at_final_sub_step(&self) -> bool {
        self.step.sub_step == self.current_definition().total_steps
    }

    /// Moves to the next sub-step within the active stage.
    ///
    /// No-op at the stage's last sub-step; callers must advance the stage
    /// instead.
    pub fn advance_sub_step(&mut self) -> bool {
        if self.step.sub_step < self.current_definition().total_steps {
            self.step.sub_step += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the first sub-step of the next stage. No-op at the last
    /// stage.
    pub fn advance_stage(&mut self) -> bool {
        if self.step.stage_index < self.table.last_index() {
            self.step.stage_index += 1;
            self.step.sub_step = 1;
            true
        } else {
            false
        }
    }

    /// Moves one step backward.
    ///
    /// Crossing a stage boundary backward re-enters the previous stage at
    /// its last sub-step. No-op at the flow start.
    pub fn retreat(&mut self) -> bool {
        if self.step.sub_step > 1 {
            self.step.sub_step -= 1;
            true
        } else if self.step.stage_index > 0 {
            self.step.stage_index -= 1;
            self.step.sub_step = self.current_definition().total_steps;
            true
        } else {
            false
        }
    }

    /// Jumps to the first sub-step of an arbitrary stage. No-op when the
    /// index is out of range.
    pub fn jump_to_stage(&mut self, stage_index: usize) -> bool {
        if stage_index <= self.table.last_index() {
            self.step = GlobalStep::new(stage_index, 1);
            true
        } else {
            false
        }
    }

    /// Restores a previously saved position, clamping it into range.
    pub fn restore(&mut self, step: GlobalStep) {
        let stage_index = step.stage_index.min(self.table.last_index());
        let total = self.table.definition_at(stage_index).total_steps;
        let sub_step = step.sub_step.clamp(1, total);
        self.step = GlobalStep::new(stage_index, sub_step);
    }

    /// Returns to the flow start.
    pub fn reset(&mut self) {
        self.step = GlobalStep::START;
    }

    /// Derived overall progress: sub-steps of the stages already passed plus
    /// the position within the active stage.
    #[must_use]
    pub fn progress(&self) -> FlowProgress {
        let current = self.table.steps_before(self.step.stage_index) + self.step.sub_step;
        let total = self.table.total_overall_steps();
        #[allow(clippy::cast_precision_loss)]
        let percent = if total == 0 {
            0.0
        } else {
            current as f64 / total as f64 * 100.0
        };
        FlowProgress {
            current_overall_step: current,
            total_overall_steps: total,
            percent,
        }
    }
}
