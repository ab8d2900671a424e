//! Stage definitions and the lookup table over them.

use super::StageId;
use crate::errors::{FlowError, FlowResult};
use serde::{Deserialize, Serialize};

/// Static configuration for a single stage.
///
/// Immutable once the table is built; one definition per stage index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// The stage identity.
    pub id: StageId,
    /// Human-readable title.
    pub title: String,
    /// Number of sub-steps in this stage (1-based positions).
    pub total_steps: usize,
    /// Whether the stage must be completed before advancing past it.
    /// Non-required stages may be skipped.
    pub required: bool,
    /// Default reward granted on first completion.
    pub reward_points: u32,
}

impl StageDefinition {
    /// Creates a required stage definition with no reward.
    #[must_use]
    pub fn new(id: StageId, title: impl Into<String>, total_steps: usize) -> Self {
        Self {
            id,
            title: title.into(),
            total_steps,
            required: true,
            reward_points: 0,
        }
    }

    /// Marks the stage as skippable.
    #[must_use]
    pub fn skippable(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets the default reward for first completion.
    #[must_use]
    pub fn with_reward(mut self, points: u32) -> Self {
        self.reward_points = points;
        self
    }

    /// Returns true if `sub_step` is a valid 1-based position in this stage.
    #[must_use]
    pub fn contains_sub_step(&self, sub_step: usize) -> bool {
        (1..=self.total_steps).contains(&sub_step)
    }
}

/// The registry of what stages exist, in flow order.
///
/// Pure lookup; loaded once at configuration time and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTable {
    definitions: Vec<StageDefinition>,
}

impl StageTable {
    /// Builds a table from an ordered list of definitions.
    ///
    /// Fails if the list is empty, contains a zero-step stage, or repeats a
    /// stage identity.
    pub fn from_definitions(definitions: Vec<StageDefinition>) -> FlowResult<Self> {
        if definitions.is_empty() {
            return Err(FlowError::InvalidTable("no stages defined".into()));
        }
        for def in &definitions {
            if def.total_steps == 0 {
                return Err(FlowError::InvalidTable(format!(
                    "stage '{}' has zero sub-steps",
                    def.id
                )));
            }
        }
        for (i, def) in definitions.iter().enumerate() {
            if definitions[..i].iter().any(|d| d.id == def.id) {
                return Err(FlowError::InvalidTable(format!(
                    "stage '{}' appears more than once",
                    def.id
                )));
            }
        }
        Ok(Self { definitions })
    }

    /// Starts a builder for a custom table.
    #[must_use]
    pub fn builder() -> StageTableBuilder {
        StageTableBuilder::new()
    }

    /// The default onboarding flow.
    #[must_use]
    pub fn onboarding() -> Self {
        Self {
            definitions: vec![
                StageDefinition::new(StageId::Introduction, "Introduction", 4),
                StageDefinition::new(StageId::Product, "Create Product", 3).with_reward(50),
                StageDefinition::new(StageId::BusinessStack, "Create Business Stack", 3)
                    .skippable()
                    .with_reward(50),
                StageDefinition::new(StageId::TechStack, "Create Tech Stack", 10)
                    .skippable()
                    .with_reward(50),
                StageDefinition::new(StageId::Questions, "Answer 360 Questions", 7)
                    .skippable()
                    .with_reward(50),
                StageDefinition::new(StageId::Rules, "Create Rules Stack", 7)
                    .skippable()
                    .with_reward(50),
                StageDefinition::new(StageId::Features, "Add Features", 1)
                    .skippable()
                    .with_reward(50),
                StageDefinition::new(StageId::Collections, "Add Collections", 1)
                    .skippable()
                    .with_reward(50),
                StageDefinition::new(StageId::Notes, "Add Notes", 1).with_reward(50),
                StageDefinition::new(StageId::Completion, "Completion", 1),
            ],
        }
    }

    /// Returns the definition at a flow index.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range index. Position state is clamped by
    /// [`crate::navigation::NavigationState`], so an out-of-range lookup is a
    /// programming error, not a user-facing condition.
    #[must_use]
    pub fn definition_at(&self, stage_index: usize) -> &StageDefinition {
        &self.definitions[stage_index]
    }

    /// Returns the definition at a flow index, if in range.
    #[must_use]
    pub fn get(&self, stage_index: usize) -> Option<&StageDefinition> {
        self.definitions.get(stage_index)
    }

    /// Returns the definition for a stage identity, if the table contains it.
    #[must_use]
    pub fn definition(&self, id: StageId) -> Option<&StageDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Returns the flow index of a stage identity, if present.
    #[must_use]
    pub fn index_of(&self, id: StageId) -> Option<usize> {
        self.definitions.iter().position(|d| d.id == id)
    }

    /// Number of stages in the flow.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if the table holds no stages. Unreachable through the
    /// constructors, present for completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Index of the last stage.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.definitions.len().saturating_sub(1)
    }

    /// Total sub-steps across the whole flow.
    #[must_use]
    pub fn total_overall_steps(&self) -> usize {
        self.definitions.iter().map(|d| d.total_steps).sum()
    }

    /// Sub-steps contained in the stages before `stage_index`.
    #[must_use]
    pub fn steps_before(&self, stage_index: usize) -> usize {
        self.definitions
            .iter()
            .take(stage_index)
            .map(|d| d.total_steps)
            .sum()
    }

    /// Iterates the definitions in flow order.
    pub fn iter(&self) -> impl Iterator<Item = &StageDefinition> {
        self.definitions.iter()
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self::onboarding()
    }
}

/// Builder for custom stage tables.
#[derive(Debug, Default)]
pub struct StageTableBuilder {
    definitions: Vec<StageDefinition>,
}

impl StageTableBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage definition.
    #[must_use]
    pub fn stage(mut self, definition: StageDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Builds the table, validating the definitions.
    pub fn build(self) -> FlowResult<StageTable> {
        StageTable::from_definitions(self.definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onboarding_table_shape() {
        let table = StageTable::onboarding();
        assert_eq!(table.len(), 10);
        assert_eq!(table.definition_at(0).id, StageId::Introduction);
        assert_eq!(table.definition_at(3).total_steps, 10);
        assert_eq!(table.definition_at(9).id, StageId::Completion);
        // Skip is offered for the middle stages only.
        assert!(table.definition_at(1).required);
        for idx in 2..=7 {
            assert!(!table.definition_at(idx).required, "stage {idx}");
        }
        assert!(table.definition_at(8).required);
    }

    #[test]
    fn test_overall_step_counts() {
        let table = StageTable::onboarding();
        assert_eq!(table.total_overall_steps(), 4 + 3 + 3 + 10 + 7 + 7 + 1 + 1 + 1 + 1);
        assert_eq!(table.steps_before(0), 0);
        assert_eq!(table.steps_before(2), 7);
    }

    #[test]
    fn test_lookup_by_id() {
        let table = StageTable::onboarding();
        assert_eq!(table.index_of(StageId::Questions), Some(4));
        assert_eq!(
            table.definition(StageId::Questions).map(|d| d.total_steps),
            Some(7)
        );
    }

    #[test]
    fn test_builder_rejects_empty() {
        assert!(StageTable::builder().build().is_err());
    }

    #[test]
    fn test_builder_rejects_zero_steps() {
        let result = StageTable::builder()
            .stage(StageDefinition::new(StageId::Product, "Product", 0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_duplicate_ids() {
        let result = StageTable::builder()
            .stage(StageDefinition::new(StageId::Product, "Product", 2))
            .stage(StageDefinition::new(StageId::Product, "Product again", 1))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_table() {
        let table = StageTable::builder()
            .stage(StageDefinition::new(StageId::Introduction, "Intro", 2))
            .stage(StageDefinition::new(StageId::Product, "Product", 3).with_reward(25))
            .stage(StageDefinition::new(StageId::Completion, "Done", 1))
            .build()
            .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.last_index(), 2);
        assert_eq!(table.total_overall_steps(), 6);
    }

    #[test]
    fn test_contains_sub_step() {
        let def = StageDefinition::new(StageId::Rules, "Rules", 7);
        assert!(def.contains_sub_step(1));
        assert!(def.contains_sub_step(7));
        assert!(!def.contains_sub_step(0));
        assert!(!def.contains_sub_step(8));
    }
}
