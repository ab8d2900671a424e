//! Stage identity and the static stage definition table.
//!
//! Stages are the mini-wizards of the onboarding flow. Their count, order
//! and required-ness are fixed at configuration time via [`StageTable`];
//! nothing about the stage set changes at runtime.

mod table;

pub use table::{StageDefinition, StageTable, StageTableBuilder};

use serde::{Deserialize, Serialize};

/// Identity of a stage in the onboarding flow.
///
/// A closed enum rather than a string key, so a lookup for a stage that does
/// not exist is a compile-time impossibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Introductory walkthrough; no data is collected.
    Introduction,
    /// Create the product entity.
    Product,
    /// Create the business stack.
    BusinessStack,
    /// Create the technical stack.
    TechStack,
    /// Answer the fixed question set.
    Questions,
    /// Define the rules stack.
    Rules,
    /// Add product features.
    Features,
    /// Create collections and attach documents.
    Collections,
    /// Add free-form notes.
    Notes,
    /// Terminal summary screen.
    Completion,
}

impl StageId {
    /// All stage identities in flow order.
    pub const ALL: [Self; 10] = [
        Self::Introduction,
        Self::Product,
        Self::BusinessStack,
        Self::TechStack,
        Self::Questions,
        Self::Rules,
        Self::Features,
        Self::Collections,
        Self::Notes,
        Self::Completion,
    ];

    /// Returns the stage's position in the default flow order.
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|id| *id == self)
            .unwrap_or_default()
    }

    /// Returns the stage at a flow index, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the stable string identifier for this stage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Product => "product",
            Self::BusinessStack => "business_stack",
            Self::TechStack => "tech_stack",
            Self::Questions => "questions",
            Self::Rules => "rules",
            Self::Features => "features",
            Self::Collections => "collections",
            Self::Notes => "notes",
            Self::Completion => "completion",
        }
    }

    /// Returns the reward schedule action associated with completing this
    /// stage, or `None` for stages that carry no reward.
    #[must_use]
    pub fn reward_action(self) -> Option<&'static str> {
        match self {
            Self::Introduction | Self::Completion => None,
            Self::Product => Some("create_product"),
            Self::BusinessStack | Self::TechStack | Self::Questions | Self::Rules => {
                Some("create_stack")
            }
            Self::Features => Some("create_feature"),
            Self::Collections => Some("create_collection"),
            Self::Notes => Some("create_note"),
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, id) in StageId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
            assert_eq!(StageId::from_index(i), Some(*id));
        }
        assert_eq!(StageId::from_index(StageId::ALL.len()), None);
    }

    #[test]
    fn test_display_matches_serde() {
        let json = serde_json::to_string(&StageId::BusinessStack).unwrap();
        assert_eq!(json, "\"business_stack\"");
        assert_eq!(StageId::BusinessStack.to_string(), "business_stack");
    }

    #[test]
    fn test_reward_actions() {
        assert_eq!(StageId::Introduction.reward_action(), None);
        assert_eq!(StageId::Product.reward_action(), Some("create_product"));
        assert_eq!(StageId::Rules.reward_action(), Some("create_stack"));
        assert_eq!(StageId::Notes.reward_action(), Some("create_note"));
        assert_eq!(StageId::Completion.reward_action(), None);
    }
}
