//! Stage completion tracking and the completion coordinator.
//!
//! A [`CompletionRecord`] is the durable marker that a stage finished and
//! whether its reward was granted. The [`CompletionLog`] is first-writer-wins
//! per stage, which is what makes reward issuance at-most-once.

mod coordinator;
mod ledger;

pub use coordinator::{CompletionCoordinator, CompletionOutcome};
pub use ledger::RewardLedger;

use crate::stages::StageId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Marker created once per stage, the first time its final submission
/// succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// The completed stage.
    pub stage_id: StageId,
    /// Whether the reward collaborator granted points for this completion.
    pub reward_awarded: bool,
    /// Points granted (zero when the reward was withheld).
    pub reward_points: u32,
    /// When the completion was recorded.
    pub timestamp: DateTime<Utc>,
}

impl CompletionRecord {
    /// A completion with its reward granted.
    #[must_use]
    pub fn rewarded(stage_id: StageId, reward_points: u32) -> Self {
        Self {
            stage_id,
            reward_awarded: true,
            reward_points,
            timestamp: Utc::now(),
        }
    }

    /// A completion whose reward request failed. The stage still counts as
    /// complete.
    #[must_use]
    pub fn unrewarded(stage_id: StageId) -> Self {
        Self {
            stage_id,
            reward_awarded: false,
            reward_points: 0,
            timestamp: Utc::now(),
        }
    }
}

/// Set of completion records for the flow instance.
///
/// Insertion is first-writer-wins: re-submitting an already-completed stage
/// never creates a duplicate record.
#[derive(Debug, Default)]
pub struct CompletionLog {
    records: RwLock<HashMap<StageId, CompletionRecord>>,
}

impl CompletionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record unless one already exists for the stage.
    ///
    /// Returns true if the record was inserted.
    pub fn insert(&self, record: CompletionRecord) -> bool {
        let mut records = self.records.write();
        if records.contains_key(&record.stage_id) {
            return false;
        }
        records.insert(record.stage_id, record);
        true
    }

    /// Returns true if the stage has a completion record.
    #[must_use]
    pub fn contains(&self, stage_id: StageId) -> bool {
        self.records.read().contains_key(&stage_id)
    }

    /// A clone of the stage's record, if any.
    #[must_use]
    pub fn get(&self, stage_id: StageId) -> Option<CompletionRecord> {
        self.records.read().get(&stage_id).cloned()
    }

    /// All records, in flow order.
    #[must_use]
    pub fn all(&self) -> Vec<CompletionRecord> {
        let records = self.records.read();
        let mut all: Vec<_> = records.values().cloned().collect();
        all.sort_by_key(|r| r.stage_id.index());
        all
    }

    /// Number of completed stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if no stage has completed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_first_writer_wins() {
        let log = CompletionLog::new();
        assert!(log.insert(CompletionRecord::rewarded(StageId::Product, 50)));
        assert!(!log.insert(CompletionRecord::unrewarded(StageId::Product)));

        let record = log.get(StageId::Product).unwrap();
        assert!(record.reward_awarded);
        assert_eq!(record.reward_points, 50);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_all_is_flow_ordered() {
        let log = CompletionLog::new();
        log.insert(CompletionRecord::rewarded(StageId::Notes, 50));
        log.insert(CompletionRecord::rewarded(StageId::Product, 50));

        let all = log.all();
        assert_eq!(all[0].stage_id, StageId::Product);
        assert_eq!(all[1].stage_id, StageId::Notes);
    }

    #[test]
    fn test_unrewarded_record_counts_as_complete() {
        let log = CompletionLog::new();
        log.insert(CompletionRecord::unrewarded(StageId::Rules));
        assert!(log.contains(StageId::Rules));
        assert!(!log.get(StageId::Rules).unwrap().reward_awarded);
    }
}
