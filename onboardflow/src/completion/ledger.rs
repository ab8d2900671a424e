//! Two-phase running total of reward points.
//!
//! Points are applied to the display total immediately on completion, before
//! the reward collaborator confirms, so the UI never lags behind the user.
//! Each application stays provisional until confirmed; a failed reward call
//! rolls its provisional amount back rather than diverging silently.

use crate::stages::StageId;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct LedgerInner {
    confirmed: u64,
    provisional: HashMap<StageId, u32>,
}

/// Local running total of reward points with provisional entries.
#[derive(Debug, Default)]
pub struct RewardLedger {
    inner: Mutex<LedgerInner>,
}

impl RewardLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger seeded with an already-confirmed total, for resuming
    /// a flow whose earlier rewards are durable.
    #[must_use]
    pub fn with_confirmed(total: u64) -> Self {
        Self {
            inner: Mutex::new(LedgerInner {
                confirmed: total,
                provisional: HashMap::new(),
            }),
        }
    }

    /// Applies points for a stage provisionally, replacing any provisional
    /// amount already pending for that stage.
    pub fn apply_provisional(&self, stage_id: StageId, points: u32) {
        self.inner.lock().provisional.insert(stage_id, points);
    }

    /// Confirms a stage's provisional application at the amount the
    /// collaborator actually granted.
    pub fn confirm(&self, stage_id: StageId, points: u32) {
        let mut inner = self.inner.lock();
        inner.provisional.remove(&stage_id);
        inner.confirmed += u64::from(points);
    }

    /// Rolls back a stage's provisional application.
    pub fn rollback(&self, stage_id: StageId) {
        self.inner.lock().provisional.remove(&stage_id);
    }

    /// Returns true if the stage has an unconfirmed application pending.
    #[must_use]
    pub fn has_provisional(&self, stage_id: StageId) -> bool {
        self.inner.lock().provisional.contains_key(&stage_id)
    }

    /// The display total: confirmed plus all provisional amounts.
    #[must_use]
    pub fn total(&self) -> u64 {
        let inner = self.inner.lock();
        inner.confirmed + inner.provisional.values().map(|p| u64::from(*p)).sum::<u64>()
    }

    /// The durable portion of the total.
    #[must_use]
    pub fn confirmed_total(&self) -> u64 {
        self.inner.lock().confirmed
    }

    /// The unconfirmed portion of the total.
    #[must_use]
    pub fn provisional_total(&self) -> u64 {
        self.inner
            .lock()
            .provisional
            .values()
            .map(|p| u64::from(*p))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisional_counts_toward_total() {
        let ledger = RewardLedger::new();
        ledger.apply_provisional(StageId::Product, 50);
        assert_eq!(ledger.total(), 50);
        assert_eq!(ledger.confirmed_total(), 0);
        assert!(ledger.has_provisional(StageId::Product));
    }

    #[test]
    fn test_confirm_moves_to_confirmed_at_actual_amount() {
        let ledger = RewardLedger::new();
        ledger.apply_provisional(StageId::Product, 50);
        // Collaborator granted a different amount than the stage default.
        ledger.confirm(StageId::Product, 75);

        assert_eq!(ledger.total(), 75);
        assert_eq!(ledger.confirmed_total(), 75);
        assert_eq!(ledger.provisional_total(), 0);
        assert!(!ledger.has_provisional(StageId::Product));
    }

    #[test]
    fn test_rollback_restores_previous_total() {
        let ledger = RewardLedger::with_confirmed(100);
        ledger.apply_provisional(StageId::Rules, 50);
        assert_eq!(ledger.total(), 150);

        ledger.rollback(StageId::Rules);
        assert_eq!(ledger.total(), 100);
        assert_eq!(ledger.confirmed_total(), 100);
    }

    #[test]
    fn test_independent_stages() {
        let ledger = RewardLedger::new();
        ledger.apply_provisional(StageId::Product, 50);
        ledger.apply_provisional(StageId::Notes, 50);
        ledger.confirm(StageId::Product, 50);
        ledger.rollback(StageId::Notes);

        assert_eq!(ledger.total(), 50);
    }
}
