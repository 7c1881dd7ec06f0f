//! Append-only record of the sets performed in one session.
//!
//! The ledger is the only source of truth for exercise completion and volume.
//! Set numbers per exercise always form a contiguous run `1..=n`.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, SessionError};
use crate::models::CompletedSet;

#[derive(Debug, Clone, Default)]
pub struct SetLedger {
    entries: Vec<CompletedSet>,
    /// Highest set number recorded per exercise.
    highest: HashMap<String, u32>,
}

impl SetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one set. `set_number` must be exactly one past the highest
    /// already recorded for `exercise_id`.
    pub fn record(
        &mut self,
        exercise_id: &str,
        set_number: u32,
        reps: u32,
        weight: f32,
    ) -> Result<&CompletedSet> {
        let expected = self.sets_logged(exercise_id) + 1;
        if set_number != expected {
            return Err(SessionError::InvalidSequence {
                exercise_id: exercise_id.to_string(),
                expected,
                got: set_number,
            });
        }

        self.highest.insert(exercise_id.to_string(), set_number);
        self.entries.push(CompletedSet {
            exercise_id: exercise_id.to_string(),
            set_number,
            reps,
            weight,
        });
        debug!(exercise_id, set_number, reps, weight, "set recorded");

        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn is_set_complete(&self, exercise_id: &str, set_number: u32) -> bool {
        set_number >= 1 && set_number <= self.sets_logged(exercise_id)
    }

    /// Number of sets recorded for an exercise, which is also its highest set number.
    pub fn sets_logged(&self, exercise_id: &str) -> u32 {
        self.highest.get(exercise_id).copied().unwrap_or(0)
    }

    pub fn sets_for<'a>(&'a self, exercise_id: &'a str) -> impl Iterator<Item = &'a CompletedSet> {
        self.entries
            .iter()
            .filter(move |s| s.exercise_id == exercise_id)
    }

    pub fn volume_for(&self, exercise_id: &str) -> f32 {
        self.sets_for(exercise_id).map(CompletedSet::volume).sum()
    }

    pub fn total_volume(&self) -> f32 {
        self.entries.iter().map(CompletedSet::volume).sum()
    }

    /// All entries in the order they were logged.
    pub fn entries(&self) -> &[CompletedSet] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_record_contiguous() {
        let mut ledger = SetLedger::new();
        ledger.record("squat", 1, 5, 100.0).unwrap();
        ledger.record("squat", 2, 5, 100.0).unwrap();
        ledger.record("bench", 1, 8, 60.0).unwrap();

        assert_eq!(ledger.sets_logged("squat"), 2);
        assert_eq!(ledger.sets_logged("bench"), 1);
        assert_eq!(ledger.sets_logged("row"), 0);
        assert!(ledger.is_set_complete("squat", 2));
        assert!(!ledger.is_set_complete("squat", 3));
        assert!(!ledger.is_set_complete("squat", 0));
    }

    #[test]
    fn test_record_rejects_gap() {
        let mut ledger = SetLedger::new();
        let err = ledger.record("deadlift", 3, 5, 140.0).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidSequence {
                exercise_id: "deadlift".into(),
                expected: 1,
                got: 3,
            }
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_record_rejects_duplicate() {
        let mut ledger = SetLedger::new();
        ledger.record("row", 1, 10, 50.0).unwrap();
        assert!(ledger.record("row", 1, 10, 50.0).is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_volumes() {
        let mut ledger = SetLedger::new();
        ledger.record("a", 1, 10, 20.0).unwrap();
        ledger.record("a", 2, 8, 20.0).unwrap();
        ledger.record("b", 1, 12, 0.0).unwrap();

        assert_eq!(ledger.volume_for("a"), 360.0);
        assert_eq!(ledger.volume_for("b"), 0.0);
        assert_eq!(ledger.total_volume(), 360.0);
        // reading twice changes nothing
        assert_eq!(ledger.total_volume(), 360.0);
    }

    proptest! {
        #[test]
        fn prop_set_numbers_stay_contiguous(
            attempts in prop::collection::vec((0usize..3, 0u32..6), 0..60)
        ) {
            let ids = ["a", "b", "c"];
            let mut ledger = SetLedger::new();
            for (ex, n) in attempts {
                let _ = ledger.record(ids[ex], n, 5, 10.0);
            }
            for id in ids {
                let numbers: Vec<u32> = ledger.sets_for(id).map(|s| s.set_number).collect();
                let expected: Vec<u32> = (1..=ledger.sets_logged(id)).collect();
                prop_assert_eq!(numbers, expected);
            }
        }

        #[test]
        fn prop_total_volume_is_sum_of_sets(
            sets in prop::collection::vec((0u32..30, 0u32..200), 0..40)
        ) {
            let mut ledger = SetLedger::new();
            let mut expected = 0.0f64;
            for (i, (reps, weight)) in sets.iter().enumerate() {
                ledger.record("lift", i as u32 + 1, *reps, *weight as f32).unwrap();
                expected += *reps as f64 * *weight as f64;
            }
            let drift = (ledger.total_volume() as f64 - expected).abs();
            prop_assert!(drift < 1e-3 * expected.max(1.0));
            prop_assert_eq!(ledger.total_volume(), ledger.volume_for("lift"));
        }
    }
}
