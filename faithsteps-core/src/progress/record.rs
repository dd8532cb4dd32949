//! Per-journey progress records and aggregate counters.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle of a journey for the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Mutable progress for one journey.
///
/// Completion is stored as the completion instant, so a record can never be
/// completed without a `completed_at` timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyProgress {
    completed_milestones: BTreeSet<String>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl JourneyProgress {
    pub(crate) const fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            completed_milestones: BTreeSet::new(),
            started_at,
            completed_at: None,
        }
    }

    pub(crate) fn from_parts(
        completed_milestones: BTreeSet<String>,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            completed_milestones,
            started_at,
            completed_at,
        }
    }

    #[must_use]
    pub const fn completed_milestones(&self) -> &BTreeSet<String> {
        &self.completed_milestones
    }

    #[must_use]
    pub fn has_completed(&self, milestone_id: &str) -> bool {
        self.completed_milestones.contains(milestone_id)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_milestones.len()
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub const fn status(&self) -> JourneyStatus {
        if self.is_completed() {
            JourneyStatus::Completed
        } else {
            JourneyStatus::InProgress
        }
    }

    /// Returns false when the milestone was already recorded.
    pub(crate) fn record_milestone(&mut self, milestone_id: &str) -> bool {
        if self.completed_milestones.contains(milestone_id) {
            return false;
        }
        self.completed_milestones.insert(milestone_id.to_string())
    }

    /// Returns false when the journey was already completed.
    pub(crate) fn mark_completed(&mut self, at: DateTime<Utc>) -> bool {
        if self.completed_at.is_some() {
            return false;
        }
        self.completed_at = Some(at);
        true
    }
}

/// Process-wide aggregate statistics for the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_steps: u64,
    /// Meters.
    pub total_distance: u64,
    pub journeys_completed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn completion_is_set_once() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap();
        let mut record = JourneyProgress::new(start);
        assert_eq!(record.status(), JourneyStatus::InProgress);
        assert!(record.mark_completed(later));
        assert!(!record.mark_completed(start));
        assert_eq!(record.completed_at(), Some(later));
        assert_eq!(record.status(), JourneyStatus::Completed);
    }

    #[test]
    fn milestones_are_recorded_once() {
        let mut record = JourneyProgress::new(Utc::now());
        assert!(record.record_milestone("emmaus-start"));
        assert!(!record.record_milestone("emmaus-start"));
        assert_eq!(record.completed_count(), 1);
    }
}
