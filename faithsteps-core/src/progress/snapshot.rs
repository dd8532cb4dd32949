//! Plain-data snapshot of the progress store for host-side persistence.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use super::record::JourneyProgress;
use crate::data::Journey;

/// Snapshot entry for one journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyProgressSnapshot {
    pub completed_milestones: Vec<String>,
    pub is_completed: bool,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Serializable image of the progress store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub active_journey_id: Option<String>,
    #[serde(default)]
    pub journey_progress: BTreeMap<String, JourneyProgressSnapshot>,
    #[serde(default)]
    pub total_steps: u64,
    #[serde(default)]
    pub total_distance: u64,
    #[serde(default)]
    pub journeys_completed: u32,
}

impl ProgressSnapshot {
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Reasons a snapshot cannot be restored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("journey `{0}` is marked completed without a completion time")]
    MissingCompletedAt(String),
    #[error("journey `{0}` has a completion time but is not marked completed")]
    UnexpectedCompletedAt(String),
}

impl From<&JourneyProgress> for JourneyProgressSnapshot {
    fn from(record: &JourneyProgress) -> Self {
        Self {
            completed_milestones: record.completed_milestones().iter().cloned().collect(),
            is_completed: record.is_completed(),
            started_at: record.started_at(),
            completed_at: record.completed_at(),
        }
    }
}

impl JourneyProgressSnapshot {
    /// Rebuild a record for `journey`, dropping milestone ids that do not belong to it.
    pub(crate) fn into_record(self, journey: &Journey) -> Result<JourneyProgress, SnapshotError> {
        let completed_at = match (self.is_completed, self.completed_at) {
            (true, Some(at)) => Some(at),
            (false, None) => None,
            (true, None) => return Err(SnapshotError::MissingCompletedAt(journey.id.clone())),
            (false, Some(_)) => {
                return Err(SnapshotError::UnexpectedCompletedAt(journey.id.clone()));
            }
        };
        let mut milestones = BTreeSet::new();
        for milestone_id in self.completed_milestones {
            if journey.contains_milestone(&milestone_id) {
                milestones.insert(milestone_id);
            } else {
                log::warn!(
                    "dropping milestone `{milestone_id}` foreign to journey `{}` from snapshot",
                    journey.id
                );
            }
        }
        Ok(JourneyProgress::from_parts(
            milestones,
            self.started_at,
            completed_at,
        ))
    }
}
