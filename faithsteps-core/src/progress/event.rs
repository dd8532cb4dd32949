//! Change notifications emitted by the progress store.
use serde::{Deserialize, Serialize};

/// Emitted once per successful mutation, after the state is fully updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressEvent {
    ActiveJourneyChanged {
        journey_id: String,
        /// True when selecting the journey created its progress record.
        started: bool,
    },
    JourneyStarted {
        journey_id: String,
    },
    MilestoneCompleted {
        journey_id: String,
        milestone_id: String,
        completed_count: usize,
        milestone_count: usize,
    },
    JourneyCompleted {
        journey_id: String,
        journeys_completed: u32,
    },
    StepsUpdated {
        total_steps: u64,
    },
    DistanceUpdated {
        total_distance: u64,
    },
    Reset,
    Restored,
}

impl ProgressEvent {
    /// Journey the event concerns, if any.
    #[must_use]
    pub fn journey_id(&self) -> Option<&str> {
        match self {
            Self::ActiveJourneyChanged { journey_id, .. }
            | Self::JourneyStarted { journey_id }
            | Self::MilestoneCompleted { journey_id, .. }
            | Self::JourneyCompleted { journey_id, .. } => Some(journey_id),
            Self::StepsUpdated { .. }
            | Self::DistanceUpdated { .. }
            | Self::Reset
            | Self::Restored => None,
        }
    }
}
