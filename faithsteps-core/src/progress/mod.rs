//! Progress store: per-journey completion state and aggregate statistics for the local user.
//!
//! The store is an explicitly constructed, exclusively owned value. Every
//! mutation goes through its methods, is applied in full before it returns,
//! and notifies subscribers with a single [`ProgressEvent`].

pub mod clock;
pub mod event;
pub mod record;
pub mod snapshot;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::data::Journey;
use crate::numbers::{apply_signed_delta, ratio};

pub use clock::{Clock, FixedClock, SystemClock};
pub use event::ProgressEvent;
pub use record::{JourneyProgress, JourneyStatus, Totals};
pub use snapshot::{JourneyProgressSnapshot, ProgressSnapshot, SnapshotError};

/// Rejected progress mutations. The store is unchanged whenever one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("journey `{0}` is not in the catalog")]
    UnknownJourney(String),
    #[error("milestone `{milestone}` does not belong to journey `{journey}`")]
    MilestoneNotInJourney { journey: String, milestone: String },
    #[error("journey `{journey}` is locked until {missing:?} are completed")]
    JourneyLocked {
        journey: String,
        missing: Vec<String>,
    },
    #[error("journey `{0}` has not been started")]
    NotStarted(String),
}

/// Outcome of recording a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneUpdate {
    Recorded,
    AlreadyCompleted,
}

/// Outcome of completing a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyUpdate {
    Completed,
    AlreadyCompleted,
}

/// Outcome of starting a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyStart {
    Started,
    AlreadyStarted,
}

/// Single-user progress state bound to a content catalog.
#[derive(Debug)]
pub struct ProgressStore<C: Clock = SystemClock> {
    catalog: Arc<Catalog>,
    clock: C,
    active_journey_id: Option<String>,
    journey_progress: BTreeMap<String, JourneyProgress>,
    totals: Totals,
    subscribers: Vec<Sender<ProgressEvent>>,
}

impl ProgressStore<SystemClock> {
    /// Empty store using wall-clock timestamps.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_clock(catalog, SystemClock)
    }
}

impl<C: Clock> ProgressStore<C> {
    /// Empty store using the supplied clock for timestamps.
    #[must_use]
    pub fn with_clock(catalog: Arc<Catalog>, clock: C) -> Self {
        Self {
            catalog,
            clock,
            active_journey_id: None,
            journey_progress: BTreeMap::new(),
            totals: Totals::default(),
            subscribers: Vec::new(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Register for change notifications. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<ProgressEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: &ProgressEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn journey(&self, journey_id: &str) -> Result<&Journey, ProgressError> {
        self.catalog
            .get_journey_by_id(journey_id)
            .ok_or_else(|| ProgressError::UnknownJourney(journey_id.to_string()))
    }

    /// Select the journey the user is currently walking, starting it if needed.
    ///
    /// # Errors
    ///
    /// Fails for journeys missing from the catalog or whose unlock requirements
    /// are not yet completed.
    pub fn set_active_journey(&mut self, journey_id: &str) -> Result<(), ProgressError> {
        self.ensure_unlocked(journey_id)?;
        let started = self.insert_record_if_absent(journey_id);
        self.active_journey_id = Some(journey_id.to_string());
        log::debug!("active journey set to `{journey_id}` (started: {started})");
        self.emit(&ProgressEvent::ActiveJourneyChanged {
            journey_id: journey_id.to_string(),
            started,
        });
        Ok(())
    }

    #[must_use]
    pub fn active_journey_id(&self) -> Option<&str> {
        self.active_journey_id.as_deref()
    }

    /// Active journey resolved through the catalog; `None` if unset or dangling.
    #[must_use]
    pub fn get_active_journey(&self) -> Option<&Journey> {
        self.catalog
            .get_journey_by_id(self.active_journey_id.as_deref()?)
    }

    /// Create the progress record for a journey without changing the active selection.
    ///
    /// # Errors
    ///
    /// Fails for unknown or locked journeys.
    pub fn start_journey(&mut self, journey_id: &str) -> Result<JourneyStart, ProgressError> {
        self.ensure_unlocked(journey_id)?;
        if !self.insert_record_if_absent(journey_id) {
            return Ok(JourneyStart::AlreadyStarted);
        }
        log::debug!("journey `{journey_id}` started");
        self.emit(&ProgressEvent::JourneyStarted {
            journey_id: journey_id.to_string(),
        });
        Ok(JourneyStart::Started)
    }

    /// Record a milestone as completed, creating the journey's record on first use.
    ///
    /// Recording an already-completed milestone is a no-op.
    ///
    /// # Errors
    ///
    /// Fails when the journey is unknown, the milestone belongs to another
    /// journey, or the journey has no record yet and is still locked.
    pub fn complete_milestone(
        &mut self,
        journey_id: &str,
        milestone_id: &str,
    ) -> Result<MilestoneUpdate, ProgressError> {
        let milestone_count = {
            let journey = self.journey(journey_id)?;
            if !journey.contains_milestone(milestone_id) {
                return Err(ProgressError::MilestoneNotInJourney {
                    journey: journey_id.to_string(),
                    milestone: milestone_id.to_string(),
                });
            }
            journey.milestones.len()
        };
        if !self.journey_progress.contains_key(journey_id) {
            self.ensure_unlocked(journey_id)?;
        }

        let now = self.clock.now();
        let record = self
            .journey_progress
            .entry(journey_id.to_string())
            .or_insert_with(|| JourneyProgress::new(now));
        if !record.record_milestone(milestone_id) {
            return Ok(MilestoneUpdate::AlreadyCompleted);
        }
        let completed_count = record.completed_count();

        log::debug!(
            "milestone `{milestone_id}` completed on `{journey_id}` ({completed_count}/{milestone_count})"
        );
        self.emit(&ProgressEvent::MilestoneCompleted {
            journey_id: journey_id.to_string(),
            milestone_id: milestone_id.to_string(),
            completed_count,
            milestone_count,
        });
        Ok(MilestoneUpdate::Recorded)
    }

    /// Mark a started journey completed and count it exactly once.
    ///
    /// # Errors
    ///
    /// Fails when the journey is unknown or has no progress record.
    pub fn complete_journey(&mut self, journey_id: &str) -> Result<JourneyUpdate, ProgressError> {
        self.journey(journey_id)?;
        let now = self.clock.now();
        let Some(record) = self.journey_progress.get_mut(journey_id) else {
            return Err(ProgressError::NotStarted(journey_id.to_string()));
        };
        if !record.mark_completed(now) {
            return Ok(JourneyUpdate::AlreadyCompleted);
        }
        self.totals.journeys_completed = self.totals.journeys_completed.saturating_add(1);

        log::debug!(
            "journey `{journey_id}` completed ({} total)",
            self.totals.journeys_completed
        );
        self.emit(&ProgressEvent::JourneyCompleted {
            journey_id: journey_id.to_string(),
            journeys_completed: self.totals.journeys_completed,
        });
        Ok(JourneyUpdate::Completed)
    }

    /// Add a signed step delta; the total never drops below zero. Returns the new total.
    pub fn update_total_steps(&mut self, delta: i64) -> u64 {
        self.totals.total_steps = apply_signed_delta(self.totals.total_steps, delta);
        let total_steps = self.totals.total_steps;
        self.emit(&ProgressEvent::StepsUpdated { total_steps });
        total_steps
    }

    /// Add a signed distance delta in meters; clamps at zero. Returns the new total.
    pub fn record_distance(&mut self, delta_meters: i64) -> u64 {
        self.totals.total_distance = apply_signed_delta(self.totals.total_distance, delta_meters);
        let total_distance = self.totals.total_distance;
        self.emit(&ProgressEvent::DistanceUpdated { total_distance });
        total_distance
    }

    /// Drop every progress record and zero the counters. The active selection is kept.
    pub fn reset(&mut self) {
        self.journey_progress.clear();
        self.totals = Totals::default();
        log::debug!("progress reset");
        self.emit(&ProgressEvent::Reset);
    }

    /// Completed share of a journey's milestones in `[0, 1]`.
    #[must_use]
    pub fn get_journey_progress(&self, journey_id: &str) -> f64 {
        let (Some(journey), Some(record)) = (
            self.catalog.get_journey_by_id(journey_id),
            self.journey_progress.get(journey_id),
        ) else {
            return 0.0;
        };
        ratio(record.completed_count(), journey.milestones.len()).min(1.0)
    }

    /// First milestone is always unlocked; later ones once their predecessor is completed.
    #[must_use]
    pub fn is_milestone_unlocked(&self, journey_id: &str, milestone_id: &str) -> bool {
        let Some(journey) = self.catalog.get_journey_by_id(journey_id) else {
            return false;
        };
        match journey.milestone_index(milestone_id) {
            None => false,
            Some(0) => true,
            Some(index) => {
                let previous = &journey.milestones[index - 1].id;
                self.journey_progress
                    .get(journey_id)
                    .is_some_and(|record| record.has_completed(previous))
            }
        }
    }

    /// Whether every journey this one requires has been completed.
    #[must_use]
    pub fn is_journey_unlocked(&self, journey_id: &str) -> bool {
        self.catalog
            .is_journey_unlocked(journey_id, |id| self.is_journey_completed(id))
    }

    #[must_use]
    pub fn is_journey_completed(&self, journey_id: &str) -> bool {
        self.journey_progress
            .get(journey_id)
            .is_some_and(JourneyProgress::is_completed)
    }

    #[must_use]
    pub fn journey_status(&self, journey_id: &str) -> JourneyStatus {
        self.journey_progress
            .get(journey_id)
            .map_or(JourneyStatus::NotStarted, JourneyProgress::status)
    }

    #[must_use]
    pub fn progress_for(&self, journey_id: &str) -> Option<&JourneyProgress> {
        self.journey_progress.get(journey_id)
    }

    /// Index of the first incomplete milestone, or the last index when all are done.
    #[must_use]
    pub fn current_milestone_index(&self, journey_id: &str) -> Option<usize> {
        let journey = self.catalog.get_journey_by_id(journey_id)?;
        let last = journey.milestones.len().checked_sub(1)?;
        let record = self.journey_progress.get(journey_id);
        let first_open = journey
            .milestones
            .iter()
            .position(|m| !record.is_some_and(|r| r.has_completed(&m.id)));
        Some(first_open.unwrap_or(last))
    }

    /// Index ending the contiguous run of completed milestones from the start.
    #[must_use]
    pub fn last_completed_index(&self, journey_id: &str) -> Option<usize> {
        let journey = self.catalog.get_journey_by_id(journey_id)?;
        let record = self.journey_progress.get(journey_id)?;
        let run = journey
            .milestones
            .iter()
            .take_while(|m| record.has_completed(&m.id))
            .count();
        run.checked_sub(1)
    }

    #[must_use]
    pub const fn totals(&self) -> Totals {
        self.totals
    }

    /// Plain-data image of the store for persistence.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            active_journey_id: self.active_journey_id.clone(),
            journey_progress: self
                .journey_progress
                .iter()
                .map(|(id, record)| (id.clone(), JourneyProgressSnapshot::from(record)))
                .collect(),
            total_steps: self.totals.total_steps,
            total_distance: self.totals.total_distance,
            journeys_completed: self.totals.journeys_completed,
        }
    }

    /// Replace the store's state with a snapshot.
    ///
    /// Records for journeys missing from the catalog and milestone ids foreign
    /// to their journey are dropped. The active id is restored as-is, even if
    /// it no longer resolves.
    ///
    /// # Errors
    ///
    /// Fails, leaving the store unchanged, when a record's completion flag and
    /// completion time disagree.
    pub fn restore(&mut self, snapshot: ProgressSnapshot) -> Result<(), SnapshotError> {
        let mut records = BTreeMap::new();
        for (journey_id, entry) in snapshot.journey_progress {
            let Some(journey) = self.catalog.get_journey_by_id(&journey_id) else {
                log::warn!("dropping progress for unknown journey `{journey_id}` from snapshot");
                continue;
            };
            let record = entry.into_record(journey)?;
            records.insert(journey_id, record);
        }

        self.journey_progress = records;
        self.active_journey_id = snapshot.active_journey_id;
        self.totals = Totals {
            total_steps: snapshot.total_steps,
            total_distance: snapshot.total_distance,
            journeys_completed: snapshot.journeys_completed,
        };
        log::debug!(
            "progress restored: {} journeys tracked",
            self.journey_progress.len()
        );
        self.emit(&ProgressEvent::Restored);
        Ok(())
    }

    fn ensure_unlocked(&self, journey_id: &str) -> Result<(), ProgressError> {
        let journey = self.journey(journey_id)?;
        let missing: Vec<String> = journey
            .unlock_requirements
            .iter()
            .filter(|id| !self.is_journey_completed(id))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProgressError::JourneyLocked {
                journey: journey_id.to_string(),
                missing,
            })
        }
    }

    fn insert_record_if_absent(&mut self, journey_id: &str) -> bool {
        if self.journey_progress.contains_key(journey_id) {
            return false;
        }
        let now = self.clock.now();
        self.journey_progress
            .insert(journey_id.to_string(), JourneyProgress::new(now));
        true
    }
}
