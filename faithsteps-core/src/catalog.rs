//! Content catalog: the fixed, ordered set of journeys and read-only queries over it.
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use thiserror::Error;

use crate::data::{Category, Difficulty, Journey, Milestone, Season};

/// Errors raised when catalog content violates its structural invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Malformed(String),
    #[error("journey id `{0}` appears more than once")]
    DuplicateJourney(String),
    #[error("journey `{0}` has no milestones")]
    EmptyJourney(String),
    #[error("journey `{journey}` repeats milestone id `{milestone}`")]
    DuplicateMilestone { journey: String, milestone: String },
    #[error("journey `{journey}` starts at {distance} m instead of 0")]
    NonZeroStart { journey: String, distance: u32 },
    #[error("journey `{journey}` milestone `{milestone}` moves backwards ({previous} m -> {distance} m)")]
    DecreasingDistance {
        journey: String,
        milestone: String,
        previous: u32,
        distance: u32,
    },
    #[error("journey `{journey}` milestone `{milestone}` has order {order} at index {index}")]
    OrderMismatch {
        journey: String,
        milestone: String,
        order: usize,
        index: usize,
    },
    #[error("journey `{journey}` declares total {declared} m but its last milestone is at {last} m")]
    TotalDistanceMismatch {
        journey: String,
        declared: u32,
        last: u32,
    },
    #[error("journey `{journey}` requires unknown journey `{requirement}`")]
    UnknownRequirement { journey: String, requirement: String },
    #[error("unlock requirements form a cycle through `{0}`")]
    RequirementCycle(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    journeys: Vec<Journey>,
}

/// Immutable, validated collection of journeys in catalog order.
#[derive(Debug, Clone)]
pub struct Catalog {
    journeys: Vec<Journey>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from journeys, validating every structural invariant.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] encountered.
    pub fn new(journeys: Vec<Journey>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(journeys.len());
        for (position, journey) in journeys.iter().enumerate() {
            if index.insert(journey.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateJourney(journey.id.clone()));
            }
        }
        let catalog = Self { journeys, index };
        for journey in &catalog.journeys {
            validate_journey(journey)?;
            catalog.validate_links(journey)?;
        }
        catalog.validate_acyclic()?;
        Ok(catalog)
    }

    /// Parse and validate a catalog from a JSON document of the form `{"journeys": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Malformed`] for unparseable JSON, or any validation error.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|err| CatalogError::Malformed(err.to_string()))?;
        Self::new(file.journeys)
    }

    /// Catalog shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset fails validation.
    pub fn load_builtin() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("../assets/journeys.json"))
    }

    /// Process-wide shared copy of the shipped catalog, parsed on first use.
    ///
    /// Falls back to an empty catalog if the embedded asset fails validation.
    #[must_use]
    pub fn builtin() -> &'static Self {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            Self::load_builtin().unwrap_or_else(|err| {
                log::error!("bundled journey catalog rejected: {err}");
                Self {
                    journeys: Vec::new(),
                    index: HashMap::new(),
                }
            })
        })
    }

    /// All journeys in catalog order.
    #[must_use]
    pub fn journeys(&self) -> &[Journey] {
        &self.journeys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.journeys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.journeys.is_empty()
    }

    #[must_use]
    pub fn get_journey_by_id(&self, id: &str) -> Option<&Journey> {
        self.index.get(id).and_then(|&i| self.journeys.get(i))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn get_journeys_by_difficulty(&self, difficulty: Difficulty) -> Vec<&Journey> {
        self.filter(|j| j.difficulty == difficulty)
    }

    #[must_use]
    pub fn get_journeys_by_category(&self, category: Category) -> Vec<&Journey> {
        self.filter(|j| j.category == category)
    }

    #[must_use]
    pub fn get_featured_journeys(&self) -> Vec<&Journey> {
        self.filter(|j| j.is_featured)
    }

    #[must_use]
    pub fn get_seasonal_journeys(&self, season: Season) -> Vec<&Journey> {
        self.filter(|j| j.is_seasonal_in(season))
    }

    /// Seasonal journeys whose window contains the given calendar day.
    #[must_use]
    pub fn get_journeys_in_season_on(&self, month: u32, day: u32) -> Vec<&Journey> {
        self.filter(|j| {
            j.seasonal
                .as_ref()
                .is_some_and(|window| window.is_active_on(month, day))
        })
    }

    /// Resolve `next_part` one hop; `None` when absent or dangling.
    #[must_use]
    pub fn get_next_journey_in_series(&self, journey_id: &str) -> Option<&Journey> {
        let current = self.get_journey_by_id(journey_id)?;
        let next = current.next_part.as_deref()?;
        self.get_journey_by_id(next)
    }

    /// Members of a series ordered by part number, then catalog order.
    #[must_use]
    pub fn get_series(&self, part_of: &str) -> Vec<&Journey> {
        let mut members = self.filter(|j| j.part_of.as_deref() == Some(part_of));
        members.sort_by_key(|j| j.part_number.unwrap_or(u32::MAX));
        members
    }

    #[must_use]
    pub fn get_milestone(&self, journey_id: &str, milestone_id: &str) -> Option<&Milestone> {
        self.get_journey_by_id(journey_id)?.milestone(milestone_id)
    }

    #[must_use]
    pub fn milestone_index(&self, journey_id: &str, milestone_id: &str) -> Option<usize> {
        self.get_journey_by_id(journey_id)?
            .milestone_index(milestone_id)
    }

    /// Whether every unlock requirement of `journey_id` satisfies `is_completed`.
    /// Unknown journeys are never unlocked.
    #[must_use]
    pub fn is_journey_unlocked(&self, journey_id: &str, is_completed: impl Fn(&str) -> bool) -> bool {
        self.get_journey_by_id(journey_id).is_some_and(|journey| {
            journey
                .unlock_requirements
                .iter()
                .all(|requirement| is_completed(requirement))
        })
    }

    fn filter(&self, predicate: impl Fn(&Journey) -> bool) -> Vec<&Journey> {
        self.journeys.iter().filter(|j| predicate(j)).collect()
    }

    fn validate_links(&self, journey: &Journey) -> Result<(), CatalogError> {
        for requirement in &journey.unlock_requirements {
            if !self.contains(requirement) {
                return Err(CatalogError::UnknownRequirement {
                    journey: journey.id.clone(),
                    requirement: requirement.clone(),
                });
            }
        }
        if let Some(next) = journey.next_part.as_deref()
            && !self.contains(next)
        {
            log::warn!(
                "journey `{}` points at unpublished next part `{next}`",
                journey.id
            );
        }
        Ok(())
    }

    fn validate_acyclic(&self) -> Result<(), CatalogError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            Visiting,
            Done,
        }

        fn visit(catalog: &Catalog, at: usize, marks: &mut [Mark]) -> Result<(), CatalogError> {
            match marks[at] {
                Mark::Done => return Ok(()),
                Mark::Visiting => {
                    return Err(CatalogError::RequirementCycle(
                        catalog.journeys[at].id.clone(),
                    ));
                }
                Mark::Unvisited => {}
            }
            marks[at] = Mark::Visiting;
            for requirement in &catalog.journeys[at].unlock_requirements {
                if let Some(&next) = catalog.index.get(requirement) {
                    visit(catalog, next, marks)?;
                }
            }
            marks[at] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.journeys.len()];
        for start in 0..self.journeys.len() {
            visit(self, start, &mut marks)?;
        }
        Ok(())
    }
}

fn validate_journey(journey: &Journey) -> Result<(), CatalogError> {
    let Some(first) = journey.milestones.first() else {
        return Err(CatalogError::EmptyJourney(journey.id.clone()));
    };
    if first.distance_from_start != 0 {
        return Err(CatalogError::NonZeroStart {
            journey: journey.id.clone(),
            distance: first.distance_from_start,
        });
    }

    let mut seen = HashSet::with_capacity(journey.milestones.len());
    let mut previous = 0;
    for (index, milestone) in journey.milestones.iter().enumerate() {
        if !seen.insert(milestone.id.as_str()) {
            return Err(CatalogError::DuplicateMilestone {
                journey: journey.id.clone(),
                milestone: milestone.id.clone(),
            });
        }
        if milestone.order != index {
            return Err(CatalogError::OrderMismatch {
                journey: journey.id.clone(),
                milestone: milestone.id.clone(),
                order: milestone.order,
                index,
            });
        }
        if milestone.distance_from_start < previous {
            return Err(CatalogError::DecreasingDistance {
                journey: journey.id.clone(),
                milestone: milestone.id.clone(),
                previous,
                distance: milestone.distance_from_start,
            });
        }
        previous = milestone.distance_from_start;
    }

    if journey.total_distance != previous {
        return Err(CatalogError::TotalDistanceMismatch {
            journey: journey.id.clone(),
            declared: journey.total_distance,
            last: previous,
        });
    }
    Ok(())
}
