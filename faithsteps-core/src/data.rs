//! Journey content records: journeys, milestones and scripture references.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Short list of free-form tags.
pub type TagList = SmallVec<[String; 4]>;

/// Bible translation a scripture excerpt is quoted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BibleVersion {
    #[default]
    #[serde(rename = "NIV")]
    Niv,
    #[serde(rename = "ESV")]
    Esv,
    #[serde(rename = "KJV")]
    Kjv,
}

/// A quoted scripture passage attached to a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scripture {
    pub reference: String,
    pub text: String,
    #[serde(default)]
    pub version: BibleVersion,
    #[serde(default)]
    pub tags: TagList,
}

/// Geographic coordinate carried through for display only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A single waypoint within a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub description: String,
    /// Meters from the journey start.
    pub distance_from_start: u32,
    /// Informational share of the journey, 0-100. Trusted as given.
    #[serde(default)]
    pub percent_of_journey: f64,
    #[serde(default)]
    pub location: GeoPoint,
    #[serde(default)]
    pub scriptures: Vec<Scripture>,
    #[serde(default)]
    pub historical_context: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub reflection_prompt: String,
    /// Position within the parent journey; always equals the index.
    pub order: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Epic,
}

impl Difficulty {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Epic => "epic",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    OldTestament,
    NewTestament,
    Pilgrimage,
}

impl Category {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OldTestament => "old_testament",
            Self::NewTestament => "new_testament",
            Self::Pilgrimage => "pilgrimage",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Advent,
    Lent,
    Easter,
}

/// Calendar window (`MM-DD` bounds, inclusive) during which a seasonal journey is promoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalWindow {
    pub season: Season,
    pub start_date: String,
    pub end_date: String,
}

impl SeasonalWindow {
    /// Whether the window contains the given calendar day.
    ///
    /// Windows whose end precedes their start wrap across the new year.
    /// Malformed bounds never match.
    #[must_use]
    pub fn is_active_on(&self, month: u32, day: u32) -> bool {
        let (Some(start), Some(end)) = (
            parse_month_day(&self.start_date),
            parse_month_day(&self.end_date),
        ) else {
            return false;
        };
        let today = (month, day);
        if start <= end {
            start <= today && today <= end
        } else {
            today >= start || today <= end
        }
    }
}

fn parse_month_day(raw: &str) -> Option<(u32, u32)> {
    let (month, day) = raw.trim().split_once('-')?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    ((1..=12).contains(&month) && (1..=31).contains(&day)).then_some((month, day))
}

/// A named, ordered sequence of milestones representing a themed walking route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    /// Meters; equals the last milestone's distance.
    pub total_distance: u32,
    #[serde(default)]
    pub estimated_days: u32,
    #[serde(default)]
    pub start_location: GeoPoint,
    #[serde(default)]
    pub end_location: GeoPoint,
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub featured_image_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlock_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_parts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_part: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal: Option<SeasonalWindow>,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub tags: TagList,
}

impl Journey {
    /// Index of a milestone within this journey.
    #[must_use]
    pub fn milestone_index(&self, milestone_id: &str) -> Option<usize> {
        self.milestones.iter().position(|m| m.id == milestone_id)
    }

    /// Find a milestone by id.
    #[must_use]
    pub fn milestone(&self, milestone_id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == milestone_id)
    }

    #[must_use]
    pub fn contains_milestone(&self, milestone_id: &str) -> bool {
        self.milestone_index(milestone_id).is_some()
    }

    #[must_use]
    pub fn first_milestone(&self) -> Option<&Milestone> {
        self.milestones.first()
    }

    #[must_use]
    pub fn is_seasonal_in(&self, season: Season) -> bool {
        self.seasonal.as_ref().is_some_and(|s| s.season == season)
    }
}
