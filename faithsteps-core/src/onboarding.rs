//! Onboarding preferences and daily step-goal helpers.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    DEFAULT_DAILY_STEP_GOAL, MAX_DAILY_STEP_GOAL, MIN_DAILY_STEP_GOAL, STEP_GOAL_INCREMENT,
};
use crate::numbers::u64_to_f64;

/// Quick-pick activity levels offered while choosing a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPreset {
    Lightly,
    Moderately,
    Highly,
}

impl GoalPreset {
    pub const ALL: [Self; 3] = [Self::Lightly, Self::Moderately, Self::Highly];

    #[must_use]
    pub const fn steps(self) -> u32 {
        match self {
            Self::Lightly => 5_000,
            Self::Moderately => 7_500,
            Self::Highly => 10_000,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lightly => "Lightly",
            Self::Moderately => "Moderately",
            Self::Highly => "Highly",
        }
    }

    /// Preset whose step count matches `steps` exactly.
    #[must_use]
    pub fn matching(steps: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.steps() == steps)
    }
}

impl fmt::Display for GoalPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Choices captured during onboarding, persisted as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingPreferences {
    pub is_onboarding_complete: bool,
    pub selected_journey_id: Option<String>,
    pub daily_step_goal: u32,
    pub notifications_enabled: bool,
}

impl Default for OnboardingPreferences {
    fn default() -> Self {
        Self {
            is_onboarding_complete: false,
            selected_journey_id: None,
            daily_step_goal: DEFAULT_DAILY_STEP_GOAL,
            notifications_enabled: false,
        }
    }
}

impl OnboardingPreferences {
    pub fn complete_onboarding(&mut self) {
        self.is_onboarding_complete = true;
    }

    pub fn set_journey_id(&mut self, journey_id: impl Into<String>) {
        self.selected_journey_id = Some(journey_id.into());
    }

    /// Set the daily goal, clamped to the supported range. Returns the stored value.
    pub fn set_step_goal(&mut self, steps: u32) -> u32 {
        self.daily_step_goal = clamp_step_goal(steps);
        self.daily_step_goal
    }

    pub fn increment_step_goal(&mut self) -> u32 {
        self.set_step_goal(self.daily_step_goal.saturating_add(STEP_GOAL_INCREMENT))
    }

    pub fn decrement_step_goal(&mut self) -> u32 {
        self.set_step_goal(self.daily_step_goal.saturating_sub(STEP_GOAL_INCREMENT))
    }

    pub fn apply_preset(&mut self, preset: GoalPreset) -> u32 {
        self.set_step_goal(preset.steps())
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.notifications_enabled = enabled;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Bring externally loaded values back into range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.daily_step_goal = clamp_step_goal(self.daily_step_goal);
        self
    }
}

fn clamp_step_goal(steps: u32) -> u32 {
    steps.clamp(MIN_DAILY_STEP_GOAL, MAX_DAILY_STEP_GOAL)
}

/// Fraction of the daily goal reached, capped at 1. A zero goal reports 0.
#[must_use]
pub fn daily_goal_progress(current_steps: u64, goal: u32) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    (u64_to_f64(current_steps) / f64::from(goal)).min(1.0)
}
