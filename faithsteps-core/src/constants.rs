//! Centralized tuning constants for FaithSteps core logic.
//!
//! Trail geometry, step-goal bounds and storage keys live here so that the
//! deterministic math can only be adjusted through reviewed code changes.

// Storage keys -------------------------------------------------------------
pub const ONBOARDING_STORAGE_KEY: &str = "onboarding-storage";
pub const PROGRESS_STORAGE_KEY: &str = "journey-progress";

// Step goals ---------------------------------------------------------------
pub const DEFAULT_DAILY_STEP_GOAL: u32 = 5_000;
pub const MIN_DAILY_STEP_GOAL: u32 = 1_000;
pub const MAX_DAILY_STEP_GOAL: u32 = 50_000;
pub const STEP_GOAL_INCREMENT: u32 = 100;

// Trail geometry -----------------------------------------------------------
pub(crate) const TRAIL_ORIGIN_X: f64 = 60.0;
pub(crate) const TRAIL_SAFE_MARGIN: f64 = 60.0;
pub(crate) const TRAIL_CONTROL_FRACTION: f64 = 0.45;
pub(crate) const TERRAIN_STREAM_TAG: &[u8] = b"terrain";

pub(crate) const GENTLE_SPACING_BASE: f64 = 140.0;
pub(crate) const GENTLE_SPACING_VARIANCE: f64 = 40.0;
pub(crate) const GENTLE_Y_JUMP: f64 = 60.0;
pub(crate) const GENTLE_CANVAS_HEIGHT: f64 = 320.0;

pub(crate) const JAGGED_SPACING_BASE: f64 = 110.0;
pub(crate) const JAGGED_SPACING_VARIANCE: f64 = 30.0;
pub(crate) const JAGGED_Y_JUMP: f64 = 120.0;
pub(crate) const JAGGED_CANVAS_HEIGHT: f64 = 360.0;

pub(crate) const SWOOPING_SPACING_BASE: f64 = 170.0;
pub(crate) const SWOOPING_SPACING_VARIANCE: f64 = 60.0;
pub(crate) const SWOOPING_Y_JUMP: f64 = 160.0;
pub(crate) const SWOOPING_CANVAS_HEIGHT: f64 = 420.0;

// Map labels ---------------------------------------------------------------
pub(crate) const METERS_PER_KILOMETER: f64 = 1_000.0;
