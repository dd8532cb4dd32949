//! Deterministic trail layout for the journey map.
//!
//! A journey's milestones are laid out as a seeded random walk: x advances by
//! a profile-dependent spacing, y wanders within a safe band. The walk is a
//! pure function of the milestone list, so the same journey always draws the
//! same terrain. Points are joined with cubic curves whose control points sit
//! at a fixed fraction of the horizontal gap.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

use crate::constants::{
    GENTLE_CANVAS_HEIGHT, GENTLE_SPACING_BASE, GENTLE_SPACING_VARIANCE, GENTLE_Y_JUMP,
    JAGGED_CANVAS_HEIGHT, JAGGED_SPACING_BASE, JAGGED_SPACING_VARIANCE, JAGGED_Y_JUMP,
    SWOOPING_CANVAS_HEIGHT, SWOOPING_SPACING_BASE, SWOOPING_SPACING_VARIANCE, SWOOPING_Y_JUMP,
    TERRAIN_STREAM_TAG, TRAIL_CONTROL_FRACTION, TRAIL_ORIGIN_X, TRAIL_SAFE_MARGIN,
};
use crate::data::Milestone;
use crate::numbers::round_to_hundredths;
use crate::seed::{derive_stream_seed, trail_seed};

/// Errors raised when validating a [`PathConfig`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathConfigError {
    #[error("at least one terrain profile is required")]
    NoProfiles,
    #[error("{field} must be finite and at least {min} (got {value})")]
    BelowMinimum {
        field: String,
        min: f64,
        value: f64,
    },
    #[error("{field} must be within [{min}, {max}] (got {value})")]
    RangeViolation {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("profile `{profile}` canvas height {height} leaves no room inside a {margin} margin")]
    CanvasTooShort {
        profile: String,
        height: f64,
        margin: f64,
    },
    #[error("path config is not valid JSON: {0}")]
    Parse(String),
}

/// Parameter bundle controlling the visual shape of a trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainProfile {
    pub name: String,
    pub spacing_base: f64,
    pub spacing_variance: f64,
    pub y_jump: f64,
    pub canvas_height: f64,
}

impl TerrainProfile {
    #[must_use]
    pub fn gentle() -> Self {
        Self {
            name: "gentle".to_string(),
            spacing_base: GENTLE_SPACING_BASE,
            spacing_variance: GENTLE_SPACING_VARIANCE,
            y_jump: GENTLE_Y_JUMP,
            canvas_height: GENTLE_CANVAS_HEIGHT,
        }
    }

    #[must_use]
    pub fn jagged() -> Self {
        Self {
            name: "jagged".to_string(),
            spacing_base: JAGGED_SPACING_BASE,
            spacing_variance: JAGGED_SPACING_VARIANCE,
            y_jump: JAGGED_Y_JUMP,
            canvas_height: JAGGED_CANVAS_HEIGHT,
        }
    }

    #[must_use]
    pub fn swooping() -> Self {
        Self {
            name: "swooping".to_string(),
            spacing_base: SWOOPING_SPACING_BASE,
            spacing_variance: SWOOPING_SPACING_VARIANCE,
            y_jump: SWOOPING_Y_JUMP,
            canvas_height: SWOOPING_CANVAS_HEIGHT,
        }
    }

    fn validate(&self, margin: f64) -> Result<(), PathConfigError> {
        let field = |suffix: &str| format!("profiles.{}.{suffix}", self.name);
        if !(self.spacing_base.is_finite() && self.spacing_base > 0.0) {
            return Err(PathConfigError::BelowMinimum {
                field: field("spacing_base"),
                min: f64::MIN_POSITIVE,
                value: self.spacing_base,
            });
        }
        for (name, value) in [
            ("spacing_variance", self.spacing_variance),
            ("y_jump", self.y_jump),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PathConfigError::BelowMinimum {
                    field: field(name),
                    min: 0.0,
                    value,
                });
            }
        }
        if !(self.canvas_height.is_finite() && self.canvas_height > 2.0 * margin) {
            return Err(PathConfigError::CanvasTooShort {
                profile: self.name.clone(),
                height: self.canvas_height,
                margin,
            });
        }
        Ok(())
    }

    /// Lowest and highest y a node may take on this profile's canvas.
    #[must_use]
    pub fn safe_band(&self, margin: f64) -> (f64, f64) {
        (margin, self.canvas_height - margin)
    }
}

/// Trail synthesis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "PathConfig::default_profiles")]
    pub profiles: Vec<TerrainProfile>,
    #[serde(default = "PathConfig::default_safe_margin")]
    pub safe_margin: f64,
    #[serde(default = "PathConfig::default_origin_x")]
    pub origin_x: f64,
    #[serde(default = "PathConfig::default_control_fraction")]
    pub control_fraction: f64,
}

impl PathConfig {
    fn default_profiles() -> Vec<TerrainProfile> {
        vec![
            TerrainProfile::gentle(),
            TerrainProfile::jagged(),
            TerrainProfile::swooping(),
        ]
    }

    const fn default_safe_margin() -> f64 {
        TRAIL_SAFE_MARGIN
    }

    const fn default_origin_x() -> f64 {
        TRAIL_ORIGIN_X
    }

    const fn default_control_fraction() -> f64 {
        TRAIL_CONTROL_FRACTION
    }

    /// Parse and validate a config from JSON. Omitted fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `PathConfigError` when the JSON is malformed or a value is out of bounds.
    pub fn from_json(json: &str) -> Result<Self, PathConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| PathConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `PathConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), PathConfigError> {
        if self.profiles.is_empty() {
            return Err(PathConfigError::NoProfiles);
        }
        if !(self.safe_margin.is_finite() && self.safe_margin >= 0.0) {
            return Err(PathConfigError::BelowMinimum {
                field: "safe_margin".to_string(),
                min: 0.0,
                value: self.safe_margin,
            });
        }
        if !self.origin_x.is_finite() {
            return Err(PathConfigError::BelowMinimum {
                field: "origin_x".to_string(),
                min: f64::MIN,
                value: self.origin_x,
            });
        }
        if !(0.0..=1.0).contains(&self.control_fraction) {
            return Err(PathConfigError::RangeViolation {
                field: "control_fraction".to_string(),
                min: 0.0,
                max: 1.0,
                value: self.control_fraction,
            });
        }
        for profile in &self.profiles {
            profile.validate(self.safe_margin)?;
        }
        Ok(())
    }

    /// Profile chosen for a trail seed.
    #[must_use]
    pub fn profile_for(&self, seed: u64) -> Option<&TerrainProfile> {
        let count = u64::try_from(self.profiles.len()).ok().filter(|n| *n > 0)?;
        let index = usize::try_from(seed % count).ok()?;
        self.profiles.get(index)
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            profiles: Self::default_profiles(),
            safe_margin: Self::default_safe_margin(),
            origin_x: Self::default_origin_x(),
            control_fraction: Self::default_control_fraction(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One cubic Bézier hop from the previous end point to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicSegment {
    pub control_1: Point,
    pub control_2: Point,
    pub end: Point,
}

/// Smooth curve through a run of points: a start point plus cubic hops.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathDescriptor {
    pub start: Option<Point>,
    pub segments: Vec<CubicSegment>,
}

impl PathDescriptor {
    /// Curve through `points` with control points at `control_fraction` of each horizontal gap.
    #[must_use]
    pub fn through(points: &[Point], control_fraction: f64) -> Self {
        let segments = points
            .windows(2)
            .map(|pair| {
                let (from, to) = (pair[0], pair[1]);
                let reach = (to.x - from.x) * control_fraction;
                CubicSegment {
                    control_1: Point {
                        x: from.x + reach,
                        y: from.y,
                    },
                    control_2: Point {
                        x: to.x - reach,
                        y: to.y,
                    },
                    end: to,
                }
            })
            .collect();
        Self {
            start: points.first().copied(),
            segments,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    /// SVG path data (`M x y C ...`), coordinates rounded to two decimals.
    #[must_use]
    pub fn to_svg(&self) -> String {
        let Some(start) = self.start else {
            return String::new();
        };
        let mut out = String::new();
        let _ = write!(out, "M {}", fmt_point(start));
        for segment in &self.segments {
            let _ = write!(
                out,
                " C {} {} {}",
                fmt_point(segment.control_1),
                fmt_point(segment.control_2),
                fmt_point(segment.end)
            );
        }
        out
    }
}

fn fmt_point(point: Point) -> String {
    format!(
        "{:.2} {:.2}",
        round_to_hundredths(point.x),
        round_to_hundredths(point.y)
    )
}

/// Synthesized trail for one journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailLayout {
    pub seed: u64,
    /// Name of the terrain profile used; `None` for an empty milestone list.
    pub profile: Option<String>,
    pub width: f64,
    pub height: f64,
    pub points: Vec<Point>,
    pub full: PathDescriptor,
    /// Prefix of the trail up to and including the active milestone.
    pub active: PathDescriptor,
}

impl TrailLayout {
    fn empty() -> Self {
        Self {
            seed: 0,
            profile: None,
            width: 0.0,
            height: 0.0,
            points: Vec::new(),
            full: PathDescriptor::default(),
            active: PathDescriptor::default(),
        }
    }
}

/// Lay out `milestones` as a trail.
///
/// `active_index` selects the active prefix: `None` leaves it empty, `Some(i)`
/// covers points `0..=i`, capped at the last point. An invalid `config`
/// yields an empty layout.
#[must_use]
pub fn synthesize(
    milestones: &[Milestone],
    active_index: Option<usize>,
    config: &PathConfig,
) -> TrailLayout {
    let Some(first) = milestones.first() else {
        return TrailLayout::empty();
    };
    if let Err(err) = config.validate() {
        log::warn!("invalid trail config, skipping layout: {err}");
        return TrailLayout::empty();
    }
    let seed = trail_seed(&first.id);
    let Some(profile) = config.profile_for(seed) else {
        return TrailLayout::empty();
    };

    let points = walk(milestones.len(), seed, profile, config);
    let width = points.last().map_or(0.0, |p| p.x + config.origin_x);
    let full = PathDescriptor::through(&points, config.control_fraction);
    let active = active_index.map_or_else(PathDescriptor::default, |index| {
        let end = index.min(points.len() - 1);
        PathDescriptor::through(&points[..=end], config.control_fraction)
    });

    TrailLayout {
        seed,
        profile: Some(profile.name.clone()),
        width,
        height: profile.canvas_height,
        points,
        full,
        active,
    }
}

fn walk(count: usize, seed: u64, profile: &TerrainProfile, config: &PathConfig) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_stream_seed(seed, TERRAIN_STREAM_TAG));
    let (low, high) = profile.safe_band(config.safe_margin);
    let mut x = config.origin_x;
    let mut y = profile.canvas_height / 2.0;
    let mut points = Vec::with_capacity(count);
    points.push(Point { x, y });
    for _ in 1..count {
        let r_x = rng.r#gen::<f64>();
        let r_y = rng.r#gen::<f64>();
        x += profile.spacing_base + r_x * profile.spacing_variance;
        y = (y + (2.0 * r_y - 1.0) * profile.y_jump).clamp(low, high);
        points.push(Point { x, y });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::journey;

    fn layout(id: &str, count: usize, active: Option<usize>) -> TrailLayout {
        let distances: Vec<u32> = (0..count).map(|i| u32::try_from(i).unwrap() * 1_000).collect();
        let journey = journey(id, &distances);
        synthesize(&journey.milestones, active, &PathConfig::default())
    }

    #[test]
    fn empty_milestone_list_yields_empty_layout() {
        let trail = synthesize(&[], Some(3), &PathConfig::default());
        assert!(trail.points.is_empty());
        assert!(trail.full.is_empty());
        assert!(trail.active.is_empty());
        assert_eq!(trail.full.to_svg(), "");
    }

    #[test]
    fn single_milestone_is_a_degenerate_path() {
        let trail = layout("solo", 1, Some(0));
        assert_eq!(trail.points.len(), 1);
        assert_eq!(trail.points[0].x, TRAIL_ORIGIN_X);
        assert_eq!(trail.points[0].y, trail.height / 2.0);
        assert!(trail.full.segments.is_empty());
        assert!(!trail.active.is_empty());
        assert!(!trail.full.to_svg().contains('C'));
    }

    #[test]
    fn same_input_reproduces_identical_points() {
        let a = layout("emmaus", 12, Some(4));
        let b = layout("emmaus", 12, Some(4));
        let bits = |t: &TrailLayout| {
            t.points
                .iter()
                .map(|p| (p.x.to_bits(), p.y.to_bits()))
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.full.to_svg(), b.full.to_svg());
    }

    #[test]
    fn x_strictly_increases_and_y_stays_in_band() {
        let config = PathConfig::default();
        for id in ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"] {
            let trail = layout(id, 16, None);
            let profile = config
                .profiles
                .iter()
                .find(|p| Some(&p.name) == trail.profile.as_ref())
                .unwrap();
            let (low, high) = profile.safe_band(config.safe_margin);
            for pair in trail.points.windows(2) {
                let gap = pair[1].x - pair[0].x;
                assert!(gap >= profile.spacing_base);
                assert!(gap <= profile.spacing_base + profile.spacing_variance);
            }
            assert!(trail.points.iter().all(|p| (low..=high).contains(&p.y)));
        }
    }

    #[test]
    fn invalid_config_yields_empty_layout() {
        let distances = [0, 1_000, 2_000, 3_000];
        let journey = journey("bad-config", &distances);
        let configs = [
            PathConfig {
                safe_margin: 200.0,
                ..PathConfig::default()
            },
            PathConfig {
                profiles: Vec::new(),
                ..PathConfig::default()
            },
            PathConfig {
                control_fraction: f64::NAN,
                ..PathConfig::default()
            },
            PathConfig {
                profiles: vec![TerrainProfile {
                    spacing_base: 0.0,
                    ..TerrainProfile::gentle()
                }],
                ..PathConfig::default()
            },
        ];
        for config in &configs {
            assert!(config.validate().is_err());
            let trail = synthesize(&journey.milestones, Some(1), config);
            assert_eq!(trail, TrailLayout::empty());
        }
    }

    #[test]
    fn emmaus_layout_matches_recorded_coordinates() {
        let emmaus = crate::catalog::Catalog::builtin()
            .get_journey_by_id("road-to-emmaus")
            .unwrap();
        let trail = synthesize(&emmaus.milestones, Some(1), &PathConfig::default());
        assert_eq!(trail.seed, 0x2600_13ee_3aeb_f418);
        assert_eq!(trail.profile.as_deref(), Some("jagged"));
        assert_eq!(trail.height, 360.0);
        assert_eq!(
            trail.points,
            [
                Point { x: 60.0, y: 180.0 },
                Point {
                    x: 194.633_621_302_687_12,
                    y: 293.705_926_694_874_5,
                },
                Point {
                    x: 316.285_238_540_226_4,
                    y: 300.0,
                },
            ]
        );
        assert_eq!(
            trail.full.to_svg(),
            "M 60.00 180.00 C 120.59 180.00 134.05 293.71 194.63 293.71 \
             C 249.38 293.71 261.54 300.00 316.29 300.00"
        );
        assert_eq!(
            trail.active.to_svg(),
            "M 60.00 180.00 C 120.59 180.00 134.05 293.71 194.63 293.71"
        );
    }

    #[test]
    fn profile_follows_seed_modulo() {
        let trail = layout("gamma", 3, None);
        let expected = &PathConfig::default().profiles[usize::try_from(trail.seed % 3).unwrap()];
        assert_eq!(trail.profile.as_deref(), Some(expected.name.as_str()));
        assert_eq!(trail.height, expected.canvas_height);
    }

    #[test]
    fn active_prefix_is_capped_and_optional() {
        let none = layout("prefix", 5, None);
        assert!(none.active.is_empty());

        let partial = layout("prefix", 5, Some(2));
        assert_eq!(partial.active.segments.len(), 2);
        assert_eq!(partial.active.segments[..], partial.full.segments[..2]);

        let beyond = layout("prefix", 5, Some(99));
        assert_eq!(beyond.active, beyond.full);
    }

    #[test]
    fn control_points_sit_at_fixed_fraction() {
        let trail = layout("curves", 4, None);
        for (segment, pair) in trail.full.segments.iter().zip(trail.points.windows(2)) {
            let dx = pair[1].x - pair[0].x;
            assert!((segment.control_1.x - (pair[0].x + 0.45 * dx)).abs() < 1e-9);
            assert!((segment.control_2.x - (pair[1].x - 0.45 * dx)).abs() < 1e-9);
            assert_eq!(segment.control_1.y, pair[0].y);
            assert_eq!(segment.control_2.y, pair[1].y);
        }
    }

    #[test]
    fn svg_uses_two_decimals() {
        let path = PathDescriptor::through(
            &[Point { x: 60.0, y: 160.0 }, Point { x: 200.0, y: 100.5 }],
            0.45,
        );
        assert_eq!(
            path.to_svg(),
            "M 60.00 160.00 C 123.00 160.00 137.00 100.50 200.00 100.50"
        );
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config = PathConfig::from_json(r#"{"safe_margin": 40.0}"#).unwrap();
        assert_eq!(config.profiles.len(), 3);
        assert!((config.control_fraction - 0.45).abs() < f64::EPSILON);
    }

    #[test]
    fn config_validation_rejects_bad_values() {
        let mut config = PathConfig::default();
        config.profiles.clear();
        assert_eq!(config.validate(), Err(PathConfigError::NoProfiles));

        let mut config = PathConfig::default();
        config.control_fraction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(PathConfigError::RangeViolation { .. })
        ));

        let mut config = PathConfig::default();
        config.profiles[1].canvas_height = 100.0;
        assert!(matches!(
            config.validate(),
            Err(PathConfigError::CanvasTooShort { ref profile, .. }) if profile == "jagged"
        ));

        assert!(matches!(
            PathConfig::from_json("{"),
            Err(PathConfigError::Parse(_))
        ));
    }
}
