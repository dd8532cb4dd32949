use std::collections::BTreeSet;
use std::hash::Hasher;

use faithsteps_core::{Catalog, JourneyMapView, PathConfig, TrailLayout, synthesize};
use twox_hash::XxHash64;

fn trail_digest(trail: &TrailLayout) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    for point in &trail.points {
        hasher.write_u64(point.x.to_bits());
        hasher.write_u64(point.y.to_bits());
    }
    hasher.write(trail.full.to_svg().as_bytes());
    hasher.finish()
}

#[test]
fn catalog_trails_are_reproducible() {
    let config = PathConfig::default();
    for journey in Catalog::builtin().journeys() {
        let first = synthesize(&journey.milestones, Some(1), &config);
        let second = synthesize(&journey.milestones, Some(1), &config);
        assert_eq!(trail_digest(&first), trail_digest(&second), "{}", journey.id);
        assert_eq!(first.points.len(), journey.milestones.len());
    }
}

const RECORDED_PATHS: &[(&str, &str, &str)] = &[
    (
        "road-to-emmaus",
        "jagged",
        "M 60.00 180.00 C 120.59 180.00 134.05 293.71 194.63 293.71 C 249.38 293.71 261.54 300.00 316.29 300.00",
    ),
    (
        "jericho-to-jerusalem",
        "jagged",
        "M 60.00 180.00 C 113.95 180.00 125.94 172.83 179.89 172.83 C 239.39 172.83 252.61 279.99 312.10 279.99",
    ),
    (
        "exodus-part-1",
        "jagged",
        "M 60.00 180.00 C 120.30 180.00 133.70 135.99 194.01 135.99 C 247.42 135.99 259.29 252.13 312.71 252.13 C 363.95 252.13 375.34 240.33 426.58 240.33",
    ),
    (
        "exodus-part-2",
        "jagged",
        "M 60.00 180.00 C 116.94 180.00 129.60 248.84 186.54 248.84 C 236.82 248.84 248.00 300.00 298.28 300.00 C 351.96 300.00 363.88 263.15 417.57 263.15 C 470.19 263.15 481.89 300.00 534.51 300.00",
    ),
    (
        "paul-journey-1a",
        "swooping",
        "M 60.00 210.00 C 145.53 210.00 164.54 87.84 250.07 87.84 C 331.34 87.84 349.40 60.00 430.68 60.00",
    ),
    (
        "mary-joseph-bethlehem",
        "jagged",
        "M 60.00 180.00 C 122.10 180.00 135.89 224.90 197.99 224.90 C 256.75 224.90 269.81 212.18 328.56 212.18",
    ),
    (
        "exodus-part-3",
        "gentle",
        "M 60.00 160.00 C 134.48 160.00 151.03 138.42 225.52 138.42 C 299.74 138.42 316.24 104.90 390.46 104.90",
    ),
    (
        "jesus-galilee",
        "swooping",
        "M 60.00 210.00 C 139.83 210.00 157.57 205.61 237.41 205.61 C 321.31 205.61 339.95 228.75 423.85 228.75 C 500.39 228.75 517.40 250.17 593.94 250.17 C 685.92 250.17 706.36 137.06 798.33 137.06 C 890.14 137.06 910.54 174.50 1002.35 174.50",
    ),
];

#[test]
fn catalog_trails_match_recorded_paths() {
    let config = PathConfig::default();
    assert_eq!(RECORDED_PATHS.len(), Catalog::builtin().len());
    for &(id, profile, svg) in RECORDED_PATHS {
        let journey = Catalog::builtin().get_journey_by_id(id).unwrap();
        let trail = synthesize(&journey.milestones, None, &config);
        assert_eq!(trail.profile.as_deref(), Some(profile), "{id}");
        assert_eq!(trail.full.to_svg(), svg, "{id}");
        assert!(trail.active.is_empty());
    }
}

#[test]
fn catalog_trails_stay_on_canvas() {
    let config = PathConfig::default();
    for journey in Catalog::builtin().journeys() {
        let trail = synthesize(&journey.milestones, None, &config);
        assert!(
            trail.points.windows(2).all(|w| w[0].x < w[1].x),
            "{} folds back",
            journey.id
        );
        let low = config.safe_margin;
        let high = trail.height - config.safe_margin;
        assert!(
            trail.points.iter().all(|p| p.y >= low && p.y <= high),
            "{} leaves the safe band",
            journey.id
        );
        assert!(trail.width > trail.points.last().unwrap().x);
    }
}

#[test]
fn distinct_journeys_draw_distinct_trails() {
    let config = PathConfig::default();
    let digests: BTreeSet<u64> = Catalog::builtin()
        .journeys()
        .iter()
        .map(|journey| trail_digest(&synthesize(&journey.milestones, None, &config)))
        .collect();
    assert_eq!(digests.len(), Catalog::builtin().len());
}

#[test]
fn map_view_reuses_synthesized_points() {
    let journey = Catalog::builtin().get_journey_by_id("jesus-galilee").unwrap();
    let view = JourneyMapView::build(journey, &BTreeSet::new(), &PathConfig::default());
    let trail = synthesize(&journey.milestones, Some(0), &PathConfig::default());
    assert_eq!(trail_digest(&view.trail), trail_digest(&trail));
    let positions: Vec<_> = view.nodes.iter().filter_map(|n| n.position).collect();
    assert_eq!(positions.len(), view.nodes.len());
    assert_eq!(positions, trail.points);
}
