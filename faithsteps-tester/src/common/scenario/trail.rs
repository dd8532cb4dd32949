use anyhow::{Result, ensure};
use std::collections::BTreeSet;

use faithsteps_core::{JourneyMapView, NodeState, PathConfig, TrailLayout, synthesize, trail_seed};

use super::ScenarioCtx;

fn point_bits(trail: &TrailLayout) -> Vec<(u64, u64)> {
    trail
        .points
        .iter()
        .map(|p| (p.x.to_bits(), p.y.to_bits()))
        .collect()
}

/// Two runs over the same milestones must agree bit for bit.
pub fn path_determinism(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let milestones = &ctx.journey.milestones;
    let config = PathConfig::default();
    let active = Some(ctx.iteration % milestones.len().max(1));

    let first = synthesize(milestones, active, &config);
    let second = synthesize(milestones, active, &config);
    ensure!(
        point_bits(&first) == point_bits(&second),
        "points differ between runs"
    );
    ensure!(
        first.full.to_svg() == second.full.to_svg()
            && first.active.to_svg() == second.active.to_svg(),
        "path data differs between runs"
    );

    let seed = trail_seed(&milestones[0].id);
    ensure!(first.seed == seed, "trail seed {} != {seed}", first.seed);
    let index = usize::try_from(seed % u64::try_from(config.profiles.len())?)?;
    ensure!(
        first.profile.as_deref() == Some(config.profiles[index].name.as_str()),
        "profile {:?} does not follow the seed",
        first.profile
    );
    Ok(())
}

/// Geometry and map-state invariants for one journey.
pub fn path_bounds(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let milestones = &ctx.journey.milestones;
    let config = PathConfig::default();
    let trail = synthesize(milestones, Some(ctx.iteration), &config);
    ensure!(
        trail.points.len() == milestones.len(),
        "{} points for {} milestones",
        trail.points.len(),
        milestones.len()
    );

    let profile = config
        .profiles
        .iter()
        .find(|p| Some(p.name.as_str()) == trail.profile.as_deref())
        .ok_or_else(|| anyhow::anyhow!("unknown profile {:?}", trail.profile))?;
    let (low, high) = profile.safe_band(config.safe_margin);
    for (index, pair) in trail.points.windows(2).enumerate() {
        let gap = pair[1].x - pair[0].x;
        ensure!(
            gap >= profile.spacing_base && gap <= profile.spacing_base + profile.spacing_variance,
            "gap {gap} before node {} outside the {} spacing",
            index + 1,
            profile.name
        );
    }
    for (index, point) in trail.points.iter().enumerate() {
        ensure!(
            (low..=high).contains(&point.y),
            "node {index} at y={} leaves the safe band [{low}, {high}]",
            point.y
        );
    }
    let expected_segments = ctx.iteration.min(milestones.len() - 1);
    ensure!(
        trail.active.segments.len() == expected_segments,
        "active path has {} segments, expected {expected_segments}",
        trail.active.segments.len()
    );

    let done = ctx.iteration % (milestones.len() + 1);
    let completed: BTreeSet<String> = milestones
        .iter()
        .take(done)
        .map(|m| m.id.clone())
        .collect();
    let view = JourneyMapView::build(ctx.journey, &completed, &config);
    let current = done.min(milestones.len() - 1);
    ensure!(
        view.current_index == Some(current),
        "current node {:?}, expected {current}",
        view.current_index
    );
    ensure!(
        view.completed_count() == done,
        "{} completed nodes, expected {done}",
        view.completed_count()
    );
    let active_connectors = view.connectors.iter().filter(|c| c.active).count();
    ensure!(
        active_connectors == current,
        "{active_connectors} active connectors, expected {current}"
    );
    if done < milestones.len() {
        ensure!(
            view.nodes[current].state == NodeState::Current,
            "node {current} should be current"
        );
    }
    Ok(())
}
