use anyhow::{Result, ensure};

use super::ScenarioCtx;

/// Structural invariants every shipped journey must satisfy.
pub fn catalog_integrity(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let journey = ctx.journey;
    let first = journey
        .first_milestone()
        .ok_or_else(|| anyhow::anyhow!("journey has no milestones"))?;
    ensure!(
        first.distance_from_start == 0,
        "first milestone {} starts at {}m",
        first.id,
        first.distance_from_start
    );

    for pair in journey.milestones.windows(2) {
        ensure!(
            pair[0].distance_from_start <= pair[1].distance_from_start,
            "{} ({}m) comes after {} ({}m)",
            pair[1].id,
            pair[1].distance_from_start,
            pair[0].id,
            pair[0].distance_from_start
        );
    }

    for (index, milestone) in journey.milestones.iter().enumerate() {
        ensure!(
            milestone.order == index,
            "{} has order {} at position {index}",
            milestone.id,
            milestone.order
        );
        ensure!(
            (0.0..=100.0).contains(&milestone.percent_of_journey),
            "{} reports {}% of the journey",
            milestone.id,
            milestone.percent_of_journey
        );
    }

    let last = journey.milestones.len() - 1;
    ensure!(
        journey.total_distance == journey.milestones[last].distance_from_start,
        "total distance {} differs from last milestone {}",
        journey.total_distance,
        journey.milestones[last].distance_from_start
    );

    for requirement in &journey.unlock_requirements {
        ensure!(
            ctx.catalog.contains(requirement),
            "unlock requirement {requirement} is not in the catalog"
        );
    }

    if let Some(next) = journey.next_part.as_deref() {
        let resolved = ctx.catalog.get_next_journey_in_series(&journey.id);
        if resolved.is_none() {
            log::warn!("{}: next part {next} is not published yet", journey.id);
        }
        ensure!(
            resolved.is_none_or(|j| j.id == next),
            "next part resolved to the wrong journey"
        );
    }

    ensure!(
        ctx.catalog.get_journey_by_id(&journey.id).is_some(),
        "journey cannot be looked up by id"
    );
    Ok(())
}
