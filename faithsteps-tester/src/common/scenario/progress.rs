use anyhow::{Context, Result, ensure};
use chrono::{TimeDelta, TimeZone, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use std::sync::Arc;

use faithsteps_core::numbers::ratio;
use faithsteps_core::{
    Clock, FixedClock, JourneyStatus, JourneyUpdate, MilestoneUpdate, ProgressSnapshot,
    ProgressStore,
};

use super::ScenarioCtx;
use crate::common::journey_rng;

const TOLERANCE: f64 = 1e-9;

fn fresh_store(ctx: &ScenarioCtx<'_>) -> Result<ProgressStore<FixedClock>> {
    let start = Utc
        .with_ymd_and_hms(2025, 1, 1, 6, 0, 0)
        .single()
        .context("fixed scenario start time")?;
    let offset = i64::try_from(ctx.iteration).unwrap_or(i64::MAX);
    let clock = FixedClock::new(start + TimeDelta::days(offset.min(10_000)));
    Ok(ProgressStore::with_clock(Arc::clone(ctx.catalog), clock))
}

/// Complete every journey `journey_id` depends on, deepest first.
fn complete_prerequisites<C: Clock>(store: &mut ProgressStore<C>, journey_id: &str) -> Result<()> {
    let requirements = store
        .catalog()
        .get_journey_by_id(journey_id)
        .map(|j| j.unlock_requirements.clone())
        .unwrap_or_default();
    for requirement in requirements {
        if store.is_journey_completed(&requirement) {
            continue;
        }
        complete_prerequisites(store, &requirement)?;
        store.start_journey(&requirement)?;
        store.complete_journey(&requirement)?;
    }
    Ok(())
}

/// Walk a journey start to finish, checking progress and idempotence at each step.
pub fn progress_walkthrough(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let journey = ctx.journey;
    let mut store = fresh_store(ctx)?;
    complete_prerequisites(&mut store, &journey.id)?;
    ensure!(
        store.is_journey_unlocked(&journey.id),
        "prerequisites completed but journey still locked"
    );

    let baseline = store.totals().journeys_completed;
    store.set_active_journey(&journey.id)?;
    ensure!(
        store.journey_status(&journey.id) == JourneyStatus::InProgress,
        "selecting the journey should start it"
    );
    ensure!(
        store.get_journey_progress(&journey.id).abs() < TOLERANCE,
        "fresh journey reports progress"
    );

    let count = journey.milestones.len();
    for (index, milestone) in journey.milestones.iter().enumerate() {
        ensure!(
            store.is_milestone_unlocked(&journey.id, &milestone.id),
            "{} locked after completing its predecessor",
            milestone.id
        );
        ensure!(
            store.complete_milestone(&journey.id, &milestone.id)? == MilestoneUpdate::Recorded,
            "{} was not recorded",
            milestone.id
        );
        ensure!(
            store.complete_milestone(&journey.id, &milestone.id)?
                == MilestoneUpdate::AlreadyCompleted,
            "{} recorded twice",
            milestone.id
        );
        let expected = ratio(index + 1, count);
        let actual = store.get_journey_progress(&journey.id);
        ensure!(
            (actual - expected).abs() < TOLERANCE,
            "progress {actual} after {} milestones, expected {expected}",
            index + 1
        );
    }

    ensure!(
        store.complete_journey(&journey.id)? == JourneyUpdate::Completed,
        "journey did not complete"
    );
    store.clock().advance(TimeDelta::hours(1));
    ensure!(
        store.complete_journey(&journey.id)? == JourneyUpdate::AlreadyCompleted,
        "journey completed twice"
    );
    ensure!(
        store.totals().journeys_completed == baseline + 1,
        "journeys completed moved from {baseline} to {}",
        store.totals().journeys_completed
    );
    ensure!(
        store.current_milestone_index(&journey.id) == Some(count - 1)
            && store.last_completed_index(&journey.id) == Some(count - 1),
        "finished journey should rest on its last milestone"
    );
    if ctx.verbose {
        eprintln!("     ↳ {} walked in {count} milestones", journey.id);
    }
    Ok(())
}

/// Complete milestones in a shuffled order and check the unlock rule after every step.
pub fn milestone_unlocks(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let journey = ctx.journey;
    let mut store = fresh_store(ctx)?;
    complete_prerequisites(&mut store, &journey.id)?;
    let mut rng = journey_rng(&journey.id, ctx.iteration);
    let mut order: Vec<usize> = (0..journey.milestones.len()).collect();
    order.shuffle(&mut rng);

    let mut completed = BTreeSet::new();
    for step in order {
        store.complete_milestone(&journey.id, &journey.milestones[step].id)?;
        completed.insert(step);
        for (index, milestone) in journey.milestones.iter().enumerate() {
            let expected = index == 0 || completed.contains(&(index - 1));
            ensure!(
                store.is_milestone_unlocked(&journey.id, &milestone.id) == expected,
                "{} unlock state wrong after completing {:?}",
                milestone.id,
                completed
            );
        }
    }

    ensure!(
        !store.is_milestone_unlocked(&journey.id, "no-such-milestone"),
        "unknown milestone reported unlocked"
    );
    ensure!(
        !store.is_milestone_unlocked("no-such-journey", &journey.milestones[0].id),
        "unknown journey reported unlocked"
    );
    let foreign = ctx
        .catalog
        .journeys()
        .iter()
        .find(|other| other.id != journey.id)
        .and_then(|other| other.first_milestone());
    if let Some(foreign) = foreign {
        let before = store.snapshot();
        ensure!(
            store.complete_milestone(&journey.id, &foreign.id).is_err(),
            "foreign milestone {} accepted",
            foreign.id
        );
        ensure!(store.snapshot() == before, "rejected milestone changed state");
    }
    Ok(())
}

/// Build a random store state, persist it as JSON and restore it into a fresh store.
pub fn snapshot_roundtrip(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let journey = ctx.journey;
    let mut rng = journey_rng(&journey.id, ctx.iteration);
    let mut store = fresh_store(ctx)?;
    if rng.gen_bool(0.5) {
        complete_prerequisites(&mut store, &journey.id)?;
    }

    if store.is_journey_unlocked(&journey.id) {
        if rng.gen_bool(0.5) {
            store.set_active_journey(&journey.id)?;
        }
        for milestone in &journey.milestones {
            if rng.gen_bool(0.6) {
                store.complete_milestone(&journey.id, &milestone.id)?;
            }
        }
    } else {
        let first = &journey.milestones[0].id;
        ensure!(
            store.complete_milestone(&journey.id, first).is_err()
                && store.progress_for(&journey.id).is_none(),
            "locked journey accepted milestone {first}"
        );
    }
    if store.progress_for(&journey.id).is_some() && rng.gen_bool(0.3) {
        store.clock().advance(TimeDelta::days(rng.gen_range(1..30)));
        store.complete_journey(&journey.id)?;
    }
    store.update_total_steps(rng.gen_range(0..25_000));
    store.record_distance(rng.gen_range(0..20_000));

    let json = store.snapshot().to_json()?;
    let mut restored = fresh_store(ctx)?;
    restored.restore(ProgressSnapshot::from_json(&json)?)?;

    ensure!(
        restored.snapshot() == store.snapshot(),
        "restored snapshot differs:\n{json}"
    );
    for milestone in &journey.milestones {
        ensure!(
            restored.is_milestone_unlocked(&journey.id, &milestone.id)
                == store.is_milestone_unlocked(&journey.id, &milestone.id),
            "{} unlock state changed across restore",
            milestone.id
        );
    }
    ensure!(
        restored.journey_status(&journey.id) == store.journey_status(&journey.id),
        "journey status changed across restore"
    );
    Ok(())
}
