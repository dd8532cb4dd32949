use anyhow::Result;
use std::sync::Arc;

use faithsteps_core::{Catalog, Journey};

pub mod catalog;
pub mod progress;
pub mod trail;

/// Inputs handed to a scenario check for one iteration.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioCtx<'a> {
    pub catalog: &'a Arc<Catalog>,
    pub journey: &'a Journey,
    pub iteration: usize,
    pub verbose: bool,
}

pub type ScenarioCheck = fn(&ScenarioCtx<'_>) -> Result<()>;

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: String,
    pub check: ScenarioCheck,
}

impl TestScenario {
    #[must_use]
    pub fn new(key: &'static str, name: impl Into<String>, check: ScenarioCheck) -> Self {
        Self {
            key,
            name: name.into(),
            check,
        }
    }
}

const SCENARIOS: &[(&str, &str, ScenarioCheck)] = &[
    (
        "catalog-integrity",
        "Catalog Integrity",
        catalog::catalog_integrity,
    ),
    (
        "progress-walkthrough",
        "Progress Walkthrough",
        progress::progress_walkthrough,
    ),
    (
        "milestone-unlocks",
        "Milestone Unlocks",
        progress::milestone_unlocks,
    ),
    (
        "path-determinism",
        "Path Determinism",
        trail::path_determinism,
    ),
    ("path-bounds", "Path Bounds", trail::path_bounds),
    (
        "snapshot-roundtrip",
        "Snapshot Roundtrip",
        progress::snapshot_roundtrip,
    ),
];

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let wanted = name.to_lowercase();
    let key = match wanted.as_str() {
        "catalog" => "catalog-integrity",
        "walkthrough" => "progress-walkthrough",
        "unlocks" => "milestone-unlocks",
        "determinism" => "path-determinism",
        "bounds" => "path-bounds",
        "snapshot" => "snapshot-roundtrip",
        other => other,
    };
    SCENARIOS
        .iter()
        .find(|(candidate, _, _)| *candidate == key)
        .map(|&(key, name, check)| TestScenario::new(key, name, check))
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.iter().map(|&(key, name, _)| (key, name)).collect()
}

pub fn scenario_keys() -> Vec<&'static str> {
    SCENARIOS.iter().map(|&(key, _, _)| key).collect()
}
