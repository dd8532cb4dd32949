use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use faithsteps_core::{Catalog, Journey};

use crate::common::scenario::{ScenarioCtx, TestScenario};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub journey_id: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    catalog: Arc<Catalog>,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(catalog: Arc<Catalog>, verbose: bool) -> Self {
        Self { catalog, verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        journeys: &[&Journey],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for journey in journeys {
            if self.verbose {
                eprintln!(
                    "🧪 Testing scenario: {} (journey: {})",
                    scenario.name.bright_white(),
                    journey.id
                );
            }
            results.push(self.run_single_scenario(scenario, journey, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        journey: &Journey,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for iteration in 0..iterations {
            let ctx = ScenarioCtx {
                catalog: &self.catalog,
                journey,
                iteration,
                verbose: self.verbose,
            };
            let start_time = Instant::now();
            match (scenario.check)(&ctx) {
                Ok(()) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        eprintln!(
                            "  ✅ Iteration {}/{} passed ({duration:?})",
                            iteration + 1,
                            iterations
                        );
                    }
                }
                Err(err) => {
                    let message = format!("{err:#}");
                    if self.verbose {
                        eprintln!(
                            "  ❌ Iteration {}/{} failed: {}",
                            iteration + 1,
                            iterations,
                            message.clone().red()
                        );
                    }
                    failures.push(format!(
                        "Iteration {} (journey {}): {message}",
                        iteration + 1,
                        journey.id
                    ));
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            journey_id: journey.id.clone(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
