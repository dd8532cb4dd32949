mod common;
mod logic;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use common::scenario::{get_scenario, list_scenarios, scenario_keys};
use common::split_csv;
use faithsteps_core::{Catalog, Journey};
use logic::LogicTester;

#[derive(Debug, Parser)]
#[command(name = "faithsteps-tester", version = "0.1.0")]
#[command(about = "Automated QA sweeps for the FaithSteps core logic")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// Journeys to exercise (comma-separated ids, or `all`)
    #[arg(long, default_value = "all")]
    journeys: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Number of iterations per scenario and journey
    #[arg(long, default_value_t = 5)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let catalog = Arc::new(Catalog::load_builtin().context("bundled journey catalog is invalid")?);
    let journeys = select_journeys(&catalog, &args.journeys)?;
    let scenarios = expand_scenarios(&args.scenarios);
    log::info!(
        "running {} scenarios over {} journeys ({} iterations)",
        scenarios.len(),
        journeys.len(),
        args.iterations
    );

    let results = run_logic_scenarios(&args, &catalog, &scenarios, &journeys);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    eprintln!("{}", "👣 FaithSteps Automated Tester".bright_cyan().bold());
    eprintln!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for key in scenario_keys() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn select_journeys<'a>(catalog: &'a Catalog, journeys_arg: &str) -> Result<Vec<&'a Journey>> {
    let requested = split_csv(journeys_arg);
    if requested.is_empty() || requested.iter().any(|id| id == "all") {
        return Ok(catalog.journeys().iter().collect());
    }
    requested
        .iter()
        .map(|id| match catalog.get_journey_by_id(id) {
            Some(journey) => Ok(journey),
            None => bail!("unknown journey: {id}"),
        })
        .collect()
}

fn run_logic_scenarios(
    args: &Args,
    catalog: &Arc<Catalog>,
    scenarios: &[String],
    journeys: &[&Journey],
) -> Vec<logic::ScenarioResult> {
    eprintln!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    eprintln!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(Arc::clone(catalog), args.verbose);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(logic_tester.run_scenario(&scenario, journeys, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn write_reports(
    args: &Args,
    results: &[logic::ScenarioResult],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# FaithSteps Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "all".to_string(),
            journeys: "all".to_string(),
            list_scenarios: false,
            iterations: 1,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "faithsteps-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn sample_result(passed: bool) -> logic::ScenarioResult {
        logic::ScenarioResult {
            scenario_name: "Path Bounds".to_string(),
            journey_id: "road-to-emmaus".to_string(),
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 2 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            average_duration: Duration::from_millis(10),
            performance_data: vec![Duration::from_millis(10)],
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("path-bounds,all");
        assert_eq!(expanded[0], "path-bounds");
        assert_eq!(expanded.len(), 6);
        assert!(expanded.contains(&"snapshot-roundtrip".to_string()));
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("snapshot,catalog");
        assert_eq!(expanded, vec!["snapshot".to_string(), "catalog".to_string()]);
    }

    #[test]
    fn select_journeys_filters_and_rejects_unknown_ids() {
        let catalog = Catalog::builtin();
        assert_eq!(select_journeys(catalog, "all").unwrap().len(), catalog.len());
        let picked = select_journeys(catalog, "exodus-part-2, road-to-emmaus").unwrap();
        let ids: Vec<&str> = picked.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["exodus-part-2", "road-to-emmaus"]);
        assert!(select_journeys(catalog, "road-to-damascus").is_err());
    }

    #[test]
    fn run_logic_scenarios_covers_each_journey() {
        let catalog = Arc::new(Catalog::builtin().clone());
        let journeys = select_journeys(&catalog, "road-to-emmaus,jesus-galilee").unwrap();
        let scenarios = vec!["path-bounds".to_string(), "bogus".to_string()];
        let results = run_logic_scenarios(&base_args(), &catalog, &scenarios, &journeys);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = temp_path("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("milestone-unlocks"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_output() {
        let temp = temp_path("report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        assert!(std::fs::read_to_string(&temp).unwrap().contains("[]"));

        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        assert!(std::fs::read_to_string(temp).unwrap().contains("scenario_name"));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = temp_path("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_console_includes_total_time() {
        let temp = temp_path("report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Total time"));
        assert!(content.contains("failure"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
