//! Scenario runner
//!
//! Prints `Running tests...` and one `Test i of n: description` line per
//! step, followed by the step's assertions. With `json` set the progress
//! lines are replaced by the serialized report.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{CliError, CliResult};
use crate::scenarios::{self, AssertionResult, Assertions, Scenario};

/// Runner settings
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Only run this scenario
    pub scenario: Option<String>,
    /// Stop after the first failing step
    pub fail_fast: bool,
    /// Emit the report as JSON instead of progress lines
    pub json: bool,
    /// Also write the JSON report here
    pub report_path: Option<PathBuf>,
}

/// Result of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// 1-based step number
    pub index: usize,
    /// Step description
    pub description: String,
    /// Whether every assertion held
    pub passed: bool,
    /// Individual assertions
    pub assertions: Vec<AssertionResult>,
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Steps that ran
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    /// Whether every step passed
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.passed)
    }
}

/// Result of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Per-scenario results
    pub scenarios: Vec<ScenarioReport>,
    /// Passed assertions
    pub passed: usize,
    /// Failed assertions
    pub failed: usize,
}

impl RunReport {
    /// No assertion failed
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    fn add(&mut self, scenario: ScenarioReport) {
        for step in &scenario.steps {
            for assertion in &step.assertions {
                if assertion.passed {
                    self.passed += 1;
                } else {
                    self.failed += 1;
                }
            }
        }
        self.scenarios.push(scenario);
    }
}

/// Runs bundled scenarios
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Create a runner
    pub fn new(config: RunnerConfig) -> Self {
        Runner { config }
    }

    fn selected(&self) -> CliResult<Vec<&'static Scenario>> {
        match &self.config.scenario {
            Some(name) => scenarios::find(name)
                .map(|s| vec![s])
                .ok_or_else(|| CliError::UnknownScenario(name.clone())),
            None => Ok(scenarios::catalogue().iter().collect()),
        }
    }

    /// Run the selected scenarios, writing progress or JSON to `out`
    pub fn run(&self, out: &mut dyn Write) -> CliResult<RunReport> {
        let selected = self.selected()?;
        let mut report = RunReport::default();

        for scenario in selected {
            let result = self.run_scenario(scenario, out)?;
            let stop = self.config.fail_fast && !result.passed();
            report.add(result);
            if stop {
                tracing::info!(scenario = scenario.name, "stopping after first failure");
                break;
            }
        }

        if self.config.json {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{} passed, {} failed", report.passed, report.failed)?;
        }

        if let Some(path) = &self.config.report_path {
            std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
            tracing::debug!(path = %path.display(), "report written");
        }

        Ok(report)
    }

    fn run_scenario(&self, scenario: &Scenario, out: &mut dyn Write) -> CliResult<ScenarioReport> {
        let quiet = self.config.json;
        let _span = tracing::info_span!("scenario", name = scenario.name).entered();
        let mut result = ScenarioReport {
            name: scenario.name.to_string(),
            steps: Vec::new(),
        };

        if !quiet {
            writeln!(out, "Running tests... ({})", scenario.name)?;
        }

        let mut fixture = match (scenario.setup)() {
            Ok(fixture) => fixture,
            Err(e) => {
                tracing::warn!(error = %e, "scenario setup failed");
                let mut a = Assertions::new();
                a.aborted(&e);
                if !quiet {
                    writeln!(out, "  setup failed: {}", e)?;
                }
                result.steps.push(StepReport {
                    index: 0,
                    description: "setup".to_string(),
                    passed: false,
                    assertions: a.take(),
                });
                return Ok(result);
            }
        };

        let total = scenario.steps.len();
        for (i, step) in scenario.steps.iter().enumerate() {
            if !quiet {
                writeln!(out, "Test {} of {}: {}", i + 1, total, step.description)?;
            }
            let mut a = Assertions::new();
            if let Err(e) = (step.run)(&mut fixture, &mut a) {
                a.aborted(&e);
            }
            if !quiet {
                for assertion in a.results() {
                    write_assertion(out, assertion)?;
                }
            }
            let passed = a.failures() == 0;
            result.steps.push(StepReport {
                index: i + 1,
                description: step.description.to_string(),
                passed,
                assertions: a.take(),
            });
            if !passed && self.config.fail_fast {
                break;
            }
        }

        Ok(result)
    }
}

fn write_assertion(out: &mut dyn Write, assertion: &AssertionResult) -> CliResult<()> {
    if assertion.passed {
        writeln!(out, "  ok - {}", assertion.message)?;
    } else {
        match &assertion.detail {
            Some(detail) => writeln!(out, "  not ok - {} ({})", assertion.message, detail)?,
            None => writeln!(out, "  not ok - {}", assertion.message)?,
        }
    }
    Ok(())
}

/// Print the catalogue
pub fn list_scenarios(out: &mut dyn Write) -> CliResult<()> {
    for scenario in scenarios::catalogue() {
        writeln!(
            out,
            "{:<12} {} ({} steps)",
            scenario.name,
            scenario.summary,
            scenario.steps.len()
        )?;
    }
    Ok(())
}
