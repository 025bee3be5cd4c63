use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crmpilot_core::{AppConfig, RunContext, SuiteError, Urls};
use crmpilot_driver::BrowserSession;

use crate::artifacts::{self, ArtifactLinks};
use crate::report;

/// Shared handles one scenario runs against: an exclusive browser session and
/// the run configuration.
pub struct Harness {
    pub browser: BrowserSession,
    pub urls: Urls,
    pub config: AppConfig,
    pub cancel: CancellationToken,
}

pub type ScenarioFn = for<'a> fn(&'a Harness) -> BoxFuture<'a, Result<(), SuiteError>>;

/// One named test flow. The description lands in the report.
pub struct Scenario {
    pub name: &'static str,
    pub module: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed { message: String },
}

#[derive(Debug)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub module: &'static str,
    pub description: &'static str,
    pub outcome: Outcome,
    pub duration: Duration,
    pub artifacts: Option<ArtifactLinks>,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }
}

#[derive(Debug, Default)]
pub struct SuiteSummary {
    pub results: Vec<ScenarioResult>,
}

impl SuiteSummary {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn pass_rate(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.passed() as f64 / self.results.len() as f64 * 100.0
        }
    }

    pub fn fail_rate(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.failed() as f64 / self.results.len() as f64 * 100.0
        }
    }
}

/// Scenario-level assertion. The message should name expected and actual so
/// the report row is readable without the step log.
pub fn verify(condition: bool, message: impl Into<String>) -> Result<(), SuiteError> {
    if condition {
        Ok(())
    } else {
        Err(SuiteError::Other(anyhow::anyhow!(message.into())))
    }
}

/// Run every scenario against a fresh browser, collect results and write the
/// HTML report. Scenario failures are recorded, not propagated; only report
/// or filesystem failures abort the run.
pub async fn run_suite(
    config: &AppConfig,
    ctx: &RunContext,
    scenarios: &[Scenario],
    cancel: &CancellationToken,
) -> Result<SuiteSummary, SuiteError> {
    ctx.ensure_directories()
        .map_err(|e| SuiteError::Other(anyhow::anyhow!("cannot create report directories: {e}")))?;

    let urls = Urls::new(&config.sut.base_url);
    let mut summary = SuiteSummary::default();

    for scenario in scenarios {
        if cancel.is_cancelled() {
            info!("run cancelled, skipping remaining scenarios");
            break;
        }

        ctx.log_buffer.clear();
        info!(test = scenario.name, "starting scenario");
        let started = Instant::now();
        let (result, links) = run_one(config, ctx, &urls, scenario, cancel).await;
        let duration = started.elapsed();

        let outcome = match result {
            Ok(()) => {
                info!(test = scenario.name, ?duration, "scenario passed");
                Outcome::Passed
            }
            Err(e) => {
                error!(test = scenario.name, error = %e, "scenario failed");
                Outcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        summary.results.push(ScenarioResult {
            name: scenario.name,
            module: scenario.module,
            description: scenario.description,
            outcome,
            duration,
            artifacts: links,
        });
    }

    report::write_report(ctx, config, &summary)
        .map_err(|e| SuiteError::Other(anyhow::anyhow!("cannot write report: {e}")))?;
    info!(
        report = %ctx.report_path.display(),
        passed = summary.passed(),
        failed = summary.failed(),
        "run finished"
    );
    Ok(summary)
}

async fn run_one(
    config: &AppConfig,
    ctx: &RunContext,
    urls: &Urls,
    scenario: &Scenario,
    cancel: &CancellationToken,
) -> (Result<(), SuiteError>, Option<ArtifactLinks>) {
    // A fresh browser per scenario: no cookies or session state carry over.
    let browser = match BrowserSession::launch(&config.browser, &config.waits, cancel.clone()) {
        Ok(browser) => browser,
        Err(e) => return (Err(e), None),
    };
    let harness = Harness {
        browser,
        urls: urls.clone(),
        config: config.clone(),
        cancel: cancel.clone(),
    };

    let result = (scenario.run)(&harness).await;
    let links = if result.is_err() {
        Some(artifacts::capture_failure_bundle(
            &harness.browser,
            ctx,
            scenario.name,
        ))
    } else {
        None
    };
    (result, links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &'static str, outcome: Outcome) -> ScenarioResult {
        ScenarioResult {
            name,
            module: "login",
            description: "",
            outcome,
            duration: Duration::from_secs(1),
            artifacts: None,
        }
    }

    #[test]
    fn verify_failure_keeps_the_message() {
        let err = verify(false, "expected 'a', got 'b'").unwrap_err();
        assert!(err.to_string().contains("expected 'a', got 'b'"));
        assert!(verify(true, "unused").is_ok());
    }

    #[test]
    fn summary_rates() {
        let mut summary = SuiteSummary::default();
        summary.results.push(result("a", Outcome::Passed));
        summary.results.push(result(
            "b",
            Outcome::Failed {
                message: "boom".to_string(),
            },
        ));
        summary.results.push(result("c", Outcome::Passed));

        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failed(), 1);
        assert!((summary.pass_rate() - 66.666).abs() < 0.01);
        assert!((summary.fail_rate() - 33.333).abs() < 0.01);
    }

    #[test]
    fn empty_summary_has_zero_rates() {
        let summary = SuiteSummary::default();
        assert_eq!(summary.pass_rate(), 0.0);
        assert_eq!(summary.fail_rate(), 0.0);
    }
}
