use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crmpilot_core::{AppConfig, RunContext};
use crmpilot_runner::scenarios;
use crmpilot_runner::suite::run_suite;

/// Run the selected scenarios and return how many failed.
pub async fn run(
    config: &AppConfig,
    ctx: &RunContext,
    module: Option<&str>,
    filter: Option<&str>,
    cancel: &CancellationToken,
) -> Result<usize> {
    let mut selected = match module {
        Some(module) => {
            let selected = scenarios::for_module(module);
            anyhow::ensure!(
                !selected.is_empty(),
                "no scenarios in module '{module}' (available: {})",
                scenarios::module_names().join(", ")
            );
            selected
        }
        None => scenarios::all(),
    };
    if let Some(filter) = filter {
        selected.retain(|s| s.name.contains(filter));
        anyhow::ensure!(!selected.is_empty(), "no scenario name contains '{filter}'");
    }

    info!(
        sut = %config.sut.base_url,
        scenarios = selected.len(),
        "starting run"
    );
    let summary = run_suite(config, ctx, &selected, cancel).await?;

    println!(
        "{} scenarios: {} passed, {} failed (pass rate {:.2}%)",
        summary.results.len(),
        summary.passed(),
        summary.failed(),
        summary.pass_rate()
    );
    println!("report: {}", ctx.report_path.display());
    for result in summary.results.iter().filter(|r| !r.passed()) {
        println!("  FAILED {}", result.name);
    }

    Ok(summary.failed())
}
