//! Scenario orchestration: launches one browser per scenario, runs the flow,
//! captures a diagnostic bundle on failure and renders the HTML report.

pub mod artifacts;
pub mod report;
pub mod scenarios;
pub mod suite;

pub use artifacts::ArtifactLinks;
pub use suite::{run_suite, verify, Harness, Outcome, Scenario, ScenarioResult, SuiteSummary};
