use tracing::{error, info};

use crmpilot_core::{ArtifactKind, RunContext};
use crmpilot_driver::{capture_network_records, BrowserSession};

/// Report-relative links to the diagnostics of one failed scenario. Each link
/// is present only if that artifact was actually written.
#[derive(Debug, Clone, Default)]
pub struct ArtifactLinks {
    pub step_log: Option<String>,
    pub screenshot: Option<String>,
    pub network_log: Option<String>,
}

impl ArtifactLinks {
    pub fn is_empty(&self) -> bool {
        self.step_log.is_none() && self.screenshot.is_none() && self.network_log.is_none()
    }
}

/// Collect the diagnostic bundle for a failed scenario: buffered step logs,
/// a screenshot and the network trace. Best effort, a capture failure never
/// masks the scenario's own error.
pub fn capture_failure_bundle(
    browser: &BrowserSession,
    ctx: &RunContext,
    test_name: &str,
) -> ArtifactLinks {
    let mut links = ArtifactLinks {
        step_log: persist_step_log(ctx, test_name),
        ..Default::default()
    };

    let screenshot_path = ctx.artifact_path(ArtifactKind::Screenshot, test_name);
    match browser.screenshot(&screenshot_path) {
        Ok(()) => links.screenshot = Some(ctx.link_from_report(&screenshot_path)),
        Err(e) => error!(test = test_name, error = %e, "screenshot capture failed"),
    }

    let network_path = ctx.artifact_path(ArtifactKind::NetworkLog, test_name);
    match capture_network_records(browser)
        .map_err(anyhow::Error::from)
        .and_then(|records| Ok(serde_json::to_vec_pretty(&records)?))
        .and_then(|json| Ok(std::fs::write(&network_path, json)?))
    {
        Ok(()) => {
            info!(test = test_name, path = %network_path.display(), "network log saved");
            links.network_log = Some(ctx.link_from_report(&network_path));
        }
        Err(e) => error!(test = test_name, error = %e, "network log capture failed"),
    }

    links
}

/// Drain the in-memory step log into a per-test file.
pub fn persist_step_log(ctx: &RunContext, test_name: &str) -> Option<String> {
    let contents = ctx.log_buffer.drain();
    if contents.is_empty() {
        return None;
    }
    let path = ctx.artifact_path(ArtifactKind::StepLog, test_name);
    match std::fs::write(&path, contents) {
        Ok(()) => {
            info!(test = test_name, path = %path.display(), "step log saved");
            Some(ctx.link_from_report(&path))
        }
        Err(e) => {
            error!(test = test_name, error = %e, "step log capture failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    // Stand-in for the fmt layer writing into the shared buffer.
    fn write_line(ctx: &RunContext, line: &str) {
        let mut writer = ctx.log_buffer.make_writer();
        writeln!(writer, "{line}").unwrap();
    }

    #[test]
    fn step_log_is_persisted_and_linked_relative_to_report() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::with_stamp(dir.path(), "2025_06_01_T10_30");
        ctx.ensure_directories().unwrap();

        write_line(&ctx, "filled email field");
        write_line(&ctx, "clicked submit");

        let link = persist_step_log(&ctx, "test_login_valid").unwrap();
        assert_eq!(link, "test_steps_logs/test_login_valid_2025_06_01_T10_30.log");

        let saved =
            std::fs::read_to_string(dir.path().join("test_steps_logs/test_login_valid_2025_06_01_T10_30.log"))
                .unwrap();
        assert!(saved.contains("filled email field"));
        assert!(saved.contains("clicked submit"));
        // Drained: a second call finds nothing.
        assert!(persist_step_log(&ctx, "test_login_valid").is_none());
    }

    #[test]
    fn empty_buffer_yields_no_link() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::with_stamp(dir.path(), "2025_06_01_T10_30");
        ctx.ensure_directories().unwrap();
        assert!(persist_step_log(&ctx, "test_x").is_none());
    }
}
