//! Self-contained HTML report: summary header with pass/fail rates, one row
//! per scenario with its description, failure message and artifact links.

use std::fmt::Write as _;
use std::io;

use crmpilot_core::{AppConfig, RunContext};

use crate::suite::{Outcome, SuiteSummary};

pub fn write_report(
    ctx: &RunContext,
    config: &AppConfig,
    summary: &SuiteSummary,
) -> io::Result<()> {
    let html = render_report(config, summary);
    std::fs::write(&ctx.report_path, html)
}

pub fn render_report(config: &AppConfig, summary: &SuiteSummary) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(&config.sut.report_title()));
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n");

    let _ = writeln!(html, "<h3>{}</h3>", escape(&config.sut.report_title()));
    let _ = writeln!(html, "<h3>Pass Rate: {:.2}%</h3>", summary.pass_rate());
    let _ = writeln!(html, "<h3>Fail Rate: {:.2}%</h3>", summary.fail_rate());
    let _ = writeln!(
        html,
        "<p>{} total, {} passed, {} failed</p>",
        summary.results.len(),
        summary.passed(),
        summary.failed()
    );

    html.push_str("<table id=\"results-table\">\n<tr>");
    for header in [
        "Result",
        "Module",
        "Test",
        "Description",
        "Failure message",
        "Duration",
        "Artifacts",
    ] {
        let _ = write!(html, "<th>{header}</th>");
    }
    html.push_str("</tr>\n");

    for result in &summary.results {
        let (class, label, failure) = match &result.outcome {
            Outcome::Passed => ("passed", "Passed", String::new()),
            Outcome::Failed { message } => ("failed", "Failed", breakable(&escape(message))),
        };

        let mut artifacts = String::new();
        if let Some(links) = result.artifacts.as_ref().filter(|l| !l.is_empty()) {
            artifacts.push_str("<div class='links-col'>");
            for (href, label) in [
                (&links.step_log, "Test steps"),
                (&links.screenshot, "Screenshot"),
                (&links.network_log, "Network Logs"),
            ] {
                if let Some(href) = href {
                    let _ = write!(
                        artifacts,
                        "<a href=\"{}\" target=\"_blank\">{label}</a><br>",
                        escape(href)
                    );
                }
            }
            artifacts.push_str("</div>");
        }

        let _ = writeln!(
            html,
            "<tr class=\"{class}\"><td>{label}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{failure}</td><td>{:.2}s</td><td class='links-col'>{artifacts}</td></tr>",
            escape(result.module),
            escape(result.name),
            escape(result.description),
            result.duration.as_secs_f64(),
        );
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

const STYLE: &str = "<style>\n\
    body { font-family: sans-serif; margin: 1em 2em; }\n\
    table#results-table { table-layout: fixed; width: 100%; border-collapse: collapse; }\n\
    table#results-table th, table#results-table td { border: 1px solid #ccc; padding: 4px 8px;\n\
        word-wrap: break-word; overflow-wrap: break-word; text-align: left; }\n\
    table#results-table th:nth-child(1), table#results-table td:nth-child(1) { width: 5%; }\n\
    table#results-table th:nth-child(2), table#results-table td:nth-child(2) { width: 9%; }\n\
    table#results-table th:nth-child(3), table#results-table td:nth-child(3) { width: 21%; }\n\
    table#results-table th:nth-child(4), table#results-table td:nth-child(4) { width: 25%; }\n\
    table#results-table th:nth-child(5), table#results-table td:nth-child(5) { width: 28%; }\n\
    table#results-table th:nth-child(6), table#results-table td:nth-child(6) { width: 5%; }\n\
    table#results-table th:nth-child(7), table#results-table td:nth-child(7) { width: 7%; }\n\
    tr.passed td:first-child { color: #0a7d00; font-weight: bold; }\n\
    tr.failed td:first-child { color: #c00000; font-weight: bold; }\n\
</style>\n";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Preserve the message layout inside a table cell.
fn breakable(text: &str) -> String {
    text.replace(' ', "&nbsp;").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactLinks;
    use crate::suite::ScenarioResult;
    use std::time::Duration;

    fn sample_config() -> AppConfig {
        toml::from_str(
            r#"
            [sut]
            name = "RapidoCRM"
            version = "1"
            environment = "PROD"
            base_url = "https://crm.rapidosoftware.com"

            [browser]
            headless = true

            [waits]
            explicit_wait_secs = 10
            page_load_timeout_secs = 30

            [mailbox]
            server = "imap.example.com"
            folder = "INBOX"
            address_prefix = "qa"
            address_domain = "example.com"
            subject_keyword = "mot de passe"

            [artifacts]
            report_dir = "reports"
        "#,
        )
        .unwrap()
    }

    fn summary() -> SuiteSummary {
        let mut summary = SuiteSummary::default();
        summary.results.push(ScenarioResult {
            name: "test_login_valid_before_company",
            module: "login",
            description: "A user without a company lands on company registration",
            outcome: Outcome::Passed,
            duration: Duration::from_millis(2500),
            artifacts: None,
        });
        summary.results.push(ScenarioResult {
            name: "test_login_invalid_password",
            module: "login",
            description: "Wrong password is rejected",
            outcome: Outcome::Failed {
                message: "expected 'a' <b>\ngot 'b'".to_string(),
            },
            duration: Duration::from_secs(11),
            artifacts: Some(ArtifactLinks {
                step_log: Some("test_steps_logs/test_login_invalid_password_x.log".to_string()),
                screenshot: Some("screenshots/test_login_invalid_password_x.png".to_string()),
                network_log: None,
            }),
        });
        summary
    }

    #[test]
    fn report_carries_title_and_rates() {
        let html = render_report(&sample_config(), &summary());
        assert!(html.contains("Automated Test Report |RapidoCRM V1 | Environment: PROD"));
        assert!(html.contains("Pass Rate: 50.00%"));
        assert!(html.contains("Fail Rate: 50.00%"));
    }

    #[test]
    fn failure_message_is_escaped_and_line_broken() {
        let html = render_report(&sample_config(), &summary());
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("<br>"));
        assert!(!html.contains("expected 'a' <b>"));
    }

    #[test]
    fn artifact_links_are_rendered_only_when_captured() {
        let html = render_report(&sample_config(), &summary());
        assert!(html.contains("href=\"test_steps_logs/test_login_invalid_password_x.log\""));
        assert!(html.contains(">Screenshot</a>"));
        assert!(!html.contains(">Network Logs</a>"));
    }
}
