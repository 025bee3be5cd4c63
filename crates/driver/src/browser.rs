use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crmpilot_core::config::{BrowserConfig, WaitConfig};
use crmpilot_core::poll::PollConfig;
use crmpilot_core::SuiteError;

use crate::conditions::{wait_until, Condition};
use crate::probe::BrowserProbe;

/// One exclusive headless Chrome session: a launched browser, a single tab,
/// and the wait policy every interaction goes through.
pub struct BrowserSession {
    #[allow(dead_code)]
    browser: Browser,
    tab: Arc<Tab>,
    waits: WaitConfig,
    cancel: CancellationToken,
}

fn transport(e: impl std::fmt::Display) -> SuiteError {
    SuiteError::Transport(e.to_string())
}

/// Single-quoted JS string literal.
fn js_str(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

impl BrowserSession {
    pub fn launch(
        config: &BrowserConfig,
        waits: &WaitConfig,
        cancel: CancellationToken,
    ) -> Result<Self, SuiteError> {
        let mut extra_args: Vec<OsString> = Vec::new();

        // Required for running in Docker containers
        extra_args.push(OsString::from("--no-sandbox"));
        extra_args.push(OsString::from("--disable-dev-shm-usage"));
        extra_args.push(OsString::from("--disable-gpu"));
        extra_args.push(OsString::from("--disable-extensions"));
        extra_args.push(OsString::from("--disable-infobars"));
        extra_args.push(OsString::from("--disable-background-networking"));
        extra_args.push(OsString::from("--ignore-certificate-errors"));

        let mut builder = LaunchOptionsBuilder::default();
        builder
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .args(extra_args.iter().map(|a| a.as_ref()).collect());

        // Use CHROME_PATH env var if set (for Docker/custom installs)
        if let Ok(chrome_path) = std::env::var("CHROME_PATH") {
            builder.path(Some(std::path::PathBuf::from(chrome_path)));
        }

        let launch_options = builder.build().map_err(transport)?;
        let browser = Browser::new(launch_options).map_err(transport)?;
        let tab = browser.new_tab().map_err(transport)?;

        Ok(Self {
            browser,
            tab,
            waits: waits.clone(),
            cancel,
        })
    }

    fn poll_cfg(&self, deadline: std::time::Duration) -> PollConfig {
        PollConfig::new(self.waits.interval(), deadline)
    }

    /// Navigate and block until the exact URL is reached and the document is
    /// fully loaded.
    pub async fn open_url(&self, url: &str) -> Result<(), SuiteError> {
        self.tab.navigate_to(url).map_err(transport)?;
        wait_until(
            self,
            &Condition::loaded(url),
            self.poll_cfg(self.waits.page_load()),
            &self.cancel,
        )
        .await?;
        info!(url, title = %self.title().unwrap_or_default(), "page loaded");
        Ok(())
    }

    /// Navigate without asserting the destination. The app may redirect; the
    /// caller checks where the browser actually landed.
    pub async fn goto(&self, url: &str) -> Result<(), SuiteError> {
        self.tab.navigate_to(url).map_err(transport)?;
        wait_until(
            self,
            &Condition::PageReady,
            self.poll_cfg(self.waits.page_load()),
            &self.cancel,
        )
        .await?;
        info!(requested = url, landed = %self.current_url(), "navigation settled");
        Ok(())
    }

    /// History back, then wait for the document to settle.
    pub async fn navigate_back(&self) -> Result<(), SuiteError> {
        self.tab.evaluate("history.back()", false).map_err(transport)?;
        wait_until(
            self,
            &Condition::PageReady,
            self.poll_cfg(self.waits.page_load()),
            &self.cancel,
        )
        .await?;
        info!(url = %self.current_url(), "navigated back");
        Ok(())
    }

    /// Explicit wait with the configured default bound.
    pub async fn wait_for(&self, condition: &Condition) -> Result<(), SuiteError> {
        wait_until(
            self,
            condition,
            self.poll_cfg(self.waits.explicit()),
            &self.cancel,
        )
        .await
    }

    /// Did the browser reach `condition` within the explicit wait? Timeouts
    /// answer `false`; transport failures still propagate.
    pub async fn reached(&self, condition: &Condition) -> Result<bool, SuiteError> {
        match self.wait_for(condition).await {
            Ok(()) => Ok(true),
            Err(SuiteError::StateTimeout { last_state, .. }) => {
                info!(%last_state, "target state not reached");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn is_present(&self, selector: &str) -> Result<bool, SuiteError> {
        self.reached(&Condition::Visible(selector.to_string())).await
    }

    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    pub fn title(&self) -> Result<String, SuiteError> {
        self.tab.get_title().map_err(transport)
    }

    /// Fill an input through querySelector, firing the input/change events the
    /// app's validation listens on.
    pub async fn fill(&self, selector: &str, value: &str) -> Result<(), SuiteError> {
        self.wait_for(&Condition::Clickable(selector.to_string()))
            .await?;
        self.tab
            .evaluate(
                &format!(
                    r#"
                    const elem = document.querySelector({sel});
                    if (elem) {{
                        elem.value = {val};
                        elem.dispatchEvent(new Event('input', {{ bubbles: true }}));
                        elem.dispatchEvent(new Event('change', {{ bubbles: true }}));
                    }} else {{
                        throw new Error('Element not found: ' + {sel});
                    }}
                    "#,
                    sel = js_str(selector),
                    val = js_str(value),
                ),
                false,
            )
            .map_err(transport)?;

        if value.is_empty() {
            info!(selector, "field left empty");
        } else {
            info!(selector, "field filled");
        }
        Ok(())
    }

    /// Wait until the element is clickable, then click it.
    pub async fn click(&self, selector: &str) -> Result<(), SuiteError> {
        self.wait_for(&Condition::Clickable(selector.to_string()))
            .await?;
        self.tab
            .evaluate(
                &format!(
                    r#"
                    const elem = document.querySelector({sel});
                    if (elem) {{
                        elem.click();
                    }} else {{
                        throw new Error('Element not found: ' + {sel});
                    }}
                    "#,
                    sel = js_str(selector),
                ),
                false,
            )
            .map_err(transport)?;
        info!(selector, "clicked");
        Ok(())
    }

    /// Visible text of an element, falling back to its input value.
    pub async fn read_text(&self, selector: &str) -> Result<String, SuiteError> {
        self.wait_for(&Condition::Visible(selector.to_string()))
            .await?;
        let value = self.evaluate_value(&format!(
            r#"
            (() => {{
                const elem = document.querySelector({sel});
                if (!elem) return '';
                return (elem.innerText || elem.value || '').trim();
            }})()
            "#,
            sel = js_str(selector),
        ))?;
        let text = value.and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
        info!(selector, text = %text, "read text");
        Ok(text)
    }

    /// Take a screenshot for diagnostics.
    pub fn screenshot(&self, path: &Path) -> Result<(), SuiteError> {
        let data = self
            .tab
            .capture_screenshot(
                headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption::Png,
                None,
                None,
                true,
            )
            .map_err(transport)?;
        std::fs::write(path, data).map_err(transport)?;
        info!(path = %path.display(), "screenshot saved");
        Ok(())
    }

    pub(crate) fn evaluate_value(
        &self,
        expression: &str,
    ) -> Result<Option<serde_json::Value>, SuiteError> {
        let result = self.tab.evaluate(expression, false).map_err(transport)?;
        Ok(result.value)
    }
}

#[async_trait]
impl BrowserProbe for BrowserSession {
    async fn current_url(&self) -> Result<String, SuiteError> {
        Ok(self.tab.get_url())
    }

    async fn ready_state(&self) -> Result<String, SuiteError> {
        let value = self.evaluate_value("document.readyState")?;
        Ok(value
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default())
    }

    async fn element_visible(&self, selector: &str) -> Result<bool, SuiteError> {
        let value = self.evaluate_value(&format!(
            r#"
            (() => {{
                const elem = document.querySelector({sel});
                if (!elem) return false;
                const rect = elem.getBoundingClientRect();
                const style = window.getComputedStyle(elem);
                return rect.width > 0 && rect.height > 0
                    && style.visibility !== 'hidden' && style.display !== 'none';
            }})()
            "#,
            sel = js_str(selector),
        ))?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn element_clickable(&self, selector: &str) -> Result<bool, SuiteError> {
        let value = self.evaluate_value(&format!(
            r#"
            (() => {{
                const elem = document.querySelector({sel});
                if (!elem) return false;
                const rect = elem.getBoundingClientRect();
                const style = window.getComputedStyle(elem);
                return rect.width > 0 && rect.height > 0
                    && style.visibility !== 'hidden' && style.display !== 'none'
                    && !elem.disabled;
            }})()
            "#,
            sel = js_str(selector),
        ))?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_str_escapes_quotes() {
        assert_eq!(js_str("input[name='email']"), r"'input[name=\'email\']'");
        assert_eq!(js_str(r"a\b"), r"'a\\b'");
    }
}
