use async_trait::async_trait;

use crmpilot_core::SuiteError;

/// Live view of browser state, the only surface the wait engine needs.
/// Implementations must query the browser on every call — a cached answer can
/// turn a transient in-between state into a false success.
#[async_trait]
pub trait BrowserProbe: Send + Sync {
    async fn current_url(&self) -> Result<String, SuiteError>;

    /// `document.readyState` of the active page.
    async fn ready_state(&self) -> Result<String, SuiteError>;

    async fn element_visible(&self, selector: &str) -> Result<bool, SuiteError>;

    async fn element_clickable(&self, selector: &str) -> Result<bool, SuiteError>;
}
