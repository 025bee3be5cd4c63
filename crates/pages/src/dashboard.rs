use crmpilot_core::{SuiteError, Urls};
use crmpilot_driver::{BrowserSession, Condition};

use crate::locators;

/// Page object for the dashboard.
pub struct DashboardPage<'a> {
    browser: &'a BrowserSession,
    urls: &'a Urls,
}

impl<'a> DashboardPage<'a> {
    pub fn new(browser: &'a BrowserSession, urls: &'a Urls) -> Self {
        Self { browser, urls }
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        self.browser.open_url(&self.urls.dashboard).await
    }

    /// Log out through the profile dropdown.
    pub async fn logout(&self) -> Result<(), SuiteError> {
        self.browser.click(locators::PROFILE_MENU).await?;
        self.browser
            .click(&locators::link_to(&self.urls.logout))
            .await
    }

    pub async fn is_logout_successful(&self) -> Result<bool, SuiteError> {
        self.browser
            .reached(&Condition::loaded(&self.urls.login))
            .await
    }
}
