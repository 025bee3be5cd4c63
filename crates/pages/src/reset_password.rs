use crmpilot_core::{SuiteError, Urls};
use crmpilot_driver::{BrowserSession, Condition};

use crate::locators;

/// Page object for the reset-password page, reached through the link mailed by
/// the CRM rather than a fixed URL.
pub struct ResetPasswordPage<'a> {
    browser: &'a BrowserSession,
    urls: &'a Urls,
}

impl<'a> ResetPasswordPage<'a> {
    pub fn new(browser: &'a BrowserSession, urls: &'a Urls) -> Self {
        Self { browser, urls }
    }

    /// Open the tokenized link extracted from the reset mail.
    pub async fn open(&self, reset_link: &str) -> Result<(), SuiteError> {
        self.browser.open_url(reset_link).await
    }

    pub async fn is_reset_password_page_opened(&self) -> Result<bool, SuiteError> {
        self.browser
            .reached(&Condition::All(vec![
                Condition::UrlContains(self.urls.reset_password_prefix.clone()),
                Condition::PageReady,
            ]))
            .await
    }

    pub async fn reset_password(
        &self,
        password: &str,
        password_confirmation: &str,
    ) -> Result<(), SuiteError> {
        self.browser.fill(locators::PASSWORD_FIELD, password).await?;
        self.browser
            .fill(locators::PASSWORD_CONFIRMATION_FIELD, password_confirmation)
            .await?;
        self.browser.click(locators::ACTION_BUTTON).await
    }

    pub async fn error_message(&self) -> Result<String, SuiteError> {
        self.browser.read_text(locators::ALERT).await
    }

    /// A successful reset redirects to the login page.
    pub async fn is_redirected_to_login(&self) -> Result<bool, SuiteError> {
        self.browser
            .reached(&Condition::loaded(&self.urls.login))
            .await
    }
}
