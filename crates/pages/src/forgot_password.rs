use crmpilot_core::{SuiteError, Urls};
use crmpilot_driver::{BrowserSession, Condition};

use crate::locators;

/// Page object for the forgot-password page. Submitting a registered address
/// here is what triggers the reset mail the mailbox poller waits on.
pub struct ForgotPasswordPage<'a> {
    browser: &'a BrowserSession,
    urls: &'a Urls,
}

impl<'a> ForgotPasswordPage<'a> {
    pub fn new(browser: &'a BrowserSession, urls: &'a Urls) -> Self {
        Self { browser, urls }
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        self.browser.open_url(&self.urls.forgot_password).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), SuiteError> {
        self.browser.fill(locators::EMAIL_FIELD, email).await?;
        self.browser.click(locators::ACTION_BUTTON).await
    }

    pub async fn validation_message(&self) -> Result<String, SuiteError> {
        self.browser.read_text(locators::ALERT).await
    }

    pub async fn click_create_account_link(&self) -> Result<(), SuiteError> {
        self.browser
            .click(&locators::link_to(&self.urls.register))
            .await
    }

    pub async fn is_register_page_opened(&self) -> Result<bool, SuiteError> {
        self.browser
            .reached(&Condition::loaded(&self.urls.register))
            .await
    }
}
