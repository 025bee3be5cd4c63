use crmpilot_core::{SuiteError, Urls};
use crmpilot_driver::{BrowserSession, Condition};

use crate::locators;

/// Page object for the login page.
pub struct LoginPage<'a> {
    browser: &'a BrowserSession,
    urls: &'a Urls,
}

impl<'a> LoginPage<'a> {
    pub fn new(browser: &'a BrowserSession, urls: &'a Urls) -> Self {
        Self { browser, urls }
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        self.browser.open_url(&self.urls.login).await
    }

    pub async fn enter_email(&self, email: &str) -> Result<(), SuiteError> {
        self.browser.fill(locators::EMAIL_FIELD, email).await
    }

    pub async fn enter_password(&self, password: &str) -> Result<(), SuiteError> {
        self.browser.fill(locators::PASSWORD_FIELD, password).await
    }

    pub async fn submit(&self) -> Result<(), SuiteError> {
        self.browser.click(locators::SUBMIT_BUTTON).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), SuiteError> {
        self.enter_email(email).await?;
        self.enter_password(password).await?;
        self.submit().await
    }

    pub async fn validation_message(&self) -> Result<String, SuiteError> {
        self.browser.read_text(locators::ALERT).await
    }

    /// A successful login lands on the subscription page unless the account
    /// already holds one, in which case it goes straight to the dashboard.
    pub async fn is_login_successful(
        &self,
        subscription_required: bool,
    ) -> Result<bool, SuiteError> {
        let target = if subscription_required {
            &self.urls.subscription
        } else {
            &self.urls.dashboard
        };
        self.browser.reached(&Condition::loaded(target)).await
    }

    /// An account whose company profile is incomplete is sent back to the
    /// company registration step instead.
    pub async fn is_login_before_company_successful(&self) -> Result<bool, SuiteError> {
        self.browser
            .reached(&Condition::loaded(&self.urls.register_company))
            .await
    }

    pub async fn click_forgot_password_link(&self) -> Result<(), SuiteError> {
        self.browser
            .click(&locators::link_to(&self.urls.forgot_password))
            .await
    }

    pub async fn click_create_account_link(&self) -> Result<(), SuiteError> {
        self.browser
            .click(&locators::link_to(&self.urls.register))
            .await
    }

    pub async fn is_forgot_password_page_opened(&self) -> Result<bool, SuiteError> {
        self.browser
            .reached(&Condition::loaded(&self.urls.forgot_password))
            .await
    }

    pub async fn is_register_page_opened(&self) -> Result<bool, SuiteError> {
        self.browser
            .reached(&Condition::loaded(&self.urls.register))
            .await
    }

    pub async fn has_login_form(&self) -> Result<bool, SuiteError> {
        Ok(self.browser.is_present(locators::EMAIL_FIELD).await?
            && self.browser.is_present(locators::PASSWORD_FIELD).await?
            && self.browser.is_present(locators::SUBMIT_BUTTON).await?)
    }
}
