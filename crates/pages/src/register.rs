use crmpilot_core::{SuiteError, Urls};
use crmpilot_driver::{BrowserSession, Condition};

use crate::data::UserData;
use crate::locators;

/// Page object for the user registration page.
pub struct RegisterPage<'a> {
    browser: &'a BrowserSession,
    urls: &'a Urls,
}

impl<'a> RegisterPage<'a> {
    pub fn new(browser: &'a BrowserSession, urls: &'a Urls) -> Self {
        Self { browser, urls }
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        self.browser.open_url(&self.urls.register).await
    }

    pub async fn register(
        &self,
        lastname: &str,
        firstname: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<(), SuiteError> {
        self.browser.fill(locators::LASTNAME_FIELD, lastname).await?;
        self.browser
            .fill(locators::FIRSTNAME_FIELD, firstname)
            .await?;
        self.browser.fill(locators::EMAIL_FIELD, email).await?;
        self.browser.fill(locators::PASSWORD_FIELD, password).await?;
        self.browser
            .fill(locators::PASSWORD_CONFIRMATION_FIELD, password_confirmation)
            .await?;
        self.browser.click(locators::ACTION_BUTTON).await
    }

    /// Fill the form with freshly generated valid data and hand it back so
    /// the caller can log in with the same account later.
    pub async fn register_valid_user(&self) -> Result<UserData, SuiteError> {
        let user = UserData::valid();
        self.register(
            &user.lastname,
            &user.firstname,
            &user.email,
            &user.password,
            &user.password_confirmation,
        )
        .await?;
        Ok(user)
    }

    pub async fn error_message(&self) -> Result<String, SuiteError> {
        self.browser.read_text(locators::ALERT).await
    }

    /// Registration chains straight into the company registration step.
    pub async fn is_registration_successful(&self) -> Result<bool, SuiteError> {
        self.browser
            .reached(&Condition::loaded(&self.urls.register_company))
            .await
    }

    pub async fn click_login_link(&self) -> Result<(), SuiteError> {
        self.browser.click(&locators::link_to(&self.urls.login)).await
    }

    pub async fn is_login_page_opened(&self) -> Result<bool, SuiteError> {
        self.browser
            .reached(&Condition::loaded(&self.urls.login))
            .await
    }

    pub async fn has_register_form(&self) -> Result<bool, SuiteError> {
        Ok(self.browser.is_present(locators::LASTNAME_FIELD).await?
            && self.browser.is_present(locators::FIRSTNAME_FIELD).await?
            && self.browser.is_present(locators::EMAIL_FIELD).await?
            && self.browser.is_present(locators::PASSWORD_FIELD).await?
            && self
                .browser
                .is_present(locators::PASSWORD_CONFIRMATION_FIELD)
                .await?)
    }
}
