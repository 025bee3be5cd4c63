use crmpilot_core::{SuiteError, Urls};
use crmpilot_driver::{BrowserSession, Condition};

use crate::data::CompanyData;
use crate::locators;

/// Page object for the company registration page, the second step of onboarding.
pub struct RegisterCompanyPage<'a> {
    browser: &'a BrowserSession,
    urls: &'a Urls,
}

impl<'a> RegisterCompanyPage<'a> {
    pub fn new(browser: &'a BrowserSession, urls: &'a Urls) -> Self {
        Self { browser, urls }
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        self.browser.open_url(&self.urls.register_company).await
    }

    pub async fn register_company(
        &self,
        name: &str,
        email: &str,
        siret: &str,
    ) -> Result<(), SuiteError> {
        self.browser.fill(locators::COMPANY_NAME_FIELD, name).await?;
        self.browser.fill(locators::EMAIL_FIELD, email).await?;
        self.browser.fill(locators::SIRET_FIELD, siret).await?;
        self.browser.click(locators::ACTION_BUTTON).await
    }

    pub async fn register_valid_company(&self) -> Result<CompanyData, SuiteError> {
        let company = CompanyData::valid();
        self.register_company(&company.name, &company.email, &company.siret)
            .await?;
        Ok(company)
    }

    pub async fn error_message(&self) -> Result<String, SuiteError> {
        self.browser.read_text(locators::ALERT).await
    }

    /// Company registration lands on the subscription page, or directly on
    /// the dashboard for accounts that already hold one.
    pub async fn is_company_registration_successful(
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

    pub async fn click_login_link(&self) -> Result<(), SuiteError> {
        self.browser.click(&locators::link_to(&self.urls.login)).await
    }

    pub async fn is_login_page_opened(&self) -> Result<bool, SuiteError> {
        self.browser
            .reached(&Condition::loaded(&self.urls.login))
            .await
    }

    pub async fn has_company_form(&self) -> Result<bool, SuiteError> {
        Ok(self.browser.is_present(locators::COMPANY_NAME_FIELD).await?
            && self.browser.is_present(locators::EMAIL_FIELD).await?
            && self.browser.is_present(locators::SIRET_FIELD).await?)
    }
}
