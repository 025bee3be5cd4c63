use tracing::info;

use crmpilot_core::{SuiteError, Urls};
use crmpilot_driver::{BrowserSession, Condition};

use crate::locators;

const TRIAL_OFFER: &str = "essai";
const STRIPE_CHECKOUT: &str = "https://checkout.stripe.com";

/// Page object for the subscription (offer selection) page.
pub struct SubscriptionPage<'a> {
    browser: &'a BrowserSession,
    urls: &'a Urls,
}

impl<'a> SubscriptionPage<'a> {
    pub fn new(browser: &'a BrowserSession, urls: &'a Urls) -> Self {
        Self { browser, urls }
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        self.browser.open_url(&self.urls.subscription).await
    }

    /// Which slot, if any, renders the offer with this name (case-insensitive).
    pub async fn find_offer(&self, offer_name: &str) -> Result<Option<u8>, SuiteError> {
        let wanted = offer_name.trim().to_lowercase();
        for slot in locators::OFFER_SLOTS {
            if !self.browser.is_present(&locators::offer_name(slot)).await? {
                continue;
            }
            let label = self.browser.read_text(&locators::offer_name(slot)).await?;
            if label.trim().to_lowercase() == wanted {
                info!(offer = %wanted, slot, "offer found");
                return Ok(Some(slot));
            }
        }
        info!(offer = %wanted, "offer not present on subscription page");
        Ok(None)
    }

    pub async fn select_offer(&self, offer_name: &str) -> Result<(), SuiteError> {
        let Some(slot) = self.find_offer(offer_name).await? else {
            return Err(SuiteError::Other(anyhow::anyhow!(
                "offer '{offer_name}' not found on subscription page"
            )));
        };
        self.browser.click(&locators::offer_button(slot)).await
    }

    /// The trial offer lands on the dashboard; paid offers hand over to
    /// Stripe checkout.
    pub async fn is_offer_selection_successful(
        &self,
        offer_name: &str,
    ) -> Result<bool, SuiteError> {
        let offer = offer_name.trim().to_lowercase();
        let condition = if offer == TRIAL_OFFER {
            Condition::loaded(&self.urls.dashboard)
        } else {
            Condition::UrlContains(STRIPE_CHECKOUT.to_string())
        };
        self.browser.reached(&condition).await
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
