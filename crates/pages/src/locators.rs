//! CSS selectors for the CRM's pages. Link locators are keyed by their target
//! URL, which is what tells the entries of a shared navbar apart.

pub const EMAIL_FIELD: &str = "input[name='email']";
pub const PASSWORD_FIELD: &str = "input[name='password']";
pub const PASSWORD_CONFIRMATION_FIELD: &str = "input[name='password_confirmation']";
pub const LASTNAME_FIELD: &str = "input[name='nom']";
pub const FIRSTNAME_FIELD: &str = "input[name='prenom']";
// The company form reuses name="nom" for the company name.
pub const COMPANY_NAME_FIELD: &str = "input[name='nom']";
pub const SIRET_FIELD: &str = "input[name='siret']";

pub const SUBMIT_BUTTON: &str = "button[type='submit']";
pub const ACTION_BUTTON: &str = ".btn";
pub const ALERT: &str = ".alert";
pub const PROFILE_MENU: &str = ".btn-profil";

pub fn link_to(href: &str) -> String {
    format!("a[href='{href}']")
}

/// The subscription page renders up to four offers, each a form carrying its
/// `abonnement_id` in a hidden input.
pub const OFFER_SLOTS: std::ops::RangeInclusive<u8> = 1..=4;

pub fn offer_form(slot: u8) -> String {
    format!("form:has(input[name='abonnement_id'][value='{slot}'])")
}

pub fn offer_name(slot: u8) -> String {
    format!("{} h4", offer_form(slot))
}

pub fn offer_button(slot: u8) -> String {
    format!("{} button", offer_form(slot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_selectors_carry_the_slot() {
        assert_eq!(
            offer_form(2),
            "form:has(input[name='abonnement_id'][value='2'])"
        );
        assert!(offer_name(3).ends_with(" h4"));
        assert!(offer_button(4).ends_with(" button"));
    }

    #[test]
    fn link_selector_targets_href() {
        assert_eq!(
            link_to("https://x.test/logout"),
            "a[href='https://x.test/logout']"
        );
    }
}
