//! The scenario catalog, grouped by the flow under test. Fixtures shared by
//! several modules live here.

pub mod login;
pub mod register_company;
pub mod register_user;
pub mod reset_password;

use crmpilot_core::SuiteError;
use crmpilot_pages::{CompanyData, RegisterCompanyPage, RegisterPage, UserData};

use crate::suite::{verify, Harness, Scenario};

/// Every scenario, in execution order.
pub fn all() -> Vec<Scenario> {
    let mut scenarios = login::scenarios();
    scenarios.extend(register_user::scenarios());
    scenarios.extend(register_company::scenarios());
    scenarios.extend(reset_password::scenarios());
    scenarios
}

/// Scenarios belonging to one module, for selective runs.
pub fn for_module(module: &str) -> Vec<Scenario> {
    all().into_iter().filter(|s| s.module == module).collect()
}

pub fn module_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = all().iter().map(|s| s.module).collect();
    names.dedup();
    names
}

/// Register a fresh valid user, leaving the browser on the company
/// registration page.
pub(crate) async fn register_valid_user(h: &Harness) -> Result<UserData, SuiteError> {
    let register_page = RegisterPage::new(&h.browser, &h.urls);
    register_page.open().await?;
    let user = register_page.register_valid_user().await?;
    verify(
        register_page.is_registration_successful().await?,
        format!(
            "initial user registration failed, scenario cannot proceed \
             (current url: '{}')",
            h.browser.current_url()
        ),
    )?;
    Ok(user)
}

/// Register a fresh user and their company, leaving the browser on the
/// subscription page.
pub(crate) async fn register_user_and_company(
    h: &Harness,
) -> Result<(UserData, CompanyData), SuiteError> {
    let user = register_valid_user(h).await?;

    let company_page = RegisterCompanyPage::new(&h.browser, &h.urls);
    let company = company_page.register_valid_company().await?;
    verify(
        company_page.is_company_registration_successful(true).await?,
        format!(
            "company registration failed, scenario cannot proceed \
             (current url: '{}')",
            h.browser.current_url()
        ),
    )?;
    Ok((user, company))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn scenario_names_are_unique() {
        let names: Vec<_> = all().iter().map(|s| s.name).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn every_module_is_selectable() {
        for module in module_names() {
            assert!(!for_module(module).is_empty());
        }
        assert!(for_module("no_such_module").is_empty());
    }

    #[test]
    fn page_ui_scenarios_are_catalogued() {
        let names: HashSet<_> = all().iter().map(|s| s.name).collect();
        for name in [
            "test_login_page_ui",
            "test_register_page_ui",
            "test_company_register_page_ui",
            "test_forgot_password_navigate_to_create_account",
        ] {
            assert!(names.contains(name), "{name} missing from the catalog");
        }
    }

    #[test]
    fn every_scenario_has_a_description() {
        for scenario in all() {
            assert!(
                !scenario.description.is_empty(),
                "{} lacks a description",
                scenario.name
            );
        }
    }
}
