//! Company registration scenarios, the second onboarding step. These flows
//! start from a freshly registered user, which is what the CRM requires.

use crmpilot_core::messages::register_company as messages;
use crmpilot_core::SuiteError;
use crmpilot_driver::Condition;
use crmpilot_pages::{CompanyData, RegisterCompanyPage, SubscriptionPage};

use crate::scenarios::{register_user_and_company, register_valid_user};
use crate::suite::{verify, Harness, Scenario};

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "test_company_register_valid",
            module: "register_company",
            description: "A valid company registers and reaches the subscription page",
            run: |h| Box::pin(company_register_valid(h)),
        },
        Scenario {
            name: "test_company_register_empty_fields",
            module: "register_company",
            description: "Each mandatory company field reports its own message when left empty",
            run: |h| Box::pin(company_register_empty_fields(h)),
        },
        Scenario {
            name: "test_company_register_invalid_email",
            module: "register_company",
            description: "A malformed company email is rejected",
            run: |h| Box::pin(company_register_invalid_email(h)),
        },
        Scenario {
            name: "test_company_already_registered",
            module: "register_company",
            description: "A company email already in use is rejected",
            run: |h| Box::pin(company_already_registered(h)),
        },
        Scenario {
            name: "test_company_direct_access",
            module: "register_company",
            description: "Unauthenticated access to company registration redirects to login",
            run: |h| Box::pin(company_direct_access(h)),
        },
        Scenario {
            name: "test_company_register_page_ui",
            module: "register_company",
            description: "The company registration page renders its full form",
            run: |h| Box::pin(company_register_page_ui(h)),
        },
        Scenario {
            name: "test_company_navigate_to_login",
            module: "register_company",
            description: "The login link on the company page leads to login",
            run: |h| Box::pin(company_navigate_to_login(h)),
        },
    ]
}

async fn expect_company_error(
    company_page: &RegisterCompanyPage<'_>,
    expected: &str,
) -> Result<(), SuiteError> {
    let actual = company_page.error_message().await?;
    verify(
        actual.contains(expected),
        format!(
            "validation error mismatch: expected '{expected}', got '{actual}' \
             (normally used for: {})",
            messages::TABLE.label_of(&actual)
        ),
    )
}

/// Submit one company registration attempt and check it is rejected.
async fn expect_rejected(
    h: &Harness,
    company: &CompanyData,
    expected: &str,
) -> Result<(), SuiteError> {
    let company_page = RegisterCompanyPage::new(&h.browser, &h.urls);
    company_page.open().await?;
    company_page
        .register_company(&company.name, &company.email, &company.siret)
        .await?;
    verify(
        !company_page.is_company_registration_successful(true).await?,
        format!("unexpected company registration success for '{}'", company.email),
    )?;
    expect_company_error(&company_page, expected).await
}

async fn company_register_valid(h: &Harness) -> Result<(), SuiteError> {
    register_user_and_company(h).await?;
    Ok(())
}

async fn company_register_empty_fields(h: &Harness) -> Result<(), SuiteError> {
    register_valid_user(h).await?;

    let blank = |field: &str| {
        let mut company = CompanyData::valid();
        match field {
            "name" => company.name.clear(),
            "email" => company.email.clear(),
            "siret" => company.siret.clear(),
            other => unreachable!("unknown field {other}"),
        }
        company
    };

    for (field, expected) in [
        ("name", messages::EMPTY_NAME),
        ("email", messages::EMPTY_EMAIL),
        ("siret", messages::EMPTY_SIRET),
    ] {
        expect_rejected(h, &blank(field), expected).await?;
    }
    Ok(())
}

async fn company_register_invalid_email(h: &Harness) -> Result<(), SuiteError> {
    register_valid_user(h).await?;

    for email in crmpilot_pages::data::invalid_emails() {
        let mut company = CompanyData::valid();
        company.email = email;
        expect_rejected(h, &company, messages::INVALID_EMAIL).await?;
    }
    Ok(())
}

async fn company_already_registered(h: &Harness) -> Result<(), SuiteError> {
    // First account claims the company email.
    let (_, company) = register_user_and_company(h).await?;

    let subscription_page = SubscriptionPage::new(&h.browser, &h.urls);
    subscription_page.logout().await?;
    verify(
        subscription_page.is_logout_successful().await?,
        "logout failed, the scenario cannot proceed",
    )?;

    // A second account must not be able to reuse it.
    register_valid_user(h).await?;
    let mut duplicate = CompanyData::valid();
    duplicate.email = company.email.clone();
    expect_rejected(h, &duplicate, messages::ALREADY_REGISTERED).await
}

async fn company_direct_access(h: &Harness) -> Result<(), SuiteError> {
    h.browser.goto(&h.urls.register_company).await?;
    verify(
        h.browser
            .reached(&Condition::loaded(&h.urls.login))
            .await?,
        format!(
            "unauthenticated access to '{}' was not redirected to login \
             (current url '{}')",
            h.urls.register_company,
            h.browser.current_url()
        ),
    )
}

async fn company_register_page_ui(h: &Harness) -> Result<(), SuiteError> {
    // The company form is only reachable behind a fresh registration.
    register_valid_user(h).await?;

    let company_page = RegisterCompanyPage::new(&h.browser, &h.urls);
    verify(
        company_page.has_company_form().await?,
        "company form incomplete: name, email and siret fields expected",
    )
}

async fn company_navigate_to_login(h: &Harness) -> Result<(), SuiteError> {
    register_valid_user(h).await?;

    let company_page = RegisterCompanyPage::new(&h.browser, &h.urls);
    company_page.click_login_link().await?;
    verify(
        company_page.is_login_page_opened().await?,
        format!(
            "redirection to the login page failed: expected '{}', current url '{}'",
            h.urls.login,
            h.browser.current_url()
        ),
    )
}
