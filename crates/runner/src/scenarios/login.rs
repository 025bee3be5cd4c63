//! Login flow scenarios: field validation, credential checks and the
//! post-login redirects that depend on account state.

use crmpilot_core::messages::login as messages;
use crmpilot_core::SuiteError;
use crmpilot_pages::{data, DashboardPage, LoginPage, RegisterCompanyPage, SubscriptionPage};

use crate::scenarios::{register_user_and_company, register_valid_user};
use crate::suite::{verify, Harness, Scenario};

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "test_login_empty_password",
            module: "login",
            description: "Login fails for an empty or whitespace password",
            run: |h| Box::pin(login_empty_password(h)),
        },
        Scenario {
            name: "test_login_empty_email",
            module: "login",
            description: "Login fails for an empty or whitespace email",
            run: |h| Box::pin(login_empty_email(h)),
        },
        Scenario {
            name: "test_login_invalid_email",
            module: "login",
            description: "Login fails with a malformed email",
            run: |h| Box::pin(login_invalid_email(h)),
        },
        Scenario {
            name: "test_login_invalid_password",
            module: "login",
            description: "Login fails with a wrong password",
            run: |h| Box::pin(login_invalid_password(h)),
        },
        Scenario {
            name: "test_login_unregistered",
            module: "login",
            description: "Unregistered credentials are rejected",
            run: |h| Box::pin(login_unregistered(h)),
        },
        Scenario {
            name: "test_login_valid_before_company",
            module: "login",
            description: "A user without a company is sent to company registration",
            run: |h| Box::pin(login_valid_before_company(h)),
        },
        Scenario {
            name: "test_login_valid_unsubscribed_user",
            module: "login",
            description: "A user with a company but no subscription lands on the offer page",
            run: |h| Box::pin(login_valid_unsubscribed(h)),
        },
        Scenario {
            name: "test_login_valid_subscribed_user",
            module: "login",
            description: "A subscribed user lands directly on the dashboard",
            run: |h| Box::pin(login_valid_subscribed(h)),
        },
        Scenario {
            name: "test_login_page_ui",
            module: "login",
            description: "The login page renders its full form, also after back-navigation",
            run: |h| Box::pin(login_page_ui(h)),
        },
        Scenario {
            name: "test_navigate_to_forgot_password_page",
            module: "login",
            description: "The forgot-password link leads to the forgot-password page",
            run: |h| Box::pin(navigate_to_forgot_password(h)),
        },
        Scenario {
            name: "test_navigate_to_create_account_page",
            module: "login",
            description: "The create-account link leads to the registration page",
            run: |h| Box::pin(navigate_to_create_account(h)),
        },
    ]
}

/// Registering leaves the browser on the company page; hop back to login.
async fn back_to_login(h: &Harness) -> Result<(), SuiteError> {
    let company_page = RegisterCompanyPage::new(&h.browser, &h.urls);
    company_page.click_login_link().await?;
    verify(
        company_page.is_login_page_opened().await?,
        format!(
            "redirection to the login page failed: expected '{}', current url is '{}'",
            h.urls.login,
            h.browser.current_url()
        ),
    )
}

async fn expect_login_error(
    login_page: &LoginPage<'_>,
    expected: &str,
) -> Result<(), SuiteError> {
    let actual = login_page.validation_message().await?;
    verify(
        actual.contains(expected),
        format!(
            "validation error mismatch: expected '{expected}', got '{actual}' \
             (normally used for: {})",
            messages::TABLE.label_of(&actual)
        ),
    )
}

async fn login_empty_password(h: &Harness) -> Result<(), SuiteError> {
    let user = register_valid_user(h).await?;
    back_to_login(h).await?;

    let login_page = LoginPage::new(&h.browser, &h.urls);
    for password in ["", "        "] {
        login_page.login(&user.email, password).await?;
        verify(
            !login_page.is_login_successful(true).await?,
            format!("unexpected login success with password '{password}'"),
        )?;
        expect_login_error(&login_page, messages::EMPTY_PASSWORD).await?;
    }
    Ok(())
}

async fn login_empty_email(h: &Harness) -> Result<(), SuiteError> {
    let user = register_valid_user(h).await?;
    back_to_login(h).await?;

    let login_page = LoginPage::new(&h.browser, &h.urls);
    for email in ["", "        "] {
        login_page.login(email, &user.password).await?;
        verify(
            !login_page.is_login_successful(true).await?,
            format!("unexpected login success with email '{email}'"),
        )?;
        expect_login_error(&login_page, messages::EMPTY_EMAIL).await?;
    }
    Ok(())
}

async fn login_invalid_email(h: &Harness) -> Result<(), SuiteError> {
    let user = register_valid_user(h).await?;
    back_to_login(h).await?;

    // Strip the TLD to break the address shape.
    let invalid_email = &user.email[..user.email.len() - 3];
    let login_page = LoginPage::new(&h.browser, &h.urls);
    login_page.login(invalid_email, &user.password).await?;
    verify(
        !login_page.is_login_successful(true).await?,
        format!("unexpected login success with invalid email '{invalid_email}'"),
    )?;
    expect_login_error(&login_page, messages::INVALID_EMAIL).await
}

async fn login_invalid_password(h: &Harness) -> Result<(), SuiteError> {
    let user = register_valid_user(h).await?;
    back_to_login(h).await?;

    let invalid_password = &user.password[..user.password.len() - 1];
    let login_page = LoginPage::new(&h.browser, &h.urls);
    login_page.login(&user.email, invalid_password).await?;
    verify(
        !login_page.is_login_successful(true).await?,
        format!("unexpected login success with truncated password for '{}'", user.email),
    )?;
    expect_login_error(&login_page, messages::WRONG_CREDENTIALS).await
}

async fn login_unregistered(h: &Harness) -> Result<(), SuiteError> {
    let login_page = LoginPage::new(&h.browser, &h.urls);
    login_page.open().await?;

    let unregistered_email = data::random_email();
    login_page
        .login(&unregistered_email, data::VALID_PASSWORD)
        .await?;
    verify(
        !login_page.is_login_successful(true).await?,
        format!(
            "system allowed access with unregistered credentials: email '{unregistered_email}'"
        ),
    )
}

async fn login_valid_before_company(h: &Harness) -> Result<(), SuiteError> {
    let user = register_valid_user(h).await?;
    back_to_login(h).await?;

    let login_page = LoginPage::new(&h.browser, &h.urls);
    login_page.login(&user.email, &user.password).await?;
    verify(
        login_page.is_login_before_company_successful().await?,
        format!(
            "login failed for a newly registered user without a company \
             (email '{}', current url '{}')",
            user.email,
            h.browser.current_url()
        ),
    )
}

async fn login_valid_unsubscribed(h: &Harness) -> Result<(), SuiteError> {
    let (user, _) = register_user_and_company(h).await?;

    let subscription_page = SubscriptionPage::new(&h.browser, &h.urls);
    subscription_page.logout().await?;
    verify(
        subscription_page.is_logout_successful().await?,
        "logout failed, the login scenario cannot proceed",
    )?;

    let login_page = LoginPage::new(&h.browser, &h.urls);
    login_page.login(&user.email, &user.password).await?;
    verify(
        login_page.is_login_successful(true).await?,
        format!(
            "login failed for an unsubscribed user with a company \
             (email '{}', current url '{}')",
            user.email,
            h.browser.current_url()
        ),
    )
}

async fn login_valid_subscribed(h: &Harness) -> Result<(), SuiteError> {
    let (user, _) = register_user_and_company(h).await?;

    let subscription_page = SubscriptionPage::new(&h.browser, &h.urls);
    subscription_page.select_offer("essai").await?;
    verify(
        subscription_page.is_offer_selection_successful("essai").await?,
        format!(
            "redirection failed after selecting the trial offer (current url '{}')",
            h.browser.current_url()
        ),
    )?;

    // Selecting the trial offer lands on the dashboard, so log out from there.
    let dashboard = DashboardPage::new(&h.browser, &h.urls);
    dashboard.logout().await?;
    verify(
        dashboard.is_logout_successful().await?,
        "logout from the dashboard failed, the login scenario cannot proceed",
    )?;

    let login_page = LoginPage::new(&h.browser, &h.urls);
    login_page.login(&user.email, &user.password).await?;
    verify(
        login_page.is_login_successful(false).await?,
        format!(
            "login failed for a subscribed user (email '{}', current url '{}')",
            user.email,
            h.browser.current_url()
        ),
    )
}

async fn login_page_ui(h: &Harness) -> Result<(), SuiteError> {
    let login_page = LoginPage::new(&h.browser, &h.urls);
    login_page.open().await?;
    verify(
        login_page.has_login_form().await?,
        "login form incomplete: email field, password field and submit button expected",
    )?;

    // The form must come back intact through browser history.
    login_page.click_forgot_password_link().await?;
    verify(
        login_page.is_forgot_password_page_opened().await?,
        format!(
            "redirection to the forgot-password page failed (current url '{}')",
            h.browser.current_url()
        ),
    )?;
    h.browser.navigate_back().await?;
    verify(
        login_page.has_login_form().await?,
        format!(
            "login form missing after navigating back (current url '{}')",
            h.browser.current_url()
        ),
    )
}

async fn navigate_to_forgot_password(h: &Harness) -> Result<(), SuiteError> {
    let login_page = LoginPage::new(&h.browser, &h.urls);
    login_page.open().await?;
    login_page.click_forgot_password_link().await?;
    verify(
        login_page.is_forgot_password_page_opened().await?,
        format!(
            "redirection to the forgot-password page failed: expected '{}', current url '{}'",
            h.urls.forgot_password,
            h.browser.current_url()
        ),
    )
}

async fn navigate_to_create_account(h: &Harness) -> Result<(), SuiteError> {
    let login_page = LoginPage::new(&h.browser, &h.urls);
    login_page.open().await?;
    login_page.click_create_account_link().await?;
    verify(
        login_page.is_register_page_opened().await?,
        format!(
            "redirection to the registration page failed: expected '{}', current url '{}'",
            h.urls.register,
            h.browser.current_url()
        ),
    )
}
