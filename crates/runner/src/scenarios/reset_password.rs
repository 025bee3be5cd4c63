//! Password reset scenarios: the full mail-correlated happy path, plus the
//! validation cases on both the forgot-password and reset forms.

use tracing::warn;

use crmpilot_core::messages::{forgot_password, login, reset_password as messages};
use crmpilot_core::poll::PollConfig;
use crmpilot_core::SuiteError;
use crmpilot_mailbox::poller::{await_reset_link, MailQuery};
use crmpilot_mailbox::session::{ImapTlsSession, MailSession};
use crmpilot_pages::{data, ForgotPasswordPage, LoginPage, RegisterPage, ResetPasswordPage};

use crate::suite::{verify, Harness, Scenario};

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "test_reset_password_valid",
            module: "reset_password",
            description: "The mailed reset link sets a new password usable for login",
            run: |h| Box::pin(reset_password_valid(h)),
        },
        Scenario {
            name: "test_reset_password_empty_fields",
            module: "reset_password",
            description: "Empty password or confirmation on the reset form is rejected",
            run: |h| Box::pin(reset_password_empty_fields(h)),
        },
        Scenario {
            name: "test_reset_password_invalid",
            module: "reset_password",
            description: "Short or mismatched passwords on the reset form are rejected",
            run: |h| Box::pin(reset_password_invalid(h)),
        },
        Scenario {
            name: "test_forgot_password_empty_email",
            module: "reset_password",
            description: "An empty email on the forgot-password form is rejected",
            run: |h| Box::pin(forgot_password_empty_email(h)),
        },
        Scenario {
            name: "test_forgot_password_unregistered_email",
            module: "reset_password",
            description: "An unregistered email on the forgot-password form is rejected",
            run: |h| Box::pin(forgot_password_unregistered(h)),
        },
        Scenario {
            name: "test_forgot_password_navigate_to_create_account",
            module: "reset_password",
            description: "The create-account link on the forgot-password page leads to registration",
            run: |h| Box::pin(forgot_password_navigate_to_create_account(h)),
        },
    ]
}

/// Poll the test mailbox for the reset mail addressed to `recipient`.
async fn await_link_for(h: &Harness, recipient: &str) -> Result<String, SuiteError> {
    let mailbox = &h.config.mailbox;
    let mut session = ImapTlsSession::connect(mailbox).await?;
    let query = MailQuery {
        recipient: recipient.to_string(),
        subject_keyword: mailbox.subject_keyword.clone(),
        folder: mailbox.folder.clone(),
    };
    let cfg = PollConfig::new(mailbox.interval(), mailbox.timeout());

    let result = await_reset_link(&mut session, &query, cfg, &h.cancel).await;
    if let Err(e) = session.logout().await {
        warn!(error = %e, "imap logout failed");
    }
    result
}

/// Register a user on a plus-addressed mailbox alias, request a reset, wait
/// for the mail and open the link. Leaves the browser on the reset form.
async fn open_reset_form(h: &Harness) -> Result<String, SuiteError> {
    let email = data::unique_reset_recipient(&h.config.mailbox);

    let register_page = RegisterPage::new(&h.browser, &h.urls);
    register_page.open().await?;
    register_page
        .register(
            data::VALID_LASTNAME,
            data::VALID_FIRSTNAME,
            &email,
            data::VALID_PASSWORD,
            data::VALID_PASSWORD,
        )
        .await?;
    verify(
        register_page.is_registration_successful().await?,
        "initial user registration failed, scenario cannot proceed",
    )?;
    register_page.click_login_link().await?;
    verify(
        register_page.is_login_page_opened().await?,
        "redirection from registration to login failed, scenario cannot proceed",
    )?;

    let login_page = LoginPage::new(&h.browser, &h.urls);
    login_page.click_forgot_password_link().await?;
    verify(
        login_page.is_forgot_password_page_opened().await?,
        "redirection to the forgot-password page failed, scenario cannot proceed",
    )?;

    let forgot_page = ForgotPasswordPage::new(&h.browser, &h.urls);
    forgot_page.request_password_reset(&email).await?;
    let actual = forgot_page.validation_message().await?;
    verify(
        actual.contains(forgot_password::SUCCESS_MESSAGE),
        format!(
            "validation message mismatch: expected '{}', got '{actual}' \
             (normally used for: {})",
            forgot_password::SUCCESS_MESSAGE,
            forgot_password::TABLE.label_of(&actual)
        ),
    )?;

    let reset_link = await_link_for(h, &email).await?;

    let reset_page = ResetPasswordPage::new(&h.browser, &h.urls);
    reset_page.open(&reset_link).await?;
    verify(
        reset_page.is_reset_password_page_opened().await?,
        format!(
            "reset password page did not open from link '{reset_link}' \
             (current url '{}')",
            h.browser.current_url()
        ),
    )?;
    Ok(email)
}

async fn expect_reset_error(
    reset_page: &ResetPasswordPage<'_>,
    expected: &str,
) -> Result<(), SuiteError> {
    let actual = reset_page.error_message().await?;
    verify(
        actual.contains(expected),
        format!(
            "validation error mismatch: expected '{expected}', got '{actual}' \
             (normally used for: {})",
            messages::TABLE.label_of(&actual)
        ),
    )
}

async fn reset_password_valid(h: &Harness) -> Result<(), SuiteError> {
    let email = open_reset_form(h).await?;

    let reset_page = ResetPasswordPage::new(&h.browser, &h.urls);
    reset_page
        .reset_password(data::NEW_VALID_PASSWORD, data::NEW_VALID_PASSWORD)
        .await?;
    verify(
        reset_page.is_redirected_to_login().await?,
        format!(
            "no redirection to login after password reset (current url '{}')",
            h.browser.current_url()
        ),
    )?;

    let login_page = LoginPage::new(&h.browser, &h.urls);
    let confirmation = login_page.validation_message().await?;
    verify(
        confirmation.contains(login::RESET_PASSWORD_SUCCESS),
        format!(
            "confirmation message mismatch: expected '{}', got '{confirmation}'",
            login::RESET_PASSWORD_SUCCESS
        ),
    )?;

    // The new password must authenticate; the account has no company yet.
    login_page.login(&email, data::NEW_VALID_PASSWORD).await?;
    verify(
        login_page.is_login_before_company_successful().await?,
        format!(
            "login with the new password failed for '{email}' (current url '{}')",
            h.browser.current_url()
        ),
    )
}

async fn reset_password_empty_fields(h: &Harness) -> Result<(), SuiteError> {
    open_reset_form(h).await?;
    let reset_page = ResetPasswordPage::new(&h.browser, &h.urls);

    reset_page
        .reset_password("", data::NEW_VALID_PASSWORD)
        .await?;
    expect_reset_error(&reset_page, messages::EMPTY_PASSWORD).await?;

    reset_page
        .reset_password(data::NEW_VALID_PASSWORD, "")
        .await?;
    expect_reset_error(&reset_page, messages::EMPTY_PASSWORD_CONFIRMATION).await
}

async fn reset_password_invalid(h: &Harness) -> Result<(), SuiteError> {
    open_reset_form(h).await?;
    let reset_page = ResetPasswordPage::new(&h.browser, &h.urls);

    reset_page
        .reset_password(data::INVALID_PASSWORD, data::INVALID_PASSWORD)
        .await?;
    expect_reset_error(&reset_page, messages::INVALID_PASSWORD).await?;

    reset_page
        .reset_password(
            data::NEW_VALID_PASSWORD,
            &format!("{}x", data::NEW_VALID_PASSWORD),
        )
        .await?;
    expect_reset_error(&reset_page, messages::INVALID_PASSWORD_CONFIRMATION).await
}

async fn forgot_password_empty_email(h: &Harness) -> Result<(), SuiteError> {
    let forgot_page = ForgotPasswordPage::new(&h.browser, &h.urls);
    forgot_page.open().await?;
    forgot_page.request_password_reset("").await?;

    let actual = forgot_page.validation_message().await?;
    verify(
        actual.contains(forgot_password::EMPTY_EMAIL),
        format!(
            "validation error mismatch: expected '{}', got '{actual}' \
             (normally used for: {})",
            forgot_password::EMPTY_EMAIL,
            forgot_password::TABLE.label_of(&actual)
        ),
    )
}

async fn forgot_password_navigate_to_create_account(h: &Harness) -> Result<(), SuiteError> {
    let forgot_page = ForgotPasswordPage::new(&h.browser, &h.urls);
    forgot_page.open().await?;
    forgot_page.click_create_account_link().await?;
    verify(
        forgot_page.is_register_page_opened().await?,
        format!(
            "redirection to the registration page failed: expected '{}', current url '{}'",
            h.urls.register,
            h.browser.current_url()
        ),
    )
}

async fn forgot_password_unregistered(h: &Harness) -> Result<(), SuiteError> {
    let forgot_page = ForgotPasswordPage::new(&h.browser, &h.urls);
    forgot_page.open().await?;
    forgot_page
        .request_password_reset(&data::random_email())
        .await?;

    let actual = forgot_page.validation_message().await?;
    verify(
        actual.contains(forgot_password::UNREGISTERED_EMAIL),
        format!(
            "validation error mismatch: expected '{}', got '{actual}' \
             (normally used for: {})",
            forgot_password::UNREGISTERED_EMAIL,
            forgot_password::TABLE.label_of(&actual)
        ),
    )
}
