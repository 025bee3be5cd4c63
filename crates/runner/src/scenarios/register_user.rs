//! User registration scenarios: the happy path, field validation and the
//! duplicate-account guard.

use crmpilot_core::messages::register as messages;
use crmpilot_core::SuiteError;
use crmpilot_pages::{data, RegisterPage, UserData};

use crate::scenarios::register_valid_user;
use crate::suite::{verify, Harness, Scenario};

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "test_register_valid",
            module: "register_user",
            description: "A valid user registers and reaches company registration",
            run: |h| Box::pin(register_valid(h)),
        },
        Scenario {
            name: "test_register_empty_fields",
            module: "register_user",
            description: "Each mandatory field reports its own message when left empty",
            run: |h| Box::pin(register_empty_fields(h)),
        },
        Scenario {
            name: "test_register_invalid_email",
            module: "register_user",
            description: "Malformed emails are rejected",
            run: |h| Box::pin(register_invalid_email(h)),
        },
        Scenario {
            name: "test_register_invalid_password",
            module: "register_user",
            description: "A password below the minimum length is rejected",
            run: |h| Box::pin(register_invalid_password(h)),
        },
        Scenario {
            name: "test_register_password_confirmation_mismatch",
            module: "register_user",
            description: "A confirmation that differs from the password is rejected",
            run: |h| Box::pin(register_confirmation_mismatch(h)),
        },
        Scenario {
            name: "test_register_already_registered",
            module: "register_user",
            description: "Re-registering an existing email is rejected",
            run: |h| Box::pin(register_already_registered(h)),
        },
        Scenario {
            name: "test_register_page_ui",
            module: "register_user",
            description: "The registration page renders its full form",
            run: |h| Box::pin(register_page_ui(h)),
        },
        Scenario {
            name: "test_register_navigate_to_login",
            module: "register_user",
            description: "The login link on the registration page leads to login",
            run: |h| Box::pin(register_navigate_to_login(h)),
        },
    ]
}

async fn expect_register_error(
    register_page: &RegisterPage<'_>,
    expected: &str,
) -> Result<(), SuiteError> {
    let actual = register_page.error_message().await?;
    verify(
        actual.contains(expected),
        format!(
            "validation error mismatch: expected '{expected}', got '{actual}' \
             (normally used for: {})",
            messages::TABLE.label_of(&actual)
        ),
    )
}

/// Submit one registration attempt and check it is rejected with `expected`.
async fn expect_rejected(
    h: &Harness,
    user: &UserData,
    expected: &str,
) -> Result<(), SuiteError> {
    let register_page = RegisterPage::new(&h.browser, &h.urls);
    register_page.open().await?;
    register_page
        .register(
            &user.lastname,
            &user.firstname,
            &user.email,
            &user.password,
            &user.password_confirmation,
        )
        .await?;
    verify(
        !register_page.is_registration_successful().await?,
        format!("unexpected registration success for '{}'", user.email),
    )?;
    expect_register_error(&register_page, expected).await
}

async fn register_valid(h: &Harness) -> Result<(), SuiteError> {
    register_valid_user(h).await?;
    Ok(())
}

async fn register_empty_fields(h: &Harness) -> Result<(), SuiteError> {
    let blank = |field: &str| {
        let mut user = UserData::valid();
        match field {
            "lastname" => user.lastname.clear(),
            "firstname" => user.firstname.clear(),
            "email" => user.email.clear(),
            "password" => {
                user.password.clear();
                user.password_confirmation.clear();
            }
            other => unreachable!("unknown field {other}"),
        }
        user
    };

    for (field, expected) in [
        ("lastname", messages::EMPTY_LASTNAME),
        ("firstname", messages::EMPTY_FIRSTNAME),
        ("email", messages::EMPTY_EMAIL),
        ("password", messages::EMPTY_PASSWORD),
    ] {
        expect_rejected(h, &blank(field), expected).await?;
    }
    Ok(())
}

async fn register_invalid_email(h: &Harness) -> Result<(), SuiteError> {
    for email in data::invalid_emails() {
        let mut user = UserData::valid();
        user.email = email;
        expect_rejected(h, &user, messages::INVALID_EMAIL).await?;
    }
    Ok(())
}

async fn register_invalid_password(h: &Harness) -> Result<(), SuiteError> {
    let mut user = UserData::valid();
    user.password = data::INVALID_PASSWORD.to_string();
    user.password_confirmation = data::INVALID_PASSWORD.to_string();
    expect_rejected(h, &user, messages::INVALID_PASSWORD).await
}

async fn register_confirmation_mismatch(h: &Harness) -> Result<(), SuiteError> {
    let mut user = UserData::valid();
    user.password_confirmation = format!("{}x", user.password);
    expect_rejected(h, &user, messages::INVALID_PASSWORD_CONFIRMATION).await
}

async fn register_already_registered(h: &Harness) -> Result<(), SuiteError> {
    let existing = register_valid_user(h).await?;

    let mut duplicate = UserData::valid();
    duplicate.email = existing.email.clone();
    expect_rejected(h, &duplicate, messages::ALREADY_REGISTERED).await
}

async fn register_page_ui(h: &Harness) -> Result<(), SuiteError> {
    let register_page = RegisterPage::new(&h.browser, &h.urls);
    register_page.open().await?;
    verify(
        register_page.has_register_form().await?,
        "registration form incomplete: lastname, firstname, email, password \
         and confirmation fields expected",
    )
}

async fn register_navigate_to_login(h: &Harness) -> Result<(), SuiteError> {
    let register_page = RegisterPage::new(&h.browser, &h.urls);
    register_page.open().await?;
    register_page.click_login_link().await?;
    verify(
        register_page.is_login_page_opened().await?,
        format!(
            "redirection to the login page failed: expected '{}', current url '{}'",
            h.urls.login,
            h.browser.current_url()
        ),
    )
}
