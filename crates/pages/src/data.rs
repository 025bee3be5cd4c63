//! Test data for the form flows. Emails are randomized per run so repeated
//! registrations never collide with an existing account.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Alphanumeric;
use rand::Rng;

use crmpilot_core::config::MailboxConfig;

pub const VALID_LASTNAME: &str = "A";
pub const VALID_FIRSTNAME: &str = "a";
pub const VALID_PASSWORD: &str = "Abc12?!=";
/// Too short for the CRM's password policy.
pub const INVALID_PASSWORD: &str = "A";
pub const NEW_VALID_PASSWORD: &str = "newpassword";

pub const VALID_COMPANY_NAME: &str = "A";
pub const VALID_SIRET: &str = "1";

#[derive(Debug, Clone)]
pub struct UserData {
    pub lastname: String,
    pub firstname: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl UserData {
    pub fn valid() -> Self {
        Self {
            lastname: VALID_LASTNAME.to_string(),
            firstname: VALID_FIRSTNAME.to_string(),
            email: random_email(),
            password: VALID_PASSWORD.to_string(),
            password_confirmation: VALID_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompanyData {
    pub name: String,
    pub email: String,
    pub siret: String,
}

impl CompanyData {
    pub fn valid() -> Self {
        Self {
            name: VALID_COMPANY_NAME.to_string(),
            email: random_email(),
            siret: VALID_SIRET.to_string(),
        }
    }
}

pub fn random_email() -> String {
    let local: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("{local}@gmail.com")
}

/// Emails the CRM must reject: consecutive dots in the domain, and a domain
/// with no top-level part.
pub fn invalid_emails() -> [String; 2] {
    let local: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    [format!("{local}@d..c"), format!("{local}@com")]
}

/// Unique plus-addressed recipient routed into the shared test mailbox, so
/// each reset flow correlates only with its own mail.
pub fn unique_reset_recipient(config: &MailboxConfig) -> String {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!(
        "{}+test{}@{}",
        config.address_prefix, stamp, config.address_domain
    )
}
