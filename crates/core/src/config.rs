use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub sut: SutConfig,
    pub browser: BrowserConfig,
    pub waits: WaitConfig,
    pub mailbox: MailboxConfig,
    pub artifacts: ArtifactConfig,
}

/// System under test.
#[derive(Debug, Deserialize, Clone)]
pub struct SutConfig {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub base_url: String,
}

impl SutConfig {
    pub fn report_title(&self) -> String {
        format!(
            "Automated Test Report |{} V{} | Environment: {}",
            self.name, self.version, self.environment
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WaitConfig {
    /// Bound for explicit element/URL waits.
    pub explicit_wait_secs: u64,
    /// Bound for full page navigations.
    pub page_load_timeout_secs: u64,
    #[serde(default = "default_poll_millis")]
    pub poll_interval_millis: u64,
}

impl WaitConfig {
    pub fn explicit(&self) -> Duration {
        Duration::from_secs(self.explicit_wait_secs)
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }
}

/// Mailbox receiving the CRM's password-reset mails. Credentials come from the
/// environment, not the config file (overrides applied in main).
#[derive(Debug, Deserialize, Clone)]
pub struct MailboxConfig {
    pub server: String,
    #[serde(default = "default_imap_port")]
    pub port: u16,
    pub folder: String,
    pub address_prefix: String,
    pub address_domain: String,
    #[serde(default)]
    pub password: String,
    pub subject_keyword: String,
    #[serde(default = "default_mail_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_mail_interval")]
    pub poll_interval_secs: u64,
}

impl MailboxConfig {
    /// The mailbox address reset mails are delivered to.
    pub fn address(&self) -> String {
        format!("{}@{}", self.address_prefix, self.address_domain)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactConfig {
    pub report_dir: String,
}

fn default_window_width() -> u32 {
    1920
}
fn default_window_height() -> u32 {
    1080
}
fn default_poll_millis() -> u64 {
    500
}
fn default_imap_port() -> u16 {
    993
}
fn default_mail_timeout() -> u64 {
    60
}
fn default_mail_interval() -> u64 {
    5
}
