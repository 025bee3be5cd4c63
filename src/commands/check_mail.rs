use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crmpilot_core::poll::PollConfig;
use crmpilot_core::AppConfig;
use crmpilot_mailbox::poller::{await_reset_link, MailQuery};
use crmpilot_mailbox::session::{ImapTlsSession, MailSession};

/// Mailbox connectivity check: poll for a reset mail and print the link.
pub async fn check_mail(
    config: &AppConfig,
    recipient: Option<String>,
    subject_keyword: Option<String>,
    cancel: &CancellationToken,
) -> Result<()> {
    let mailbox = &config.mailbox;
    let mut session = ImapTlsSession::connect(mailbox).await?;

    let query = MailQuery {
        recipient: recipient.unwrap_or_else(|| mailbox.address()),
        subject_keyword: subject_keyword.unwrap_or_else(|| mailbox.subject_keyword.clone()),
        folder: mailbox.folder.clone(),
    };
    let cfg = PollConfig::new(mailbox.interval(), mailbox.timeout());

    let result = await_reset_link(&mut session, &query, cfg, cancel).await;
    if let Err(e) = session.logout().await {
        warn!(error = %e, "imap logout failed");
    }

    let link = result?;
    println!("{link}");
    Ok(())
}
