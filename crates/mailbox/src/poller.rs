use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crmpilot_core::config::MailboxConfig;
use crmpilot_core::poll::{poll_until, PollConfig, PollOutcome, PollProbe, PollStep};
use crmpilot_core::SuiteError;

use crate::extract::extract_reset_link;
use crate::session::{ImapTlsSession, MailSession};

/// What the poller searches for. Immutable for the duration of one poll call.
#[derive(Debug, Clone)]
pub struct MailQuery {
    pub recipient: String,
    pub subject_keyword: String,
    pub folder: String,
}

impl MailQuery {
    pub fn from_config(config: &MailboxConfig) -> Self {
        Self {
            recipient: config.address(),
            subject_keyword: config.subject_keyword.clone(),
            folder: config.folder.clone(),
        }
    }
}

struct MailProbe<'a> {
    session: &'a mut dyn MailSession,
    query: &'a MailQuery,
}

#[async_trait]
impl PollProbe for MailProbe<'_> {
    type Output = String;

    async fn check(&mut self) -> Result<PollStep<String>, SuiteError> {
        let searched = async {
            self.session.select_folder(&self.query.folder).await?;
            self.session
                .search_unread(&self.query.recipient, &self.query.subject_keyword)
                .await
        }
        .await;

        // A single failed search is retried on the next tick; only the
        // deadline is terminal for the search phase.
        let seqs = match searched {
            Ok(seqs) => seqs,
            Err(SuiteError::MailboxProtocol(e)) => {
                warn!(error = %e, "mailbox search failed, will retry");
                return Ok(PollStep::Pending(format!("search failed: {e}")));
            }
            Err(e) => return Err(e),
        };

        let Some(&newest) = seqs.iter().max() else {
            return Ok(PollStep::Pending("no matching unread message".to_string()));
        };
        if seqs.len() > 1 {
            // A fresh reset request supersedes earlier ones.
            debug!(kept = newest, discarded = seqs.len() - 1, "multiple unread matches");
        }

        // Once a matching message exists, a fetch or extraction failure is
        // final, waiting longer cannot fix it.
        let raw = self.session.fetch_message(newest).await?;
        let link = extract_reset_link(&raw)?;
        Ok(PollStep::Ready(link))
    }
}

/// Poll the mailbox until a reset mail for `query.recipient` shows up, then
/// return the reset URL from its body.
pub async fn await_reset_link(
    session: &mut dyn MailSession,
    query: &MailQuery,
    cfg: PollConfig,
    cancel: &CancellationToken,
) -> Result<String, SuiteError> {
    info!(
        recipient = %query.recipient,
        subject = %query.subject_keyword,
        "waiting for reset mail"
    );

    let mut probe = MailProbe { session, query };
    match poll_until(cfg, cancel, &mut probe).await? {
        PollOutcome::Satisfied(url) => {
            info!(%url, "reset link extracted");
            Ok(url)
        }
        PollOutcome::Deadline { elapsed, .. } => Err(SuiteError::MailTimeout {
            recipient: query.recipient.clone(),
            waited: elapsed,
        }),
        PollOutcome::Cancelled => Err(SuiteError::Other(anyhow::anyhow!(
            "mail poll cancelled for {}",
            query.recipient
        ))),
    }
}

/// Connect, poll, and always log out, success or failure. One session covers
/// the whole polling window.
pub async fn fetch_reset_link(
    config: &MailboxConfig,
    cancel: &CancellationToken,
) -> Result<String, SuiteError> {
    let mut session = ImapTlsSession::connect(config).await?;
    let query = MailQuery::from_config(config);
    let cfg = PollConfig::new(config.interval(), config.timeout());

    let result = await_reset_link(&mut session, &query, cfg, cancel).await;
    if let Err(e) = session.logout().await {
        warn!(error = %e, "imap logout failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    #[derive(Default)]
    struct MockState {
        messages: BTreeMap<u32, Vec<u8>>,
        failing_searches: u32,
        selects: u32,
    }

    #[derive(Clone, Default)]
    struct MockSession {
        state: Arc<Mutex<MockState>>,
    }

    impl MockSession {
        fn with_message(seq: u32, raw: Vec<u8>) -> Self {
            let mock = Self::default();
            mock.deliver(seq, raw);
            mock
        }

        fn deliver(&self, seq: u32, raw: Vec<u8>) {
            self.state.lock().unwrap().messages.insert(seq, raw);
        }

        fn fail_next_searches(&self, count: u32) {
            self.state.lock().unwrap().failing_searches = count;
        }
    }

    #[async_trait]
    impl MailSession for MockSession {
        async fn select_folder(&mut self, _folder: &str) -> Result<(), SuiteError> {
            self.state.lock().unwrap().selects += 1;
            Ok(())
        }

        async fn search_unread(
            &mut self,
            _recipient: &str,
            _subject_keyword: &str,
        ) -> Result<Vec<u32>, SuiteError> {
            let mut state = self.state.lock().unwrap();
            if state.failing_searches > 0 {
                state.failing_searches -= 1;
                return Err(SuiteError::MailboxProtocol("search glitch".to_string()));
            }
            Ok(state.messages.keys().copied().collect())
        }

        async fn fetch_message(&mut self, seq: u32) -> Result<Vec<u8>, SuiteError> {
            self.state
                .lock()
                .unwrap()
                .messages
                .get(&seq)
                .cloned()
                .ok_or_else(|| SuiteError::MailboxProtocol(format!("no such message {seq}")))
        }

        async fn logout(&mut self) -> Result<(), SuiteError> {
            Ok(())
        }
    }

    fn reset_mail(link: &str) -> Vec<u8> {
        format!(
            "From: RapidoCRM <no-reply@x.test>\r\n\
             To: user@test.com\r\n\
             Subject: Reinitialisation de votre mot de passe\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n\
             Pour choisir un nouveau mot de passe: {link}\r\n"
        )
        .into_bytes()
    }

    fn query() -> MailQuery {
        MailQuery {
            recipient: "user@test.com".to_string(),
            subject_keyword: "mot de passe".to_string(),
            folder: "INBOX".to_string(),
        }
    }

    fn cfg() -> PollConfig {
        PollConfig::new(Duration::from_secs(2), Duration::from_secs(10))
    }

    #[tokio::test(start_paused = true)]
    async fn returns_link_and_parse_is_idempotent() {
        let mut mock = MockSession::with_message(1, reset_mail("https://x.test/reset/abc123"));
        let cancel = CancellationToken::new();

        let first = await_reset_link(&mut mock, &query(), cfg(), &cancel)
            .await
            .unwrap();
        let second = await_reset_link(&mut mock, &query(), cfg(), &cancel)
            .await
            .unwrap();

        assert_eq!(first, "https://x.test/reset/abc123");
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn newest_message_supersedes_older_one() {
        let mut mock = MockSession::with_message(3, reset_mail("https://x.test/reset/stale"));
        mock.deliver(7, reset_mail("https://x.test/reset/fresh"));
        let cancel = CancellationToken::new();

        let url = await_reset_link(&mut mock, &query(), cfg(), &cancel)
            .await
            .unwrap();
        assert_eq!(url, "https://x.test/reset/fresh");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_link_fails_immediately_not_at_deadline() {
        let mut mock = MockSession::with_message(
            1,
            b"From: no-reply@x.test\r\n\
              To: user@test.com\r\n\
              Subject: mot de passe\r\n\
              Content-Type: text/plain\r\n\
              \r\n\
              Aucun lien ici.\r\n"
                .to_vec(),
        );
        let cancel = CancellationToken::new();

        let started = Instant::now();
        let err = await_reset_link(&mut mock, &query(), cfg(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, SuiteError::LinkExtraction(_)));
        // Raised on the first tick, well before the 10s deadline.
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_mailbox_times_out_after_deadline() {
        let mut mock = MockSession::default();
        let cancel = CancellationToken::new();

        let started = Instant::now();
        let err = await_reset_link(&mut mock, &query(), cfg(), &cancel)
            .await
            .unwrap_err();
        let wall = started.elapsed();

        match err {
            SuiteError::MailTimeout { recipient, waited } => {
                assert_eq!(recipient, "user@test.com");
                assert!(waited >= Duration::from_secs(10));
                assert!(waited <= Duration::from_secs(12));
            }
            other => panic!("expected MailTimeout, got {other:?}"),
        }
        // Within one poll interval of the configured timeout.
        assert!(wall >= Duration::from_secs(10) && wall <= Duration::from_secs(12));
        // The folder was re-selected on every tick of a live session.
        assert!(mock.state.lock().unwrap().selects >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_search_error_is_retried() {
        let mut mock = MockSession::with_message(1, reset_mail("https://x.test/reset/abc123"));
        mock.fail_next_searches(2);
        let cancel = CancellationToken::new();

        let url = await_reset_link(&mut mock, &query(), cfg(), &cancel)
            .await
            .unwrap();
        assert_eq!(url, "https://x.test/reset/abc123");
    }

    #[tokio::test(start_paused = true)]
    async fn message_arriving_mid_poll_is_picked_up() {
        let mut mock = MockSession::default();
        let delivery = mock.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            delivery.deliver(1, reset_mail("https://x.test/reset/late"));
        });

        let cancel = CancellationToken::new();
        let url = await_reset_link(&mut mock, &query(), cfg(), &cancel)
            .await
            .unwrap();
        assert_eq!(url, "https://x.test/reset/late");
    }
}
