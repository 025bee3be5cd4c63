use async_trait::async_trait;
use futures::TryStreamExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

use crmpilot_core::config::MailboxConfig;
use crmpilot_core::SuiteError;

type ImapSession = async_imap::Session<async_native_tls::TlsStream<TcpStream>>;

fn protocol(e: impl std::fmt::Display) -> SuiteError {
    SuiteError::MailboxProtocol(e.to_string())
}

/// The IMAP operations the reset-link poller needs. Kept narrow so tests can
/// run against an in-memory mailbox.
#[async_trait]
pub trait MailSession: Send {
    async fn select_folder(&mut self, folder: &str) -> Result<(), SuiteError>;

    /// Sequence numbers of unread messages addressed to `recipient` whose
    /// subject contains `subject_keyword`.
    async fn search_unread(
        &mut self,
        recipient: &str,
        subject_keyword: &str,
    ) -> Result<Vec<u32>, SuiteError>;

    /// Raw RFC 822 bytes of one message.
    async fn fetch_message(&mut self, seq: u32) -> Result<Vec<u8>, SuiteError>;

    async fn logout(&mut self) -> Result<(), SuiteError>;
}

/// A logged-in IMAP4-over-TLS session against the real mail server.
pub struct ImapTlsSession {
    session: ImapSession,
}

impl ImapTlsSession {
    /// Connect, negotiate TLS and authenticate. Failures here are fatal, the
    /// poller never retries the login.
    pub async fn connect(config: &MailboxConfig) -> Result<Self, SuiteError> {
        let address = config.address();
        info!(server = %config.server, port = config.port, mailbox = %address, "connecting to imap server");

        let tcp = TcpStream::connect((config.server.as_str(), config.port))
            .await
            .map_err(protocol)?;
        let tls = async_native_tls::TlsConnector::new();
        let tls_stream = tls
            .connect(config.server.as_str(), tcp)
            .await
            .map_err(protocol)?;

        let client = async_imap::Client::new(tls_stream);
        let session = client
            .login(&address, &config.password)
            .await
            .map_err(|(e, _)| protocol(e))?;

        info!(mailbox = %address, "imap login ok");
        Ok(Self { session })
    }
}

#[async_trait]
impl MailSession for ImapTlsSession {
    async fn select_folder(&mut self, folder: &str) -> Result<(), SuiteError> {
        self.session.select(folder).await.map_err(protocol)?;
        Ok(())
    }

    async fn search_unread(
        &mut self,
        recipient: &str,
        subject_keyword: &str,
    ) -> Result<Vec<u32>, SuiteError> {
        let query = format!("UNSEEN SUBJECT \"{subject_keyword}\" TO \"{recipient}\"");
        debug!(%query, "imap search");
        let seqs = self.session.search(&query).await.map_err(protocol)?;
        Ok(seqs.into_iter().collect())
    }

    async fn fetch_message(&mut self, seq: u32) -> Result<Vec<u8>, SuiteError> {
        let mut stream = self
            .session
            .fetch(seq.to_string(), "RFC822")
            .await
            .map_err(protocol)?;

        let mut body = None;
        while let Some(fetch) = stream.try_next().await.map_err(protocol)? {
            if let Some(bytes) = fetch.body() {
                body = Some(bytes.to_vec());
            }
        }
        drop(stream);

        body.ok_or_else(|| {
            SuiteError::MailboxProtocol(format!("fetch of message {seq} returned no body"))
        })
    }

    async fn logout(&mut self) -> Result<(), SuiteError> {
        self.session.logout().await.map_err(protocol)?;
        debug!("imap logout");
        Ok(())
    }
}
