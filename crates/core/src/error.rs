use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy for the whole suite: two kinds on the browser side,
/// three on the mailbox side, plus a passthrough for step-level failures.
#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("browser state not reached after {elapsed:?}: waiting for {condition}, last observed: {last_state}")]
    StateTimeout {
        condition: String,
        last_state: String,
        elapsed: Duration,
    },

    #[error("driver transport error: {0}")]
    Transport(String),

    #[error("mailbox protocol error: {0}")]
    MailboxProtocol(String),

    #[error("reset link extraction failed: {0}")]
    LinkExtraction(String),

    #[error("no matching mail for {recipient} within {waited:?}")]
    MailTimeout { recipient: String, waited: Duration },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SuiteError {
    /// Timeouts are expected outcomes for "did we get there" checks;
    /// everything else is an infrastructure failure.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            SuiteError::StateTimeout { .. } | SuiteError::MailTimeout { .. }
        )
    }
}
