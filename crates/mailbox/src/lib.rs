//! IMAP side of the suite: polls the test mailbox for the CRM's password-reset
//! mail and pulls the reset link out of it.

pub mod extract;
pub mod poller;
pub mod session;

pub use extract::extract_reset_link;
pub use poller::{await_reset_link, MailQuery};
pub use session::{ImapTlsSession, MailSession};
