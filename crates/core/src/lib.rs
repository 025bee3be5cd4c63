pub mod config;
pub mod context;
pub mod error;
pub mod messages;
pub mod poll;
pub mod urls;

pub use config::AppConfig;
pub use context::{ArtifactKind, LogBuffer, RunContext};
pub use error::SuiteError;
pub use poll::{poll_until, PollConfig, PollOutcome, PollProbe, PollStep};
pub use urls::Urls;
