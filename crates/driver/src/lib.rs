pub mod browser;
pub mod conditions;
pub mod network;
pub mod probe;

pub use browser::BrowserSession;
pub use conditions::{wait_until, Condition};
pub use network::{capture_network_records, NetworkRecord};
pub use probe::BrowserProbe;
