pub mod config;
pub mod error;
pub mod event_log;
pub mod types;

pub use config::{AnalyzerConfig, TimeZoneMode};
pub use error::{CampaignError, CampaignResult};
pub use event_log::parse_event_log;
pub use types::{Event, EventKind, RawEvent};
