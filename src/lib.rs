// Library interface for tabtail
// Streaming line ingestion with bounded history and live filter tabs

pub mod buffer;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod filter;
pub mod history;
pub mod renderer;
pub mod session;
pub mod source;
pub mod stats;
pub mod tab;

#[cfg(test)]
mod test_utils;

pub use dispatcher::{DispatcherHandle, IngestDispatcher};
pub use error::{DispatchError, InvalidPattern, SessionError};
pub use event::SessionEvent;
pub use filter::{FilterMode, FilterRule, RuleSettings};
pub use session::{Session, SessionOptions, SessionSnapshot};
pub use tab::TabId;
