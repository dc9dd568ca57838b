//! Error types for the tabtail core.

use thiserror::Error;

use crate::tab::TabId;

/// A filter expression that the regex engine refused to compile.
///
/// Scoped to a single filter tab: it aborts that tab's current rebuild or
/// ingest step and is reported through the status channel, but never touches
/// other tabs or the history.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InvalidPattern {
    /// The expression as the user typed it.
    pub pattern: String,
    /// Diagnostic from the regex engine.
    pub message: String,
}

impl InvalidPattern {
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl From<(&str, regex::Error)> for InvalidPattern {
    fn from((pattern, err): (&str, regex::Error)) -> Self {
        Self::new(pattern, err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no filter tab with id {0}")]
    UnknownTab(TabId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("ingest dispatcher has shut down")]
    Disconnected,

    #[error(transparent)]
    Session(#[from] SessionError),
}
