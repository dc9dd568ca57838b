use serde::Serialize;

use crate::renderer::RenderedLine;
use crate::stats::Stats;
use crate::tab::TabId;

/// Change notifications pushed by a session to its subscribers.
///
/// Presentation layers react to these instead of sharing the session's
/// buffers; anything not carried in the event is read back through queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    // Ingestion
    RawLineAppended { line: String },
    LineAppended { tab: TabId, line: RenderedLine },
    BulkLoaded { lines: usize },
    Cleared,

    // Tabs
    TabAdded { tab: TabId },
    TabRemoved { tab: TabId },
    /// The tab's output was replaced wholesale; re-read it.
    TabRebuilt { tab: TabId },
    SelectionChanged { tab: Option<TabId> },

    // Flow control
    Paused,
    Resumed,

    /// New text on the shared status channel
    Status(String),
    StatsChanged(Stats),
}

impl SessionEvent {
    /// Per-line events, suppressed while a bulk load runs.
    pub fn is_per_line(&self) -> bool {
        matches!(
            self,
            SessionEvent::RawLineAppended { .. } | SessionEvent::LineAppended { .. }
        )
    }
}
