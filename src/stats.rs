use serde::Serialize;
use std::fmt;

use crate::tab::{FilterTab, TabId};

/// Display counters derived from session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    /// Lines ingested since the last clear, including evicted ones
    pub total_ingested: u64,
    /// Lines currently held in the raw view
    pub raw_visible: usize,
    /// Output lines of the selected tab, 0 when nothing is selected
    pub selected_tab_lines: usize,
    pub tab_count: usize,
}

/// Footer line: `Received: 1,234 | Visible raw: 1,234 | Selected filter lines: 12 | Filters: 2`
impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Received: {} | Visible raw: {} | Selected filter lines: {} | Filters: {}",
            group_thousands(self.total_ingested),
            group_thousands(self.raw_visible as u64),
            group_thousands(self.selected_tab_lines as u64),
            self.tab_count
        )
    }
}

/// Recomputes [`Stats`] from session state.
pub struct StatsAggregator;

impl StatsAggregator {
    pub fn compute(
        total_ingested: u64,
        raw_visible: usize,
        tabs: &[FilterTab],
        selected: Option<TabId>,
    ) -> Stats {
        let selected_tab_lines = selected
            .and_then(|id| tabs.iter().find(|tab| tab.id() == id))
            .map_or(0, FilterTab::line_count);

        Stats {
            total_ingested,
            raw_visible,
            selected_tab_lines,
            tab_count: tabs.len(),
        }
    }
}

/// Format `n` with `,` between groups of three digits.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
