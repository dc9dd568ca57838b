use chrono::{DateTime, Duration, Local, TimeZone};

use crate::error::InvalidPattern;
use crate::filter::{Filter, MatchOutcome};
use crate::history::{HistoryBuffer, LogEntry};

/// Fixed local timestamp: midnight of 2024-01-01 plus `ms` milliseconds.
pub fn ts(ms: i64) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .earliest()
        .unwrap()
        + Duration::milliseconds(ms)
}

/// History holding `lines` in order; entry `i` is stamped `ts(i)`.
pub fn history_of(lines: &[&str]) -> HistoryBuffer {
    let mut history = HistoryBuffer::new(lines.len().max(1));
    for (i, line) in lines.iter().enumerate() {
        history.push(LogEntry::new(ts(i as i64), *line));
    }
    history
}

/// Mock filter: passes every line through, but fails on lines containing the
/// given text.
pub struct FailOn(pub &'static str);

impl Filter for FailOn {
    fn evaluate(&self, text: &str) -> Result<MatchOutcome, InvalidPattern> {
        if text.contains(self.0) {
            return Err(InvalidPattern::new(self.0, "mock failure"));
        }
        Ok(MatchOutcome::pass_through())
    }
}
