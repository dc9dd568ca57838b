use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write;

use crate::buffer::BoundedBuffer;

/// Default strftime pattern for the timestamp prefix of a formatted line.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

/// Separator between the timestamp prefix and the entry text.
const PREFIX_SEPARATOR: &str = " | ";

/// One complete, timestamped line of ingested text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub text: String,
}

impl LogEntry {
    pub fn new(timestamp: DateTime<Local>, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }

    /// Render the entry as `"{timestamp} | {text}"`.
    ///
    /// Falls back to [`DEFAULT_TIMESTAMP_FORMAT`] if `timestamp_format` does
    /// not render.
    pub fn format(&self, timestamp_format: &str) -> FormattedLine {
        let mut line = String::new();
        if write!(line, "{}", self.timestamp.format(timestamp_format)).is_err() {
            line.clear();
            let _ = write!(line, "{}", self.timestamp.format(DEFAULT_TIMESTAMP_FORMAT));
        }
        line.push_str(PREFIX_SEPARATOR);
        let text_offset = line.len();
        line.push_str(&self.text);
        FormattedLine { line, text_offset }
    }
}

/// A display-ready entry line.
///
/// Keeps the byte offset where the entry text starts so that match spans
/// computed over the text can be shifted onto the full line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine {
    pub line: String,
    pub text_offset: usize,
}

impl FormattedLine {
    pub fn text(&self) -> &str {
        &self.line[self.text_offset..]
    }
}

/// Check a strftime pattern up front; chrono panics when an invalid one is
/// rendered through `Display`.
pub fn is_valid_timestamp_format(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Bounded, arrival-ordered history of ingested entries; oldest evicts first.
pub type HistoryBuffer = BoundedBuffer<LogEntry>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ts;

    #[test]
    fn test_format_default_prefix() {
        let entry = LogEntry::new(ts(1_250), "boot ok");
        let formatted = entry.format(DEFAULT_TIMESTAMP_FORMAT);

        assert_eq!(formatted.line, "00:00:01.250 | boot ok");
        assert_eq!(formatted.text(), "boot ok");
    }

    #[test]
    fn test_format_custom_pattern() {
        let entry = LogEntry::new(ts(61_000), "x");
        let formatted = entry.format("%M:%S");

        assert_eq!(formatted.line, "01:01 | x");
        assert_eq!(formatted.text_offset, 8);
    }

    #[test]
    fn test_timestamp_format_validation() {
        assert!(is_valid_timestamp_format(DEFAULT_TIMESTAMP_FORMAT));
        assert!(is_valid_timestamp_format("%Y-%m-%d %H:%M"));
        assert!(!is_valid_timestamp_format("%Q"));
    }

    #[test]
    fn test_invalid_format_falls_back_to_default() {
        let entry = LogEntry::new(ts(1_250), "boot ok");
        let formatted = entry.format("%Q");

        assert_eq!(formatted.line, "00:00:01.250 | boot ok");
        assert_eq!(formatted.text(), "boot ok");
    }

    #[test]
    fn test_history_keeps_last_entries() {
        let mut history = HistoryBuffer::new(3);
        for (i, text) in ["a", "b", "c", "d"].iter().enumerate() {
            history.push(LogEntry::new(ts(i as i64), *text));
        }

        let texts: Vec<&str> = history.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_history_push_returns_evicted_entry() {
        let mut history = HistoryBuffer::new(1);
        history.push(LogEntry::new(ts(0), "first"));

        let evicted = history.push(LogEntry::new(ts(1), "second"));
        assert_eq!(evicted.map(|e| e.text), Some("first".to_string()));
    }
}
