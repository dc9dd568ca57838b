use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::buffer::BoundedBuffer;
use crate::error::InvalidPattern;
use crate::filter::engine::MatchEngine;
use crate::filter::{Filter, FilterMode, FilterRule, RuleSettings, Span};
use crate::history::{FormattedLine, LogEntry};
use crate::renderer::{Color, RenderedLine};

/// Stable identifier of a filter tab.
///
/// Ids come from the same counter as default tab names and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a full rebuild of one tab.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RebuildReport {
    /// History entries evaluated before the rebuild finished or stopped.
    pub processed: usize,
    /// Lines appended to the tab output.
    pub appended: usize,
    /// Set when the rule failed and the rebuild stopped early.
    pub error: Option<InvalidPattern>,
}

/// A named match rule and its bounded, derived output.
pub struct FilterTab {
    id: TabId,
    rule: FilterRule,
    /// Compiled form of `rule`; fails on every line if the pattern is invalid
    filter: Arc<dyn Filter>,
    lines: BoundedBuffer<RenderedLine>,
}

impl FilterTab {
    /// Create the `n`-th tab with its default name and colors.
    pub fn new(n: u64, capacity: usize) -> Self {
        let settings = RuleSettings::new("", FilterMode::default())
            .with_colors(Color::default_foreground(n as usize), Color::Transparent);
        Self::with_rule(TabId(n), FilterRule::new(format!("Filter {}", n), settings), capacity)
    }

    pub fn with_rule(id: TabId, rule: FilterRule, capacity: usize) -> Self {
        let filter = MatchEngine::compile_lenient(&rule);
        Self {
            id,
            rule,
            filter,
            lines: BoundedBuffer::new(capacity),
        }
    }

    /// Tab driven by a caller-supplied filter instead of one compiled from the
    /// rule's expression.
    #[cfg(test)]
    pub fn with_filter(id: TabId, rule: FilterRule, filter: Arc<dyn Filter>, capacity: usize) -> Self {
        Self {
            id,
            rule,
            filter,
            lines: BoundedBuffer::new(capacity),
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.rule.name
    }

    pub fn rule(&self) -> &FilterRule {
        &self.rule
    }

    pub fn lines(&self) -> &BoundedBuffer<RenderedLine> {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Replace expression, mode and colors. The caller must rebuild.
    pub fn configure(&mut self, settings: RuleSettings) {
        self.rule.settings = settings;
        self.filter = MatchEngine::compile_lenient(&self.rule);
    }

    /// Rename the tab. The caller must rebuild.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.rule.name = name.into();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Evaluate one line and, if it matches, append its rendering.
    ///
    /// Returns the appended line, `None` when the line does not match, or the
    /// rule's error. Output is left untouched on error.
    pub fn offer(&mut self, formatted: &FormattedLine) -> Result<Option<&RenderedLine>, InvalidPattern> {
        let outcome = self.filter.evaluate(formatted.text())?;
        if !outcome.is_match {
            return Ok(None);
        }

        let spans: Vec<Span> = outcome
            .spans
            .into_iter()
            .map(|span| span.shifted(formatted.text_offset))
            .collect();
        let rendered = RenderedLine::new(formatted.line.clone(), &spans, self.rule.highlight_style());
        self.lines.push(rendered);
        Ok(self.lines.last())
    }

    /// Discard the output and re-evaluate every entry in `history`, in order.
    ///
    /// Stops at the first failing entry and keeps whatever was rendered
    /// before it.
    pub fn rebuild<'a, I>(&mut self, history: I, timestamp_format: &str) -> RebuildReport
    where
        I: IntoIterator<Item = &'a LogEntry>,
    {
        self.lines.clear();

        let mut report = RebuildReport::default();
        for entry in history {
            let formatted = entry.format(timestamp_format);
            match self.offer(&formatted) {
                Ok(appended) => {
                    report.processed += 1;
                    if appended.is_some() {
                        report.appended += 1;
                    }
                }
                Err(err) => {
                    report.error = Some(err);
                    break;
                }
            }
        }

        tracing::debug!(
            tab = %self.id,
            processed = report.processed,
            appended = report.appended,
            failed = report.error.is_some(),
            "filter tab rebuilt"
        );
        report
    }
}

impl fmt::Debug for FilterTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterTab")
            .field("id", &self.id)
            .field("rule", &self.rule)
            .field("lines", &self.lines.len())
            .finish()
    }
}
