pub mod engine;
pub mod regex_filter;
pub mod string_filter;

use serde::Serialize;

use crate::error::InvalidPattern;
use crate::renderer::{Color, SegmentStyle};

/// Trait for extensible filtering
///
/// A filter decides whether a line belongs to a tab and which parts of it to
/// highlight. Implementations must return spans that are sorted and
/// non-overlapping; `MatchOutcome::from_spans` does that normalization.
pub trait Filter: Send + Sync {
    fn evaluate(&self, text: &str) -> Result<MatchOutcome, InvalidPattern>;
}

/// A half-open byte range `[start, start + len)` inside a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// The same span moved `offset` bytes to the right.
    pub fn shifted(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            len: self.len,
        }
    }
}

/// Verdict of evaluating one line against one rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchOutcome {
    pub is_match: bool,
    /// Strictly increasing, non-overlapping highlight spans.
    pub spans: Vec<Span>,
}

impl MatchOutcome {
    /// Outcome for a rule with a blank expression: everything passes, nothing
    /// is highlighted.
    pub fn pass_through() -> Self {
        Self {
            is_match: true,
            spans: Vec::new(),
        }
    }

    /// Build an outcome from raw, possibly unsorted or overlapping spans.
    ///
    /// Spans are sorted by start; a span starting before the end of the last
    /// accepted one is dropped (first found wins). The line matches iff at
    /// least one span survives.
    pub fn from_spans(mut spans: Vec<Span>) -> Self {
        spans.sort_by_key(|s| s.start);

        let mut accepted: Vec<Span> = Vec::with_capacity(spans.len());
        let mut last_end = 0;
        for span in spans {
            if span.start >= last_end {
                last_end = span.end();
                accepted.push(span);
            }
        }

        Self {
            is_match: !accepted.is_empty(),
            spans: accepted,
        }
    }
}

/// Filter mode (plain substring or regex, each with case sensitivity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterMode {
    Plain { case_sensitive: bool },
    Regex { case_sensitive: bool },
}

impl Default for FilterMode {
    fn default() -> Self {
        FilterMode::Plain {
            case_sensitive: false,
        }
    }
}

impl FilterMode {
    pub fn from_flags(use_regex: bool, match_case: bool) -> Self {
        if use_regex {
            FilterMode::Regex {
                case_sensitive: match_case,
            }
        } else {
            FilterMode::Plain {
                case_sensitive: match_case,
            }
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, FilterMode::Regex { .. })
    }

    pub fn is_case_sensitive(&self) -> bool {
        match self {
            FilterMode::Plain { case_sensitive } | FilterMode::Regex { case_sensitive } => {
                *case_sensitive
            }
        }
    }
}

/// The user-editable part of a filter tab.
///
/// Passed across the core boundary as a plain value; `configure_tab` replaces
/// it wholesale and triggers a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSettings {
    pub expression: String,
    pub mode: FilterMode,
    pub foreground: Color,
    pub background: Color,
}

impl RuleSettings {
    pub fn new(expression: impl Into<String>, mode: FilterMode) -> Self {
        Self {
            expression: expression.into(),
            mode,
            foreground: Color::Red,
            background: Color::Transparent,
        }
    }

    pub fn with_colors(mut self, foreground: Color, background: Color) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }
}

/// A named match rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterRule {
    pub name: String,
    #[serde(flatten)]
    pub settings: RuleSettings,
}

impl FilterRule {
    pub fn new(name: impl Into<String>, settings: RuleSettings) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }

    pub fn expression(&self) -> &str {
        &self.settings.expression
    }

    pub fn mode(&self) -> FilterMode {
        self.settings.mode
    }

    /// Blank expressions let every line through unhighlighted.
    pub fn is_pass_through(&self) -> bool {
        self.settings.expression.trim().is_empty()
    }

    /// Segment style used for this rule's matches.
    pub fn highlight_style(&self) -> SegmentStyle {
        SegmentStyle::Highlight {
            foreground: self.settings.foreground,
            background: self.settings.background,
        }
    }

    pub fn description(&self) -> String {
        let mode = self.settings.mode;
        format!(
            "{}: {} ({}, {})",
            if mode.is_regex() { "Regex" } else { "String" },
            self.settings.expression,
            if mode.is_case_sensitive() {
                "case-sensitive"
            } else {
                "case-insensitive"
            },
            self.name
        )
    }
}
