//! Config types for tabtail.

use serde::Deserialize;

use crate::buffer::DEFAULT_CAPACITY;
use crate::history::DEFAULT_TIMESTAMP_FORMAT;
use crate::renderer::Color;
use crate::session::SessionOptions;
use crate::source::LineFramer;

/// Keys accepted in a config file, for typo suggestions.
pub const KNOWN_KEYS: &[&str] = &["capacity", "max_pending_bytes", "timestamp_format", "theme"];

/// Raw config file structure (used for parsing).
///
/// Mirrors the YAML file. Unknown fields are rejected with an error.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Lines kept in history, the raw view and every tab.
    pub capacity: Option<usize>,
    /// Force a line break once this many unterminated bytes are buffered.
    pub max_pending_bytes: Option<usize>,
    /// strftime pattern for the timestamp prefix.
    pub timestamp_format: Option<String>,
    /// `dark` or `light`.
    pub theme: Option<String>,
}

impl RawConfig {
    /// Field-by-field override: values set in `other` win.
    pub fn merge(self, other: RawConfig) -> RawConfig {
        RawConfig {
            capacity: other.capacity.or(self.capacity),
            max_pending_bytes: other.max_pending_bytes.or(self.max_pending_bytes),
            timestamp_format: other.timestamp_format.or(self.timestamp_format),
            theme: other.theme.or(self.theme),
        }
    }
}

/// Terminal background the CLI renders for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub const NAMES: &'static [&'static str] = &["dark", "light"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    /// Foreground for unhighlighted text.
    pub fn base_foreground(&self) -> Color {
        match self {
            Theme::Dark => Color::LightGray,
            Theme::Light => Color::Black,
        }
    }
}

/// Validated, merged configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub capacity: usize,
    /// `None` keeps the framer unbounded.
    pub max_pending_bytes: Option<usize>,
    pub timestamp_format: String,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_pending_bytes: None,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            theme: Theme::default(),
        }
    }
}

impl Config {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            capacity: self.capacity,
            timestamp_format: self.timestamp_format.clone(),
        }
    }

    /// Line framer honoring `max_pending_bytes`.
    pub fn framer(&self) -> LineFramer {
        match self.max_pending_bytes {
            Some(limit) => LineFramer::with_max_pending(limit),
            None => LineFramer::new(),
        }
    }
}
