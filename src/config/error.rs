//! Config error types for tabtail.
//!
//! Provides rich error messages with file locations and typo suggestions.

use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Error loading or parsing a config file.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading the config file.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parse error.
    Parse {
        path: PathBuf,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
        suggestion: Option<String>,
    },

    /// Validation error (semantic errors after parsing).
    Validation { path: PathBuf, message: String },
}

impl ConfigError {
    /// Build a parse error from a YAML deserialization failure.
    ///
    /// Pulls the location out of the message when present, and for unknown
    /// keys suggests the closest of `known_keys`.
    pub fn from_saphyr_error(path: PathBuf, err: serde_saphyr::Error, known_keys: &[&str]) -> Self {
        Self::from_parse_message(path, err.to_string(), known_keys)
    }

    fn from_parse_message(path: PathBuf, message: String, known_keys: &[&str]) -> Self {
        let (line, column) = parse_location(&message);
        let suggestion = unknown_field(&message).and_then(|field| suggest(&field, known_keys));
        let message = message.lines().next().unwrap_or_default().trim().to_string();

        ConfigError::Parse {
            path,
            message,
            line,
            column,
            suggestion,
        }
    }

    /// Format error in Cargo-style format.
    pub fn format_cargo_style(&self) -> String {
        match self {
            ConfigError::Io { path, source } => {
                format!(
                    "error: cannot read config file\n  --> {}\n  |\n  = {}\n",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse {
                path,
                message,
                line,
                column,
                suggestion,
            } => {
                let location = match (line, column) {
                    (Some(l), Some(c)) => format!("{}:{}:{}", path.display(), l, c),
                    (Some(l), None) => format!("{}:{}", path.display(), l),
                    _ => format!("{}", path.display()),
                };
                let mut output = format!("error: {}\n  --> {}\n  |\n", message, location);
                if let Some(suggestion) = suggestion {
                    output.push_str(&format!("  = help: did you mean `{}`?\n", suggestion));
                }
                output
            }
            ConfigError::Validation { path, message } => {
                format!("error: {}\n  --> {}\n  |\n", message, path.display())
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_cargo_style())
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Closest entry of `known` to `name`, if any is similar enough.
pub fn suggest(name: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .filter(|&&candidate| jaro_winkler(name, candidate) >= SIMILARITY_THRESHOLD)
        .max_by(|a, b| {
            jaro_winkler(name, a)
                .partial_cmp(&jaro_winkler(name, b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|&s| s.to_string())
}

fn unknown_field(message: &str) -> Option<String> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r"unknown field `([^`]+)`").ok())
        .as_ref()?;
    re.captures(message).map(|caps| caps[1].to_string())
}

fn parse_location(message: &str) -> (Option<usize>, Option<usize>) {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = RE
        .get_or_init(|| Regex::new(r"line (\d+)(?:,? col(?:umn)? (\d+))?").ok())
        .as_ref()
    else {
        return (None, None);
    };
    match re.captures(message) {
        Some(caps) => (
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
            caps.get(2).and_then(|m| m.as_str().parse().ok()),
        ),
        None => (None, None),
    }
}
