//! Config loading for tabtail.
//!
//! Loads YAML config files, merges them and validates the result.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::discovery::DiscoveryResult;
use crate::config::error::{suggest, ConfigError};
use crate::config::types::{Config, RawConfig, Theme, KNOWN_KEYS};
use crate::history::is_valid_timestamp_format;

/// Load and parse a YAML config file.
fn load_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Comment-only files are valid and set nothing
    if content
        .lines()
        .all(|line| line.trim().is_empty() || line.trim_start().starts_with('#'))
    {
        return Ok(RawConfig::default());
    }

    serde_saphyr::from_str(&content)
        .map_err(|e| ConfigError::from_saphyr_error(path.to_path_buf(), e, KNOWN_KEYS))
}

/// Check a merged raw config and fill in defaults.
///
/// `origin` is the file blamed in validation errors.
fn validate(raw: RawConfig, origin: &Path) -> Result<Config, ConfigError> {
    let invalid = |message: String| ConfigError::Validation {
        path: origin.to_path_buf(),
        message,
    };
    let mut config = Config::default();

    if let Some(capacity) = raw.capacity {
        if capacity == 0 {
            return Err(invalid("capacity must be at least 1".to_string()));
        }
        config.capacity = capacity;
    }

    if let Some(limit) = raw.max_pending_bytes {
        if limit == 0 {
            return Err(invalid("max_pending_bytes must be at least 1".to_string()));
        }
        config.max_pending_bytes = Some(limit);
    }

    if let Some(format) = raw.timestamp_format {
        if !is_valid_timestamp_format(&format) {
            return Err(invalid(format!("invalid timestamp_format '{}'", format)));
        }
        config.timestamp_format = format;
    }

    if let Some(name) = raw.theme {
        config.theme = Theme::from_name(&name).ok_or_else(|| {
            let mut message = format!(
                "unknown theme '{}'. Available themes: {}",
                name,
                Theme::NAMES.join(", ")
            );
            if let Some(s) = suggest(&name, Theme::NAMES) {
                message.push_str(&format!(". Did you mean '{}'?", s));
            }
            invalid(message)
        })?;
    }

    Ok(config)
}

/// Load config from a single explicit file (`--config PATH`).
pub fn load_single_file(path: &Path) -> Result<Config, ConfigError> {
    validate(load_file(path)?, path)
}

/// Load config from discovered config files.
///
/// Global values are read first, project values override them field by
/// field. Returns the defaults when no config file exists.
pub fn load(discovery: &DiscoveryResult) -> Result<Config, ConfigError> {
    let mut raw = RawConfig::default();
    let mut origin: Option<&PathBuf> = None;

    if let Some(global_path) = &discovery.global_config {
        raw = raw.merge(load_file(global_path)?);
        origin = Some(global_path);
    }

    if let Some(project_path) = &discovery.project_config {
        raw = raw.merge(load_file(project_path)?);
        origin = Some(project_path);
    }

    match origin {
        Some(path) => validate(raw, path),
        None => Ok(Config::default()),
    }
}
