//! Config discovery for tabtail.
//!
//! Walks parent directories to find `tabtail.yaml` and checks for global config
//! at `~/.config/tabtail/config.yaml`.

use std::path::{Path, PathBuf};

/// Project config filename to search for in parent directories.
pub const PROJECT_CONFIG_NAME: &str = "tabtail.yaml";

/// Global config filename within the tabtail config directory.
pub const GLOBAL_CONFIG_NAME: &str = "config.yaml";

/// Name of the tabtail directory under the platform config dir.
const APP_DIR_NAME: &str = "tabtail";

/// Result of config discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    /// Directory containing `tabtail.yaml` (the project root).
    pub project_root: Option<PathBuf>,
    /// Full path to the project config file (`tabtail.yaml`).
    pub project_config: Option<PathBuf>,
    /// Full path to the global config file (`~/.config/tabtail/config.yaml`).
    pub global_config: Option<PathBuf>,
}

impl DiscoveryResult {
    /// Returns true if any config was found (project or global).
    pub fn has_config(&self) -> bool {
        self.project_config.is_some() || self.global_config.is_some()
    }
}

/// Discover config files starting from the current working directory.
pub fn discover() -> DiscoveryResult {
    discover_verbose().0
}

/// Same as [`discover`] but also returns every directory searched during the
/// walk. Used for `-v` output.
pub fn discover_verbose() -> (DiscoveryResult, Vec<PathBuf>) {
    let mut result = DiscoveryResult {
        global_config: global_config_path(),
        ..Default::default()
    };

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.canonicalize().unwrap_or(dir),
        Err(_) => return (result, Vec::new()),
    };

    let searched = find_project_config(&cwd, &mut result);
    (result, searched)
}

/// Global config path, if the file exists.
fn global_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?
        .join(APP_DIR_NAME)
        .join(GLOBAL_CONFIG_NAME);
    (path.try_exists().unwrap_or(false) && path.is_file()).then_some(path)
}

/// Walk `start` and its ancestors looking for `tabtail.yaml`, recording the
/// first hit in `result`. Returns the directories searched.
pub fn find_project_config(start: &Path, result: &mut DiscoveryResult) -> Vec<PathBuf> {
    let mut searched_paths = Vec::new();

    for ancestor in start.ancestors() {
        searched_paths.push(ancestor.to_path_buf());

        let config_path = ancestor.join(PROJECT_CONFIG_NAME);
        if config_path.try_exists().unwrap_or(false) && config_path.is_file() {
            result.project_root = Some(ancestor.to_path_buf());
            result.project_config = Some(config_path);
            break;
        }
    }

    searched_paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finds_config_in_start_dir() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(PROJECT_CONFIG_NAME);
        fs::write(&config_path, "capacity: 10\n").unwrap();

        let mut result = DiscoveryResult::default();
        let searched = find_project_config(temp.path(), &mut result);

        assert_eq!(result.project_config, Some(config_path));
        assert_eq!(result.project_root.as_deref(), Some(temp.path()));
        assert_eq!(searched.len(), 1);
    }

    #[test]
    fn test_finds_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("level1").join("level2");
        fs::create_dir_all(&subdir).unwrap();
        let config_path = temp.path().join(PROJECT_CONFIG_NAME);
        fs::write(&config_path, "capacity: 10\n").unwrap();

        let mut result = DiscoveryResult::default();
        let searched = find_project_config(&subdir, &mut result);

        assert_eq!(result.project_config, Some(config_path));
        assert_eq!(searched.len(), 3);
        assert_eq!(searched[0], subdir);
    }

    #[test]
    fn test_directory_named_like_config_is_ignored() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(PROJECT_CONFIG_NAME)).unwrap();

        let mut result = DiscoveryResult::default();
        find_project_config(temp.path(), &mut result);

        assert_ne!(result.project_root.as_deref(), Some(temp.path()));
    }

    #[test]
    fn test_has_config_methods() {
        let empty = DiscoveryResult::default();
        assert!(!empty.has_config());

        let with_project = DiscoveryResult {
            project_config: Some(PathBuf::from("/test/tabtail.yaml")),
            ..Default::default()
        };
        assert!(with_project.has_config());

        let with_global = DiscoveryResult {
            global_config: Some(PathBuf::from("/home/user/.config/tabtail/config.yaml")),
            ..Default::default()
        };
        assert!(with_global.has_config());
    }
}
