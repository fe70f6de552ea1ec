//! User settings and create-command defaults

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";

/// Per-user settings stored in `<config_dir>/valkyrie/settings.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// AWS profile used when none is given on the command line
    #[serde(default)]
    pub profile: Option<String>,

    /// Region for new projects
    #[serde(default)]
    pub region: Option<String>,

    /// Environments whose updates require confirmation
    #[serde(default = "default_protected_environments")]
    pub protected_environments: Vec<String>,
}

fn default_protected_environments() -> Vec<String> {
    vec!["production".to_string()]
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            profile: None,
            region: None,
            protected_environments: default_protected_environments(),
        }
    }
}

impl UserSettings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("valkyrie").join(SETTINGS_FILE))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Settings file not found: {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidSettings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Defaults applied to `valkyrie create` when a flag is omitted
pub struct CreateDefaults;

impl CreateDefaults {
    pub const REGION: &'static str = "eu-west-1";
    pub const ENVIRONMENT: &'static str = "staging";
    pub const MEMORY_SIZE: i32 = 128;
    pub const TIMEOUT: i32 = 3;
    pub const RUNTIME: &'static str = "nodejs20.x";
    pub const HANDLER: &'static str = "index.handler";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings = UserSettings::load_from(&temp_dir.path().join(SETTINGS_FILE)).unwrap();

        assert_eq!(settings, UserSettings::default());
        assert_eq!(settings.protected_environments, vec!["production".to_string()]);
    }

    #[test]
    fn test_load_settings_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE);
        fs::write(
            &path,
            r#"{ "profile": "work", "region": "us-east-1", "protectedEnvironments": ["prod", "production"] }"#,
        )
        .unwrap();

        let settings = UserSettings::load_from(&path).unwrap();
        assert_eq!(settings.profile.as_deref(), Some("work"));
        assert_eq!(settings.region.as_deref(), Some("us-east-1"));
        assert_eq!(
            settings.protected_environments,
            vec!["prod".to_string(), "production".to_string()]
        );
    }

    #[test]
    fn test_partial_settings_keep_protected_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "profile": "work" }"#).unwrap();

        let settings = UserSettings::load_from(&path).unwrap();
        assert_eq!(settings.protected_environments, vec!["production".to_string()]);
    }

    #[test]
    fn test_invalid_settings_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE);
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            UserSettings::load_from(&path),
            Err(ConfigError::InvalidSettings { .. })
        ));
    }
}
