pub mod error;
pub mod settings;

pub use error::*;
pub use settings::{CreateDefaults, UserSettings};

use std::path::{Path, PathBuf};

/// File marking a Valkyrie project root
pub const PROJECT_FILE: &str = "valkconfig.json";

/// Environment variable overriding project discovery
pub const CONFIG_PATH_ENV: &str = "VALKYRIE_CONFIG_PATH";

/// Find the root of the current project
///
/// Search order:
/// 1. `VALKYRIE_CONFIG_PATH` (a `valkconfig.json` file or the directory holding it)
/// 2. The current directory and each of its parents
pub fn find_project_root() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            if let Some(parent) = path.parent() {
                return Ok(parent.to_path_buf());
            }
        } else if path.join(PROJECT_FILE).is_file() {
            return Ok(path);
        }
        tracing::warn!(
            "{} points to {}, which holds no {}",
            CONFIG_PATH_ENV,
            path.display(),
            PROJECT_FILE
        );
    }

    let current_dir = std::env::current_dir()?;
    find_project_root_from(&current_dir)
}

/// Walk up from `start` looking for `valkconfig.json`
pub fn find_project_root_from(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_FILE).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| ConfigError::ProjectNotFound(start.to_path_buf()))
}

/// Project name derived from its directory name
pub fn project_name_from_dir(dir: &Path) -> Option<String> {
    dir.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_lowercase().replace([' ', '_'], "-"))
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_find_project_root_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), "{}").unwrap();

        let root = find_project_root_from(temp_dir.path()).unwrap();
        assert_eq!(root, temp_dir.path());
    }

    #[test]
    fn test_find_project_root_from_subdirectory() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), "{}").unwrap();
        let nested = temp_dir.path().join("src").join("handlers");
        fs::create_dir_all(&nested).unwrap();

        let root = find_project_root_from(&nested).unwrap();
        assert_eq!(root, temp_dir.path());
    }

    #[test]
    fn test_find_project_root_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();

        let result = find_project_root_from(temp_dir.path());
        if let Err(ConfigError::ProjectNotFound(start)) = result {
            assert_eq!(start, temp_dir.path());
        } else {
            panic!("Expected ProjectNotFound error");
        }
    }

    #[test]
    #[serial]
    fn test_find_project_root_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join(PROJECT_FILE);
        fs::write(&config_path, "{}").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        }

        let result = find_project_root().unwrap();
        assert_eq!(result, temp_dir.path());

        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_find_project_root_env_var_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), "{}").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, temp_dir.path().to_str().unwrap());
        }

        let result = find_project_root().unwrap();
        assert_eq!(result, temp_dir.path());

        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_find_project_root_walks_up_from_cwd() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), "{}").unwrap();
        let nested = temp_dir.path().join("lib");
        fs::create_dir(&nested).unwrap();

        std::env::set_current_dir(&nested).unwrap();
        let result = find_project_root();
        std::env::set_current_dir(original_dir).unwrap();

        assert_eq!(
            result.unwrap().canonicalize().unwrap(),
            temp_dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_name_from_dir() {
        assert_eq!(
            project_name_from_dir(Path::new("/work/My_Service")),
            Some("my-service".to_string())
        );
        assert_eq!(project_name_from_dir(Path::new("/")), None);
    }
}
