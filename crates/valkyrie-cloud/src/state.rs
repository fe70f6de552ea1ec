//! Project configuration state
//!
//! Manages the `valkconfig.json` file which records every remote resource
//! provisioned for the project, one record per environment. Fields are only
//! ever set after the corresponding remote call succeeded, so a partially
//! filled record describes exactly what has to be torn down.

use crate::error::{CloudError, Result};
use crate::provider::FunctionConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const CONFIG_FILE: &str = "valkconfig.json";
pub const CONFIG_BACKUP: &str = "valkconfig.json.backup";

/// Root of the persisted project state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectConfiguration {
    pub project: ProjectRecord,

    /// Records indexed by environment name
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectRecord {
    pub region: String,
}

/// One deployment target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentRecord {
    #[serde(default)]
    pub iam: IamRecord,
    #[serde(default)]
    pub lambda: LambdaRecord,
    #[serde(default)]
    pub api: ApiRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_arn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LambdaRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Execution role ARN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LambdaRecord {
    /// Configuration to push when updating the function
    pub fn to_function_config(&self) -> FunctionConfig {
        FunctionConfig {
            role: self.role.clone(),
            memory_size: self.memory_size,
            timeout: self.timeout,
            runtime: self.runtime.clone(),
            handler: self.handler.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl EnvironmentRecord {
    /// No remote resource has been recorded yet
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ProjectConfiguration {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            project: ProjectRecord {
                region: region.into(),
            },
            environments: BTreeMap::new(),
        }
    }

    pub fn region(&self) -> &str {
        &self.project.region
    }

    pub fn environment(&self, name: &str) -> Option<&EnvironmentRecord> {
        self.environments.get(name)
    }

    pub fn has_environment(&self, name: &str) -> bool {
        self.environments.contains_key(name)
    }

    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }

    /// Copy of this configuration with `name` replaced by `record`
    pub fn with_environment(&self, name: &str, record: EnvironmentRecord) -> Self {
        let mut next = self.clone();
        next.environments.insert(name.to_string(), record);
        next
    }

    /// Copy with `name` removed
    pub fn without_environment(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.environments.remove(name);
        next
    }

    /// Copy restricted to a single environment (empty if it is absent)
    pub fn only(&self, name: &str) -> Self {
        let mut scoped = Self::new(self.region());
        if let Some(record) = self.environments.get(name) {
            scoped.environments.insert(name.to_string(), record.clone());
        }
        scoped
    }
}

/// Reads and writes `valkconfig.json` for a project directory
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// Project root directory
    project_root: PathBuf,
}

impl ConfigStore {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> PathBuf {
        self.project_root.join(CONFIG_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.project_root.join(CONFIG_BACKUP)
    }

    /// Load the configuration, `None` if the project has none yet
    pub async fn load(&self) -> Result<Option<ProjectConfiguration>> {
        let path = self.config_path();
        if !path.exists() {
            tracing::debug!("Config file not found: {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let config: ProjectConfiguration = serde_json::from_str(&content).map_err(|e| {
            CloudError::StateError(format!("{} is not valid: {}", path.display(), e))
        })?;

        tracing::debug!(
            "Loaded config with {} environment(s)",
            config.environments.len()
        );
        Ok(Some(config))
    }

    /// Load the configuration, failing if it does not exist
    pub async fn load_required(&self) -> Result<ProjectConfiguration> {
        self.load().await?.ok_or_else(|| {
            CloudError::StateError(format!(
                "{} not found in {}",
                CONFIG_FILE,
                self.project_root.display()
            ))
        })
    }

    /// Rewrite the whole configuration file
    pub async fn save(&self, config: &ProjectConfiguration) -> Result<()> {
        if !self.project_root.exists() {
            fs::create_dir_all(&self.project_root).await?;
        }

        let path = self.config_path();
        let backup = self.backup_path();

        if path.exists() {
            fs::copy(&path, &backup).await?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn staging_record() -> EnvironmentRecord {
        EnvironmentRecord {
            iam: IamRecord {
                role_name: Some("valkyrie-demo-lambda-role".to_string()),
                policy_arn: Some("arn:aws:iam::123:policy/valkyrie-demo-lambda-policy".to_string()),
            },
            lambda: LambdaRecord {
                function_name: Some("valkyrie-demo-lambda".to_string()),
                role: Some("arn:aws:iam::123:role/valkyrie-demo-lambda-role".to_string()),
                memory_size: Some(128),
                timeout: Some(3),
                runtime: Some("nodejs20.x".to_string()),
                handler: Some("index.handler".to_string()),
                description: None,
            },
            api: ApiRecord {
                id: Some("abc123".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = tempdir().unwrap();
        let store = ConfigStore::new(temp_dir.path());

        let config = ProjectConfiguration::new("eu-west-1").with_environment("staging", staging_record());
        store.save(&config).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_missing_config() {
        let temp_dir = tempdir().unwrap();
        let store = ConfigStore::new(temp_dir.path());

        assert!(store.load().await.unwrap().is_none());
        assert!(store.load_required().await.is_err());
    }

    #[tokio::test]
    async fn test_save_keeps_backup() {
        let temp_dir = tempdir().unwrap();
        let store = ConfigStore::new(temp_dir.path());

        let first = ProjectConfiguration::new("eu-west-1");
        store.save(&first).await.unwrap();
        store
            .save(&first.with_environment("staging", staging_record()))
            .await
            .unwrap();

        let backup = std::fs::read_to_string(temp_dir.path().join(CONFIG_BACKUP)).unwrap();
        let backup: ProjectConfiguration = serde_json::from_str(&backup).unwrap();
        assert_eq!(backup, first);
    }

    #[test]
    fn test_serialized_shape() {
        let config = ProjectConfiguration::new("eu-west-1").with_environment(
            "staging",
            EnvironmentRecord {
                iam: IamRecord {
                    role_name: Some("r".to_string()),
                    policy_arn: None,
                },
                ..Default::default()
            },
        );

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["Project"]["Region"], "eu-west-1");
        assert_eq!(value["Environments"]["staging"]["Iam"]["RoleName"], "r");
        assert!(value["Environments"]["staging"]["Iam"].get("PolicyArn").is_none());
        assert_eq!(value["Environments"]["staging"]["Api"], serde_json::json!({}));
    }

    #[test]
    fn test_partial_record_parses() {
        let json = r#"{
            "Project": { "Region": "eu-west-1" },
            "Environments": {
                "staging": { "Iam": { "RoleName": "only-role" } }
            }
        }"#;

        let config: ProjectConfiguration = serde_json::from_str(json).unwrap();
        let staging = config.environment("staging").unwrap();
        assert_eq!(staging.iam.role_name.as_deref(), Some("only-role"));
        assert!(staging.lambda.function_name.is_none());
        assert!(staging.api.id.is_none());
    }

    #[test]
    fn test_only_scopes_to_one_environment() {
        let config = ProjectConfiguration::new("eu-west-1")
            .with_environment("staging", staging_record())
            .with_environment("production", EnvironmentRecord::default());

        let scoped = config.only("production");
        assert_eq!(scoped.environment_names().collect::<Vec<_>>(), vec!["production"]);
        assert_eq!(scoped.region(), "eu-west-1");
        assert!(config.only("missing").environments.is_empty());

        let pruned = config.without_environment("staging");
        assert_eq!(pruned.environment_names().collect::<Vec<_>>(), vec!["production"]);
        assert!(config.has_environment("staging"));
    }

    #[test]
    fn test_lambda_record_to_function_config() {
        let config = staging_record().lambda.to_function_config();
        assert_eq!(config.memory_size, Some(128));
        assert_eq!(config.handler.as_deref(), Some("index.handler"));
        assert!(config.description.is_none());
    }
}
