//! Code and configuration updates of a provisioned function

use crate::archive::ProjectArchiver;
use crate::confirm::{Confirm, PipelineOutcome};
use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use valkyrie_cloud::{FunctionConfig, FunctionInfo, ProjectConfiguration, Providers};

/// What to push to the function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateKinds {
    pub code: bool,
    pub config: bool,
}

impl UpdateKinds {
    pub fn code() -> Self {
        Self {
            code: true,
            config: false,
        }
    }

    pub fn config() -> Self {
        Self {
            code: false,
            config: true,
        }
    }

    pub fn both() -> Self {
        Self {
            code: true,
            config: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.code && !self.config
    }
}

impl std::fmt::Display for UpdateKinds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code, self.config) {
            (true, true) => write!(f, "code and config"),
            (true, false) => write!(f, "code"),
            (false, true) => write!(f, "config"),
            (false, false) => write!(f, "nothing"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub environment: String,
    pub kinds: UpdateKinds,
    /// Directory packaged as the new code
    pub project_dir: PathBuf,
}

/// Function metadata returned by each update call
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub environment: String,
    pub function_name: String,
    pub code: Option<FunctionInfo>,
    pub config: Option<FunctionInfo>,
}

/// Pushes code and configuration to an existing environment
pub struct Updater {
    providers: Providers,
    protected: Vec<String>,
}

impl Updater {
    pub fn new(providers: Providers) -> Self {
        Self {
            providers,
            protected: vec!["production".to_string()],
        }
    }

    /// Environments whose updates need confirmation
    pub fn with_protected_environments(mut self, protected: Vec<String>) -> Self {
        self.protected = protected;
        self
    }

    pub fn is_protected(&self, environment: &str) -> bool {
        self.protected.iter().any(|e| e == environment)
    }

    pub async fn update(
        &self,
        config: &ProjectConfiguration,
        request: &UpdateRequest,
        confirm: &dyn Confirm,
    ) -> Result<PipelineOutcome<UpdateReport>> {
        if request.kinds.is_empty() {
            return Err(PipelineError::NoUpdateKind);
        }

        let environment = &request.environment;
        let record =
            config
                .environment(environment)
                .ok_or_else(|| PipelineError::EnvironmentNotFound {
                    environment: environment.clone(),
                    available: config.environment_names().map(String::from).collect(),
                })?;
        let function_name =
            record
                .lambda
                .function_name
                .as_deref()
                .ok_or_else(|| PipelineError::MissingField {
                    environment: environment.clone(),
                    field: "Lambda.FunctionName",
                })?;

        if self.is_protected(environment) {
            let prompt = format!(
                "You are about to update Lambda {} in {}. Continue?",
                request.kinds, environment
            );
            if !confirm.confirm(&prompt).await {
                tracing::info!("Update of {} cancelled by user", environment);
                return Ok(PipelineOutcome::Cancelled);
            }
        }

        tracing::info!(
            "Updating {} {} ({})",
            environment,
            request.kinds,
            function_name
        );

        let function_config = record.lambda.to_function_config();
        let (code, config) = tokio::join!(
            self.push_code(request.kinds.code, function_name, &request.project_dir),
            self.push_config(request.kinds.config, function_name, &function_config),
        );

        Ok(PipelineOutcome::Completed(UpdateReport {
            environment: environment.clone(),
            function_name: function_name.to_string(),
            code: code?,
            config: config?,
        }))
    }

    async fn push_code(
        &self,
        selected: bool,
        function_name: &str,
        project_dir: &Path,
    ) -> Result<Option<FunctionInfo>> {
        if !selected {
            return Ok(None);
        }
        let code = ProjectArchiver::package(project_dir).await?;
        let info = self
            .providers
            .compute
            .update_function_code(function_name, &code)
            .await?;
        tracing::debug!("Code of {} updated", function_name);
        Ok(Some(info))
    }

    async fn push_config(
        &self,
        selected: bool,
        function_name: &str,
        config: &FunctionConfig,
    ) -> Result<Option<FunctionInfo>> {
        if !selected {
            return Ok(None);
        }
        let info = self
            .providers
            .compute
            .update_function_configuration(function_name, config)
            .await?;
        tracing::debug!("Configuration of {} updated", function_name);
        Ok(Some(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_kinds_display() {
        assert_eq!(UpdateKinds::both().to_string(), "code and config");
        assert_eq!(UpdateKinds::config().to_string(), "config");
        assert!(UpdateKinds::default().is_empty());
    }
}
