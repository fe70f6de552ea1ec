//! Pipeline error types

use crate::provision::ProvisionStep;
use std::path::PathBuf;
use thiserror::Error;
use valkyrie_cloud::{CloudError, TeardownReport};

/// Errors raised by the provisioning, teardown and update pipelines
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("Failed to archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("Environment '{environment}' not found (available: {})", available.join(", "))]
    EnvironmentNotFound {
        environment: String,
        available: Vec<String>,
    },

    #[error("Environment '{0}' already exists in this project")]
    EnvironmentExists(String),

    #[error("Environment '{environment}' has no {field} recorded")]
    MissingField {
        environment: String,
        field: &'static str,
    },

    #[error("Project is deployed in {configured}, but {requested} was requested")]
    RegionMismatch {
        configured: String,
        requested: String,
    },

    #[error("Nothing to update: select code, config or both")]
    NoUpdateKind,

    #[error("Background task failed: {0}")]
    Task(String),
}

impl PipelineError {
    pub(crate) fn archive(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Errors raised while provisioning a new environment
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Rejected before any remote call was made
    #[error(transparent)]
    Rejected(#[from] PipelineError),

    /// A step failed after earlier steps may have created resources
    #[error("Step '{}' failed: {source}", step.name())]
    StepFailed {
        step: ProvisionStep,
        #[source]
        source: PipelineError,
        /// Teardown of the partial environment, if one was attempted
        rollback: Option<TeardownReport>,
    },
}

impl ProvisionError {
    /// The step that failed, if any step ran
    pub fn step(&self) -> Option<ProvisionStep> {
        match self {
            Self::StepFailed { step, .. } => Some(*step),
            Self::Rejected(_) => None,
        }
    }

    pub fn rollback(&self) -> Option<&TeardownReport> {
        match self {
            Self::StepFailed { rollback, .. } => rollback.as_ref(),
            Self::Rejected(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
