//! Deterministic resource names
//!
//! Every resource is named `valkyrie-<project>-<kind>`. Environments other
//! than the default one insert their name after the project so that several
//! environments of one project never collide.

pub const RESOURCE_PREFIX: &str = "valkyrie";
pub const DEFAULT_ENVIRONMENT: &str = "staging";
/// IAM path every role and policy is created under
pub const IAM_PATH: &str = "/valkyrie/";

/// Kinds of named resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Role,
    Policy,
    Function,
    Api,
}

impl ResourceKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Role => "lambda-role",
            Self::Policy => "lambda-policy",
            Self::Function => "lambda",
            Self::Api => "api",
        }
    }
}

/// Names of all resources of one project environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    project: String,
    environment: String,
}

impl ResourceNames {
    pub fn new(project: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            environment: environment.into(),
        }
    }

    pub fn name(&self, kind: ResourceKind) -> String {
        if self.environment == DEFAULT_ENVIRONMENT {
            format!("{}-{}-{}", RESOURCE_PREFIX, self.project, kind.suffix())
        } else {
            format!(
                "{}-{}-{}-{}",
                RESOURCE_PREFIX,
                self.project,
                self.environment,
                kind.suffix()
            )
        }
    }

    pub fn role(&self) -> String {
        self.name(ResourceKind::Role)
    }

    pub fn policy(&self) -> String {
        self.name(ResourceKind::Policy)
    }

    pub fn function(&self) -> String {
        self.name(ResourceKind::Function)
    }

    pub fn api(&self) -> String {
        self.name(ResourceKind::Api)
    }
}
