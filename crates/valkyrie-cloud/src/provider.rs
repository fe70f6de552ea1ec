//! Capability traits for the three remote service families
//!
//! A deployment touches identity (execution role and policy), compute (the
//! function) and the API gateway. Each family is a separate trait so that
//! pipelines depend only on what they call and tests can substitute any of
//! them independently.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Identity and access management (roles, policies, attachments)
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a role assumable by the principals named in `spec.trust_policy`
    async fn create_role(&self, spec: &RoleSpec) -> Result<RoleInfo>;

    /// Create a managed policy
    async fn create_policy(&self, spec: &PolicySpec) -> Result<PolicyInfo>;

    /// Attach a managed policy to a role
    async fn attach_policy(&self, policy_arn: &str, role_name: &str) -> Result<()>;

    /// Detach a managed policy from a role
    async fn detach_policy(&self, policy_arn: &str, role_name: &str) -> Result<()>;

    async fn delete_policy(&self, policy_arn: &str) -> Result<()>;

    async fn delete_role(&self, role_name: &str) -> Result<()>;
}

/// Function compute service
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    async fn create_function(&self, spec: &FunctionSpec) -> Result<FunctionInfo>;

    /// Replace the function's deployment package
    async fn update_function_code(&self, name: &str, code: &[u8]) -> Result<FunctionInfo>;

    /// Push new configuration; unset fields are left unchanged remotely
    async fn update_function_configuration(
        &self,
        name: &str,
        config: &FunctionConfig,
    ) -> Result<FunctionInfo>;

    async fn delete_function(&self, name: &str) -> Result<()>;
}

/// Managed REST API gateway
#[async_trait]
pub trait GatewayProvider: Send + Sync {
    async fn create_api(&self, name: &str, description: &str) -> Result<ApiInfo>;

    /// Id of the `/` resource every new API starts with
    async fn root_resource(&self, api_id: &str) -> Result<String>;

    /// Create a child resource and return its id
    async fn create_proxy_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String>;

    async fn create_method(&self, api_id: &str, resource_id: &str, spec: &MethodSpec)
    -> Result<()>;

    async fn create_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        spec: &IntegrationSpec,
    ) -> Result<()>;

    async fn create_integration_response(
        &self,
        api_id: &str,
        resource_id: &str,
        spec: &IntegrationResponseSpec,
    ) -> Result<()>;

    async fn create_deployment(&self, api_id: &str, stage_name: &str) -> Result<()>;

    async fn delete_api(&self, api_id: &str) -> Result<()>;
}

/// The three capability groups bound to one region and credential set
#[derive(Clone)]
pub struct Providers {
    pub region: String,
    pub identity: Arc<dyn IdentityProvider>,
    pub compute: Arc<dyn ComputeProvider>,
    pub gateway: Arc<dyn GatewayProvider>,
}

impl Providers {
    pub fn new(
        region: impl Into<String>,
        identity: Arc<dyn IdentityProvider>,
        compute: Arc<dyn ComputeProvider>,
        gateway: Arc<dyn GatewayProvider>,
    ) -> Self {
        Self {
            region: region.into(),
            identity,
            compute,
            gateway,
        }
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Role creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    /// JSON trust policy document
    pub trust_policy: String,
    pub description: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub role_name: String,
    pub role_arn: String,
}

/// Managed policy creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySpec {
    pub name: String,
    /// JSON permissions document
    pub document: String,
    pub description: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInfo {
    pub policy_name: String,
    pub policy_arn: String,
}

/// Function creation request
#[derive(Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    /// Entry point, e.g. `index.handler`
    pub handler: String,
    pub memory_size: i32,
    pub timeout: i32,
    pub runtime: String,
    /// Execution role ARN
    pub role_arn: String,
    /// Zip archive bytes
    #[serde(skip)]
    pub code: Vec<u8>,
}

impl std::fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("handler", &self.handler)
            .field("memory_size", &self.memory_size)
            .field("timeout", &self.timeout)
            .field("runtime", &self.runtime)
            .field("role_arn", &self.role_arn)
            .field("code_bytes", &self.code.len())
            .finish()
    }
}

/// Mutable function settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionConfig {
    pub role: Option<String>,
    pub memory_size: Option<i32>,
    pub timeout: Option<i32>,
    pub runtime: Option<String>,
    pub handler: Option<String>,
    pub description: Option<String>,
}

/// Function metadata returned by the compute service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub function_name: String,
    pub function_arn: String,
    pub runtime: Option<String>,
    pub memory_size: Option<i32>,
    pub timeout: Option<i32>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub id: String,
    pub name: String,
}

/// Method binding on a gateway resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodSpec {
    pub http_method: String,
    pub authorization_type: String,
    /// Request parameter name → required
    pub request_parameters: BTreeMap<String, bool>,
    pub api_key_required: bool,
    pub operation_name: Option<String>,
}

/// How the gateway forwards a method to its backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationType {
    /// Whole request passed to the function, response returned as-is
    AwsProxy,
}

impl IntegrationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwsProxy => "AWS_PROXY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentHandling {
    ConvertToText,
}

impl ContentHandling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConvertToText => "CONVERT_TO_TEXT",
        }
    }
}

/// Integration between a method and its backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationSpec {
    pub http_method: String,
    pub integration_type: IntegrationType,
    /// Verb used by the gateway when calling the backend
    pub integration_http_method: String,
    pub uri: String,
    pub content_handling: ContentHandling,
    pub passthrough_behavior: String,
    pub cache_key_parameters: Vec<String>,
    /// Integration parameter → method parameter it is mapped from
    pub request_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationResponseSpec {
    pub http_method: String,
    pub status_code: String,
    /// Content type → mapping template
    pub response_templates: BTreeMap<String, String>,
}
