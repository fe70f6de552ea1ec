//! Provisioning of a new environment
//!
//! Creation is an explicit list of [`ProvisionStep`]s run in order by a
//! small interpreter. Each step receives the current [`ProvisionContext`]
//! and returns the next one; whenever the recorded configuration changed it
//! is written to `valkconfig.json` before the following step starts. The
//! first failure stops the run and, unless disabled, tears down whatever the
//! environment already recorded.

use crate::archive::ProjectArchiver;
use crate::deprovision::Deprovisioner;
use crate::error::{PipelineError, ProvisionError, Result};
use crate::observer::{NoopObserver, StepObserver};
use crate::templates::{
    PROXY_INTEGRATION_PARAMETER, PROXY_METHOD_PARAMETER, PROXY_PATH_PART, invoke_url,
    lambda_integration_uri, lambda_trust_policy, log_policy,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use valkyrie_cloud::{
    ConfigStore, ContentHandling, EnvironmentRecord, FunctionSpec, IAM_PATH, IntegrationResponseSpec,
    IntegrationSpec, IntegrationType, MethodSpec, PolicySpec, ProjectConfiguration, Providers,
    ResourceNames, RetryPolicy, RoleSpec, TeardownReport, with_retry,
};

/// Steps of environment creation, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionStep {
    /// Execution role assumable by the compute service
    CreateRole,
    /// Log-writing policy
    CreatePolicy,
    AttachPolicy,
    /// Package the project and create the function
    CreateFunction,
    CreateApi,
    /// `{proxy+}` resource under the API root
    CreateProxyResource,
    CreateMethod,
    CreateIntegration,
    CreateIntegrationResponse,
    CreateDeployment,
}

impl ProvisionStep {
    pub const ALL: [ProvisionStep; 10] = [
        Self::CreateRole,
        Self::CreatePolicy,
        Self::AttachPolicy,
        Self::CreateFunction,
        Self::CreateApi,
        Self::CreateProxyResource,
        Self::CreateMethod,
        Self::CreateIntegration,
        Self::CreateIntegrationResponse,
        Self::CreateDeployment,
    ];

    /// Human readable step name
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRole => "Create role",
            Self::CreatePolicy => "Create policy",
            Self::AttachPolicy => "Attach policy",
            Self::CreateFunction => "Create function",
            Self::CreateApi => "Create API",
            Self::CreateProxyResource => "Create proxy resource",
            Self::CreateMethod => "Create method",
            Self::CreateIntegration => "Create integration",
            Self::CreateIntegrationResponse => "Create integration response",
            Self::CreateDeployment => "Create deployment",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::CreateRole => "role",
            Self::CreatePolicy => "policy",
            Self::AttachPolicy => "attach",
            Self::CreateFunction => "function",
            Self::CreateApi => "api",
            Self::CreateProxyResource => "resource",
            Self::CreateMethod => "method",
            Self::CreateIntegration => "integration",
            Self::CreateIntegrationResponse => "integration-response",
            Self::CreateDeployment => "deployment",
        }
    }
}

impl std::fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to create one environment
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub project_name: String,
    pub environment: String,
    pub description: String,
    pub memory_size: i32,
    pub timeout: i32,
    pub runtime: String,
    pub handler: String,
    /// Directory packaged as the function code
    pub project_dir: PathBuf,
    /// Tear down the partial environment when a step fails
    pub revert_on_failure: bool,
}

/// State threaded from one step to the next
#[derive(Debug, Clone)]
pub struct ProvisionContext {
    pub config: ProjectConfiguration,
    pub environment: String,
    pub role_arn: Option<String>,
    pub function_arn: Option<String>,
    pub root_resource_id: Option<String>,
    pub proxy_resource_id: Option<String>,
}

impl ProvisionContext {
    fn new(config: ProjectConfiguration, environment: &str) -> Self {
        Self {
            config: config.with_environment(environment, EnvironmentRecord::default()),
            environment: environment.to_string(),
            role_arn: None,
            function_arn: None,
            root_resource_id: None,
            proxy_resource_id: None,
        }
    }

    /// Record of the environment being created
    pub fn record(&self) -> EnvironmentRecord {
        self.config
            .environment(&self.environment)
            .cloned()
            .unwrap_or_default()
    }

    /// Copy with the environment record changed by `update`
    fn with_record(&self, update: impl FnOnce(&mut EnvironmentRecord)) -> Self {
        let mut record = self.record();
        update(&mut record);
        Self {
            config: self.config.with_environment(&self.environment, record),
            ..self.clone()
        }
    }

    fn require<'a>(&self, value: &'a Option<String>, field: &'static str) -> Result<&'a str> {
        value.as_deref().ok_or_else(|| PipelineError::MissingField {
            environment: self.environment.clone(),
            field,
        })
    }
}

/// Result of a successful creation
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub config: ProjectConfiguration,
    pub environment: String,
    pub steps: Vec<(ProvisionStep, Duration)>,
    pub invoke_url: String,
}

impl ProvisionReport {
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|(_, d)| *d).sum()
    }
}

/// Runs the creation steps against a set of providers
pub struct Provisioner {
    providers: Providers,
    store: ConfigStore,
    retry: RetryPolicy,
    observer: Arc<dyn StepObserver>,
}

impl Provisioner {
    pub fn new(providers: Providers, store: ConfigStore) -> Self {
        Self {
            providers,
            store,
            retry: RetryPolicy::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Retry policy for function creation and rollback API deletion
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Create `request.environment`, recording progress in the project's
    /// `valkconfig.json`
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> std::result::Result<ProvisionReport, ProvisionError> {
        let existing = self.store.load().await.map_err(PipelineError::from)?;
        let config = self.prepare(existing, &request.environment)?;

        let mut ctx = ProvisionContext::new(config, &request.environment);
        self.store
            .save(&ctx.config)
            .await
            .map_err(PipelineError::from)?;

        tracing::info!(
            "Provisioning {} ({}) in {}",
            request.project_name,
            request.environment,
            self.providers.region
        );

        let mut steps = Vec::with_capacity(ProvisionStep::ALL.len());
        for step in ProvisionStep::ALL {
            self.observer.step_started(step);
            let start = Instant::now();

            let next = match self.run_step(step, request, &ctx).await {
                Ok(next) => next,
                Err(source) => {
                    tracing::error!("{} failed: {}", step, source);
                    self.observer.step_failed(step, &source);
                    let rollback = self.revert(request, &ctx).await;
                    return Err(ProvisionError::StepFailed {
                        step,
                        source,
                        rollback,
                    });
                }
            };

            if next.config != ctx.config {
                if let Err(e) = self.store.save(&next.config).await {
                    let source = PipelineError::from(e);
                    self.observer.step_failed(step, &source);
                    let rollback = self.revert(request, &next).await;
                    return Err(ProvisionError::StepFailed {
                        step,
                        source,
                        rollback,
                    });
                }
            }

            let duration = start.elapsed();
            tracing::info!("{} completed in {:?}", step, duration);
            self.observer.step_succeeded(step, duration);
            steps.push((step, duration));
            ctx = next;
        }

        let api_id = ctx.record().api.id.unwrap_or_default();
        Ok(ProvisionReport {
            invoke_url: invoke_url(&api_id, &self.providers.region, &request.environment),
            config: ctx.config,
            environment: request.environment.clone(),
            steps,
        })
    }

    /// Validate the existing configuration before touching anything remote
    fn prepare(
        &self,
        existing: Option<ProjectConfiguration>,
        environment: &str,
    ) -> Result<ProjectConfiguration> {
        let Some(config) = existing else {
            return Ok(ProjectConfiguration::new(&self.providers.region));
        };

        if config.region() != self.providers.region {
            return Err(PipelineError::RegionMismatch {
                configured: config.region().to_string(),
                requested: self.providers.region.clone(),
            });
        }

        if config
            .environment(environment)
            .is_some_and(|record| !record.is_empty())
        {
            return Err(PipelineError::EnvironmentExists(environment.to_string()));
        }

        Ok(config)
    }

    async fn run_step(
        &self,
        step: ProvisionStep,
        request: &ProvisionRequest,
        ctx: &ProvisionContext,
    ) -> Result<ProvisionContext> {
        let names = ResourceNames::new(&request.project_name, &request.environment);
        let record = ctx.record();

        match step {
            ProvisionStep::CreateRole => {
                let role = self
                    .providers
                    .identity
                    .create_role(&RoleSpec {
                        name: names.role(),
                        trust_policy: lambda_trust_policy(),
                        description: format!(
                            "Valkyrie \"{}\" project role assumed by \"{}\"",
                            request.project_name,
                            names.function()
                        ),
                        path: IAM_PATH.to_string(),
                    })
                    .await?;

                tracing::debug!("Role {} created ({})", role.role_name, role.role_arn);
                let next = ctx.with_record(|r| {
                    r.iam.role_name = Some(role.role_name);
                    r.lambda.role = Some(role.role_arn.clone());
                });
                Ok(ProvisionContext {
                    role_arn: Some(role.role_arn),
                    ..next
                })
            }

            ProvisionStep::CreatePolicy => {
                let role_name = ctx.require(&record.iam.role_name, "Iam.RoleName")?;
                let policy = self
                    .providers
                    .identity
                    .create_policy(&PolicySpec {
                        name: names.policy(),
                        document: log_policy(),
                        description: format!(
                            "Valkyrie \"{}\" project policy attached to \"{}\"",
                            request.project_name, role_name
                        ),
                        path: IAM_PATH.to_string(),
                    })
                    .await?;

                tracing::debug!("Policy {} created ({})", policy.policy_name, policy.policy_arn);
                Ok(ctx.with_record(|r| r.iam.policy_arn = Some(policy.policy_arn)))
            }

            ProvisionStep::AttachPolicy => {
                let policy_arn = ctx.require(&record.iam.policy_arn, "Iam.PolicyArn")?;
                let role_name = ctx.require(&record.iam.role_name, "Iam.RoleName")?;
                self.providers
                    .identity
                    .attach_policy(policy_arn, role_name)
                    .await?;

                tracing::debug!("{} attached to {}", policy_arn, role_name);
                Ok(ctx.clone())
            }

            ProvisionStep::CreateFunction => {
                let role_arn = ctx.require(&ctx.role_arn, "Lambda.Role")?;
                let code = ProjectArchiver::package(&request.project_dir).await?;
                let spec = FunctionSpec {
                    name: names.function(),
                    description: request.description.clone(),
                    handler: request.handler.clone(),
                    memory_size: request.memory_size,
                    timeout: request.timeout,
                    runtime: request.runtime.clone(),
                    role_arn: role_arn.to_string(),
                    code,
                };

                // A fresh role is not immediately assumable by the compute service
                let compute = &self.providers.compute;
                let function = with_retry(self.retry, || compute.create_function(&spec)).await?;

                tracing::debug!(
                    "Function {} created ({})",
                    function.function_name,
                    function.function_arn
                );
                let next = ctx.with_record(|r| {
                    r.lambda.function_name = Some(function.function_name.clone());
                    r.lambda.memory_size = Some(function.memory_size.unwrap_or(spec.memory_size));
                    r.lambda.timeout = Some(function.timeout.unwrap_or(spec.timeout));
                    r.lambda.runtime =
                        Some(function.runtime.clone().unwrap_or_else(|| spec.runtime.clone()));
                    r.lambda.handler = Some(spec.handler.clone());
                    r.lambda.description = Some(spec.description.clone());
                });
                Ok(ProvisionContext {
                    function_arn: Some(function.function_arn),
                    ..next
                })
            }

            ProvisionStep::CreateApi => {
                let api = self
                    .providers
                    .gateway
                    .create_api(&names.api(), "Valkyrie application")
                    .await?;

                tracing::debug!("API {} created ({})", api.name, api.id);
                Ok(ctx.with_record(|r| r.api.id = Some(api.id)))
            }

            ProvisionStep::CreateProxyResource => {
                let api_id = ctx.require(&record.api.id, "Api.Id")?;
                let gateway = &self.providers.gateway;
                let root_id = gateway.root_resource(api_id).await?;
                let proxy_id = gateway
                    .create_proxy_resource(api_id, &root_id, PROXY_PATH_PART)
                    .await?;

                tracing::debug!("{} resource created ({})", PROXY_PATH_PART, proxy_id);
                Ok(ProvisionContext {
                    root_resource_id: Some(root_id),
                    proxy_resource_id: Some(proxy_id),
                    ..ctx.clone()
                })
            }

            ProvisionStep::CreateMethod => {
                let api_id = ctx.require(&record.api.id, "Api.Id")?;
                let resource_id = ctx.require(&ctx.proxy_resource_id, "proxy resource")?;
                let spec = MethodSpec {
                    http_method: "ANY".to_string(),
                    authorization_type: "NONE".to_string(),
                    request_parameters: BTreeMap::from([(
                        PROXY_METHOD_PARAMETER.to_string(),
                        true,
                    )]),
                    api_key_required: false,
                    operation_name: Some("Valkyrie proxy".to_string()),
                };
                self.providers
                    .gateway
                    .create_method(api_id, resource_id, &spec)
                    .await?;
                Ok(ctx.clone())
            }

            ProvisionStep::CreateIntegration => {
                let api_id = ctx.require(&record.api.id, "Api.Id")?;
                let resource_id = ctx.require(&ctx.proxy_resource_id, "proxy resource")?;
                let function_arn = ctx.require(&ctx.function_arn, "function ARN")?;
                let spec = IntegrationSpec {
                    http_method: "ANY".to_string(),
                    integration_type: IntegrationType::AwsProxy,
                    integration_http_method: "POST".to_string(),
                    uri: lambda_integration_uri(&self.providers.region, function_arn),
                    content_handling: ContentHandling::ConvertToText,
                    passthrough_behavior: "WHEN_NO_MATCH".to_string(),
                    cache_key_parameters: vec![PROXY_METHOD_PARAMETER.to_string()],
                    request_parameters: BTreeMap::from([(
                        PROXY_INTEGRATION_PARAMETER.to_string(),
                        PROXY_METHOD_PARAMETER.to_string(),
                    )]),
                };
                self.providers
                    .gateway
                    .create_integration(api_id, resource_id, &spec)
                    .await?;
                Ok(ctx.clone())
            }

            ProvisionStep::CreateIntegrationResponse => {
                let api_id = ctx.require(&record.api.id, "Api.Id")?;
                let resource_id = ctx.require(&ctx.proxy_resource_id, "proxy resource")?;
                let spec = IntegrationResponseSpec {
                    http_method: "ANY".to_string(),
                    status_code: "200".to_string(),
                    response_templates: BTreeMap::from([(
                        "application/json".to_string(),
                        "{}".to_string(),
                    )]),
                };
                self.providers
                    .gateway
                    .create_integration_response(api_id, resource_id, &spec)
                    .await?;
                Ok(ctx.clone())
            }

            ProvisionStep::CreateDeployment => {
                let api_id = ctx.require(&record.api.id, "Api.Id")?;
                self.providers
                    .gateway
                    .create_deployment(api_id, &request.environment)
                    .await?;
                Ok(ctx.clone())
            }
        }
    }

    /// Tear down the partial environment after a failed step
    async fn revert(
        &self,
        request: &ProvisionRequest,
        ctx: &ProvisionContext,
    ) -> Option<TeardownReport> {
        if !request.revert_on_failure {
            tracing::info!("Leaving partial environment {} in place", ctx.environment);
            return None;
        }

        tracing::info!("Reverting partial environment {}", ctx.environment);
        self.observer.rollback_started(&ctx.environment);

        let report = Deprovisioner::new(self.providers.clone())
            .with_retry_policy(self.retry)
            .with_observer(Arc::clone(&self.observer))
            .teardown(&ctx.config.only(&ctx.environment))
            .await;

        for warning in report.warnings() {
            tracing::warn!(
                "Rollback could not {} {}: {:?}",
                warning.action,
                warning.resource,
                warning.outcome
            );
        }

        if report.is_clean() {
            let pruned = ctx.config.without_environment(&ctx.environment);
            if let Err(e) = self.store.save(&pruned).await {
                tracing::warn!("Failed to prune reverted environment from config: {}", e);
            }
        }

        Some(report)
    }
}
