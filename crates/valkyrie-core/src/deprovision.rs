//! Teardown of provisioned environments
//!
//! Resources are deleted one family at a time in reverse dependency order
//! (see [`TeardownAction::ORDER`]), all environments of the project
//! concurrently inside each family. Fields missing from a record are
//! skipped, missing remote resources count as already deleted, and any
//! other failure is recorded as a warning without stopping later batches.

use crate::confirm::{Confirm, PipelineOutcome};
use crate::observer::{NoopObserver, StepObserver};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use valkyrie_cloud::{
    ActionOutcome, ActionResult, CloudError, EnvironmentRecord, ProjectConfiguration, Providers,
    RetryPolicy, TeardownAction, TeardownReport, with_retry,
};

/// Prompt shown before an interactive teardown
pub const DELETE_PROMPT: &str = "All AWS infrastructure related to this project will be deleted \
     and it will be impossible to restore it, including roles and policies. Continue?";

/// The resource one action applies to in one environment
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Attachment {
        policy_arn: &'a str,
        role_name: &'a str,
    },
    Policy(&'a str),
    Role(&'a str),
    Function(&'a str),
    Api(&'a str),
}

impl<'a> Target<'a> {
    fn of(action: TeardownAction, record: &'a EnvironmentRecord) -> Option<Self> {
        match action {
            TeardownAction::DetachPolicy => {
                match (record.iam.policy_arn.as_deref(), record.iam.role_name.as_deref()) {
                    (Some(policy_arn), Some(role_name)) => Some(Self::Attachment {
                        policy_arn,
                        role_name,
                    }),
                    _ => None,
                }
            }
            TeardownAction::DeletePolicy => record.iam.policy_arn.as_deref().map(Self::Policy),
            TeardownAction::DeleteRole => record.iam.role_name.as_deref().map(Self::Role),
            TeardownAction::DeleteFunction => {
                record.lambda.function_name.as_deref().map(Self::Function)
            }
            TeardownAction::DeleteApi => record.api.id.as_deref().map(Self::Api),
        }
    }

    fn resource(&self) -> String {
        match self {
            Self::Attachment {
                policy_arn,
                role_name,
            } => format!("{} from {}", policy_arn, role_name),
            Self::Policy(name) | Self::Role(name) | Self::Function(name) | Self::Api(name) => {
                name.to_string()
            }
        }
    }
}

fn absent_ok(result: Result<(), CloudError>) -> Result<ActionOutcome, CloudError> {
    match result {
        Ok(()) => Ok(ActionOutcome::Deleted),
        Err(e) if e.is_not_found() => Ok(ActionOutcome::AlreadyAbsent),
        Err(e) => Err(e),
    }
}

/// Deletes everything a [`ProjectConfiguration`] records
pub struct Deprovisioner {
    providers: Providers,
    retry: RetryPolicy,
    observer: Arc<dyn StepObserver>,
}

impl Deprovisioner {
    pub fn new(providers: Providers) -> Self {
        Self {
            providers,
            retry: RetryPolicy::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Retry policy used for gateway deletion
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Ask for confirmation, then tear down every environment of `config`
    pub async fn teardown_confirmed(
        &self,
        config: &ProjectConfiguration,
        confirm: &dyn Confirm,
    ) -> PipelineOutcome<TeardownReport> {
        if !confirm.confirm(DELETE_PROMPT).await {
            tracing::info!("Teardown cancelled by user");
            return PipelineOutcome::Cancelled;
        }
        PipelineOutcome::Completed(self.teardown(config).await)
    }

    /// Tear down every environment of `config` without asking
    pub async fn teardown(&self, config: &ProjectConfiguration) -> TeardownReport {
        let start = Instant::now();
        let mut report = TeardownReport::new();

        for action in TeardownAction::ORDER {
            let targets: Vec<(&str, Target<'_>)> = config
                .environments
                .iter()
                .filter_map(|(env, record)| Target::of(action, record).map(|t| (env.as_str(), t)))
                .collect();

            if targets.is_empty() {
                continue;
            }

            tracing::debug!("{} on {} environment(s)", action, targets.len());
            let outcomes = join_all(targets.iter().map(|(_, target)| self.execute(*target))).await;

            for ((environment, target), outcome) in targets.into_iter().zip(outcomes) {
                let result = ActionResult {
                    environment: environment.to_string(),
                    action,
                    resource: target.resource(),
                    outcome,
                };
                log_result(&result);
                self.observer.action_completed(&result);
                report.results.push(result);
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!("Teardown finished: {}", report.summary());
        report
    }

    async fn execute(&self, target: Target<'_>) -> ActionOutcome {
        let identity = &self.providers.identity;
        let result = match target {
            Target::Attachment {
                policy_arn,
                role_name,
            } => absent_ok(identity.detach_policy(policy_arn, role_name).await),
            Target::Policy(policy_arn) => absent_ok(identity.delete_policy(policy_arn).await),
            Target::Role(role_name) => absent_ok(identity.delete_role(role_name).await),
            Target::Function(name) => {
                absent_ok(self.providers.compute.delete_function(name).await)
            }
            Target::Api(api_id) => {
                let gateway = &self.providers.gateway;
                with_retry(self.retry, || async move {
                    absent_ok(gateway.delete_api(api_id).await)
                })
                .await
            }
        };

        result.unwrap_or_else(|e| ActionOutcome::Failed(e.to_string()))
    }
}

fn log_result(result: &ActionResult) {
    match &result.outcome {
        ActionOutcome::Deleted => tracing::info!(
            "[{}] {}: {}",
            result.environment,
            result.action,
            result.resource
        ),
        ActionOutcome::AlreadyAbsent => tracing::debug!(
            "[{}] {}: {} already absent",
            result.environment,
            result.action,
            result.resource
        ),
        ActionOutcome::Failed(message) => tracing::warn!(
            "[{}] {} failed for {}: {}",
            result.environment,
            result.action,
            result.resource,
            message
        ),
    }
}
