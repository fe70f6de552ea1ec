//! Progress hooks for the pipelines

use crate::error::PipelineError;
use crate::provision::ProvisionStep;
use std::time::Duration;
use valkyrie_cloud::ActionResult;

/// Receives pipeline progress; every hook defaults to doing nothing
pub trait StepObserver: Send + Sync {
    fn step_started(&self, _step: ProvisionStep) {}

    fn step_succeeded(&self, _step: ProvisionStep, _duration: Duration) {}

    fn step_failed(&self, _step: ProvisionStep, _error: &PipelineError) {}

    /// A failed creation is being reverted
    fn rollback_started(&self, _environment: &str) {}

    /// One teardown action finished
    fn action_completed(&self, _result: &ActionResult) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {}
