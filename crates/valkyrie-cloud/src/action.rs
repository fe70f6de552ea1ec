//! Teardown actions and their results

use serde::{Deserialize, Serialize};

/// One kind of deletion, listed in the order teardown runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownAction {
    /// Remove the policy/role attachment
    DetachPolicy,
    DeletePolicy,
    DeleteRole,
    DeleteFunction,
    DeleteApi,
}

impl TeardownAction {
    /// All actions in reverse dependency order
    pub const ORDER: [TeardownAction; 5] = [
        Self::DetachPolicy,
        Self::DeletePolicy,
        Self::DeleteRole,
        Self::DeleteFunction,
        Self::DeleteApi,
    ];
}

impl std::fmt::Display for TeardownAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeardownAction::DetachPolicy => write!(f, "detach-policy"),
            TeardownAction::DeletePolicy => write!(f, "delete-policy"),
            TeardownAction::DeleteRole => write!(f, "delete-role"),
            TeardownAction::DeleteFunction => write!(f, "delete-function"),
            TeardownAction::DeleteApi => write!(f, "delete-api"),
        }
    }
}

/// Outcome of a single deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Deleted,
    /// The resource was already gone
    AlreadyAbsent,
    Failed(String),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub environment: String,

    pub action: TeardownAction,

    /// Name, ARN or id of the resource acted upon
    pub resource: String,

    pub outcome: ActionOutcome,
}

/// Result of a whole teardown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeardownReport {
    pub results: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl TeardownReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        environment: impl Into<String>,
        action: TeardownAction,
        resource: impl Into<String>,
        outcome: ActionOutcome,
    ) {
        self.results.push(ActionResult {
            environment: environment.into(),
            action,
            resource: resource.into(),
            outcome,
        });
    }

    /// True when no deletion failed
    pub fn is_clean(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_success())
    }

    /// Failed deletions, reported as warnings
    pub fn warnings(&self) -> Vec<&ActionResult> {
        self.results
            .iter()
            .filter(|r| !r.outcome.is_success())
            .collect()
    }

    /// Attempted actions in execution order
    pub fn actions(&self) -> Vec<TeardownAction> {
        self.results.iter().map(|r| r.action).collect()
    }

    pub fn summary(&self) -> TeardownSummary {
        let mut summary = TeardownSummary::default();
        for result in &self.results {
            match result.outcome {
                ActionOutcome::Deleted => summary.deleted += 1,
                ActionOutcome::AlreadyAbsent => summary.absent += 1,
                ActionOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Summary of a teardown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownSummary {
    pub deleted: usize,
    pub absent: usize,
    pub failed: usize,
}

impl std::fmt::Display for TeardownSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} deleted, {} already absent, {} failed",
            self.deleted, self.absent, self.failed
        )
    }
}
