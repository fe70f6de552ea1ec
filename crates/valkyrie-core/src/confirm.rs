//! User confirmation and cancellable outcomes

use async_trait::async_trait;

/// Asks the user to approve a destructive or protected operation
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Approves every prompt (`--yes`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

#[async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!("Auto-confirmed: {}", prompt);
        true
    }
}

/// Result of a pipeline the user may decline
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum PipelineOutcome<T> {
    Completed(T),
    /// The user declined the confirmation prompt
    Cancelled,
}

impl<T> PipelineOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}
