//! Valkyrie pipelines
//!
//! - [`provision`]: creates one environment step by step, persisting
//!   progress and reverting on failure
//! - [`deprovision`]: tears down everything a project configuration records
//! - [`update`]: pushes new code or configuration to an environment

pub mod archive;
pub mod confirm;
pub mod deprovision;
pub mod error;
pub mod observer;
pub mod provision;
pub mod templates;
pub mod update;

pub use archive::ProjectArchiver;
pub use confirm::{AssumeYes, Confirm, PipelineOutcome};
pub use deprovision::{DELETE_PROMPT, Deprovisioner};
pub use error::{PipelineError, ProvisionError, Result};
pub use observer::{NoopObserver, StepObserver};
pub use provision::{
    ProvisionContext, ProvisionReport, ProvisionRequest, ProvisionStep, Provisioner,
};
pub use update::{UpdateKinds, UpdateReport, UpdateRequest, Updater};
