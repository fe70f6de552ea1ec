//! Valkyrie Cloud Infrastructure
//!
//! This crate provides the provider abstraction and durable project state
//! shared by the Valkyrie pipelines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Valkyrie CLI                    │
//! │           (create / update / delete)             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                valkyrie-core                     │
//! │   provision ─ deprovision ─ update pipelines     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               valkyrie-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Identity / Compute / Gateway traits      │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Retry Policy │  │ valkconfig   │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼────────┐
//!           │ valkyrie-cloud │
//!           │      -aws      │
//!           └────────────────┘
//! ```

pub mod action;
pub mod error;
pub mod naming;
pub mod provider;
pub mod retry;
pub mod state;

// Re-exports
pub use action::{ActionOutcome, ActionResult, TeardownAction, TeardownReport, TeardownSummary};
pub use error::{CloudError, Result};
pub use naming::{DEFAULT_ENVIRONMENT, IAM_PATH, ResourceKind, ResourceNames};
pub use provider::{
    ApiInfo, ComputeProvider, ContentHandling, FunctionConfig, FunctionInfo, FunctionSpec,
    GatewayProvider, IdentityProvider, IntegrationResponseSpec, IntegrationSpec, IntegrationType,
    MethodSpec, PolicyInfo, PolicySpec, Providers, RoleInfo, RoleSpec,
};
pub use retry::{RetryPolicy, with_retry};
pub use state::{
    ApiRecord, CONFIG_BACKUP, CONFIG_FILE, ConfigStore, EnvironmentRecord, IamRecord, LambdaRecord,
    ProjectConfiguration, ProjectRecord,
};
