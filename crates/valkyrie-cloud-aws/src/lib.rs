//! AWS provider for Valkyrie
//!
//! Implements the identity, compute and gateway capability traits of
//! `valkyrie-cloud` on top of IAM, Lambda and API Gateway (REST APIs).
//!
//! # Requirements
//!
//! - AWS credentials resolvable by the default provider chain
//!   (environment, shared credentials file, SSO, instance metadata)
//!
//! # Example
//!
//! ```ignore
//! use valkyrie_cloud_aws::{AwsSettings, connect};
//!
//! let providers = connect(&AwsSettings::new("eu-west-1")).await?;
//! let api = providers.gateway.create_api("valkyrie-demo-api", "Valkyrie application").await?;
//! ```

pub mod apigateway;
pub mod error;
pub mod iam;
pub mod lambda;
pub mod provider;

pub use apigateway::AwsGateway;
pub use error::AwsError;
pub use iam::AwsIdentity;
pub use lambda::AwsCompute;
pub use provider::{AwsSettings, connect, providers_from_config};

