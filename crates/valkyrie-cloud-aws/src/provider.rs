//! AWS provider construction

use crate::apigateway::AwsGateway;
use crate::error::AwsError;
use crate::iam::AwsIdentity;
use crate::lambda::AwsCompute;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;
use valkyrie_cloud::{Providers, Result};

/// Region and credential binding for all AWS clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: String,

    /// Named profile from the shared credentials file; default chain if unset
    pub profile: Option<String>,
}

impl AwsSettings {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    /// Load the shared SDK configuration
    pub async fn load(&self) -> Result<SdkConfig> {
        if self.region.trim().is_empty() {
            return Err(AwsError::MissingRegion.into());
        }

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(self.region.clone()));
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }

        tracing::debug!(
            "Loading AWS config (region: {}, profile: {})",
            self.region,
            self.profile.as_deref().unwrap_or("default")
        );
        Ok(loader.load().await)
    }
}

/// Build IAM, Lambda and API Gateway providers bound to `settings`
pub async fn connect(settings: &AwsSettings) -> Result<Providers> {
    let config = settings.load().await?;
    Ok(providers_from_config(&settings.region, &config))
}

pub fn providers_from_config(region: &str, config: &SdkConfig) -> Providers {
    Providers::new(
        region,
        Arc::new(AwsIdentity::new(config)),
        Arc::new(AwsCompute::new(config)),
        Arc::new(AwsGateway::new(config)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_region_is_rejected() {
        let err = AwsSettings::new("  ").load().await.unwrap_err();
        assert!(matches!(err, valkyrie_cloud::CloudError::InvalidConfig(_)));
    }

    #[test]
    fn test_providers_from_static_config() {
        let config = SdkConfig::builder()
            .region(Region::new("eu-west-1"))
            .behavior_version(BehaviorVersion::latest())
            .build();

        let providers = providers_from_config("eu-west-1", &config);
        assert_eq!(providers.region, "eu-west-1");
    }
}
