//! IAM roles and policies

use crate::error::classify;
use async_trait::async_trait;
use aws_sdk_iam::Client;
use valkyrie_cloud::{CloudError, IdentityProvider, PolicyInfo, PolicySpec, Result, RoleInfo, RoleSpec};

/// IAM-backed identity provider
pub struct AwsIdentity {
    client: Client,
}

impl AwsIdentity {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl IdentityProvider for AwsIdentity {
    async fn create_role(&self, spec: &RoleSpec) -> Result<RoleInfo> {
        tracing::debug!("CreateRole {}", spec.name);

        let output = self
            .client
            .create_role()
            .role_name(&spec.name)
            .assume_role_policy_document(&spec.trust_policy)
            .description(&spec.description)
            .path(&spec.path)
            .send()
            .await
            .map_err(|e| classify("CreateRole", e))?;

        let role = output
            .role()
            .ok_or_else(|| CloudError::invalid_response("CreateRole", "no role in response"))?;

        Ok(RoleInfo {
            role_name: role.role_name().to_string(),
            role_arn: role.arn().to_string(),
        })
    }

    async fn create_policy(&self, spec: &PolicySpec) -> Result<PolicyInfo> {
        tracing::debug!("CreatePolicy {}", spec.name);

        let output = self
            .client
            .create_policy()
            .policy_name(&spec.name)
            .policy_document(&spec.document)
            .description(&spec.description)
            .path(&spec.path)
            .send()
            .await
            .map_err(|e| classify("CreatePolicy", e))?;

        let policy = output
            .policy()
            .ok_or_else(|| CloudError::invalid_response("CreatePolicy", "no policy in response"))?;
        let policy_arn = policy
            .arn()
            .ok_or_else(|| CloudError::invalid_response("CreatePolicy", "policy has no ARN"))?;

        Ok(PolicyInfo {
            policy_name: policy.policy_name().unwrap_or(&spec.name).to_string(),
            policy_arn: policy_arn.to_string(),
        })
    }

    async fn attach_policy(&self, policy_arn: &str, role_name: &str) -> Result<()> {
        tracing::debug!("AttachRolePolicy {} -> {}", policy_arn, role_name);

        self.client
            .attach_role_policy()
            .policy_arn(policy_arn)
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| classify("AttachRolePolicy", e))?;
        Ok(())
    }

    async fn detach_policy(&self, policy_arn: &str, role_name: &str) -> Result<()> {
        tracing::debug!("DetachRolePolicy {} <- {}", policy_arn, role_name);

        self.client
            .detach_role_policy()
            .policy_arn(policy_arn)
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| classify("DetachRolePolicy", e))?;
        Ok(())
    }

    async fn delete_policy(&self, policy_arn: &str) -> Result<()> {
        tracing::debug!("DeletePolicy {}", policy_arn);

        self.client
            .delete_policy()
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| classify("DeletePolicy", e))?;
        Ok(())
    }

    async fn delete_role(&self, role_name: &str) -> Result<()> {
        tracing::debug!("DeleteRole {}", role_name);

        self.client
            .delete_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| classify("DeleteRole", e))?;
        Ok(())
    }
}
