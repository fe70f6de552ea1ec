//! Lambda functions

use crate::error::classify;
use async_trait::async_trait;
use aws_sdk_lambda::Client;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{FunctionCode, Runtime};
use valkyrie_cloud::{
    CloudError, ComputeProvider, FunctionConfig, FunctionInfo, FunctionSpec, Result,
};

/// Build a `FunctionInfo` from any Lambda output carrying function metadata
macro_rules! function_info {
    ($operation:expr, $output:expr) => {{
        let output = $output;
        let function_name = output
            .function_name()
            .ok_or_else(|| CloudError::invalid_response($operation, "no function name"))?
            .to_string();
        FunctionInfo {
            function_name,
            function_arn: output.function_arn().unwrap_or_default().to_string(),
            runtime: output.runtime().map(|r| r.as_str().to_string()),
            memory_size: output.memory_size(),
            timeout: output.timeout(),
            last_modified: output.last_modified().map(str::to_string),
        }
    }};
}

/// Lambda-backed compute provider
pub struct AwsCompute {
    client: Client,
}

impl AwsCompute {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ComputeProvider for AwsCompute {
    async fn create_function(&self, spec: &FunctionSpec) -> Result<FunctionInfo> {
        tracing::debug!("CreateFunction {:?}", spec);

        let code = FunctionCode::builder()
            .zip_file(Blob::new(spec.code.clone()))
            .build();

        let output = self
            .client
            .create_function()
            .function_name(&spec.name)
            .description(&spec.description)
            .handler(&spec.handler)
            .memory_size(spec.memory_size)
            .timeout(spec.timeout)
            .runtime(Runtime::from(spec.runtime.as_str()))
            .role(&spec.role_arn)
            .code(code)
            .send()
            .await
            .map_err(|e| classify("CreateFunction", e))?;

        Ok(function_info!("CreateFunction", output))
    }

    async fn update_function_code(&self, name: &str, code: &[u8]) -> Result<FunctionInfo> {
        tracing::debug!("UpdateFunctionCode {} ({} bytes)", name, code.len());

        let output = self
            .client
            .update_function_code()
            .function_name(name)
            .zip_file(Blob::new(code.to_vec()))
            .send()
            .await
            .map_err(|e| classify("UpdateFunctionCode", e))?;

        Ok(function_info!("UpdateFunctionCode", output))
    }

    async fn update_function_configuration(
        &self,
        name: &str,
        config: &FunctionConfig,
    ) -> Result<FunctionInfo> {
        tracing::debug!("UpdateFunctionConfiguration {} {:?}", name, config);

        let output = self
            .client
            .update_function_configuration()
            .function_name(name)
            .set_role(config.role.clone())
            .set_memory_size(config.memory_size)
            .set_timeout(config.timeout)
            .set_runtime(config.runtime.as_deref().map(Runtime::from))
            .set_handler(config.handler.clone())
            .set_description(config.description.clone())
            .send()
            .await
            .map_err(|e| classify("UpdateFunctionConfiguration", e))?;

        Ok(function_info!("UpdateFunctionConfiguration", output))
    }

    async fn delete_function(&self, name: &str) -> Result<()> {
        tracing::debug!("DeleteFunction {}", name);

        self.client
            .delete_function()
            .function_name(name)
            .send()
            .await
            .map_err(|e| classify("DeleteFunction", e))?;
        Ok(())
    }
}
