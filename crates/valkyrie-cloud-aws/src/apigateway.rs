//! API Gateway REST APIs

use crate::error::classify;
use async_trait::async_trait;
use aws_sdk_apigateway::Client;
use aws_sdk_apigateway::types::{ContentHandlingStrategy, IntegrationType};
use valkyrie_cloud::{
    ApiInfo, CloudError, GatewayProvider, IntegrationResponseSpec, IntegrationSpec, MethodSpec,
    Result,
};

/// API Gateway-backed gateway provider
pub struct AwsGateway {
    client: Client,
}

impl AwsGateway {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl GatewayProvider for AwsGateway {
    async fn create_api(&self, name: &str, description: &str) -> Result<ApiInfo> {
        tracing::debug!("CreateRestApi {}", name);

        let output = self
            .client
            .create_rest_api()
            .name(name)
            .description(description)
            .send()
            .await
            .map_err(|e| classify("CreateRestApi", e))?;

        let id = output
            .id()
            .ok_or_else(|| CloudError::invalid_response("CreateRestApi", "no API id"))?;

        Ok(ApiInfo {
            id: id.to_string(),
            name: output.name().unwrap_or(name).to_string(),
        })
    }

    async fn root_resource(&self, api_id: &str) -> Result<String> {
        let output = self
            .client
            .get_resources()
            .rest_api_id(api_id)
            .send()
            .await
            .map_err(|e| classify("GetResources", e))?;

        output
            .items()
            .iter()
            .find(|r| r.path() == Some("/"))
            .and_then(|r| r.id())
            .map(str::to_string)
            .ok_or_else(|| {
                CloudError::invalid_response("GetResources", format!("API {} has no root resource", api_id))
            })
    }

    async fn create_proxy_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String> {
        tracing::debug!("CreateResource {} under {}", path_part, parent_id);

        let output = self
            .client
            .create_resource()
            .rest_api_id(api_id)
            .parent_id(parent_id)
            .path_part(path_part)
            .send()
            .await
            .map_err(|e| classify("CreateResource", e))?;

        output
            .id()
            .map(str::to_string)
            .ok_or_else(|| CloudError::invalid_response("CreateResource", "no resource id"))
    }

    async fn create_method(
        &self,
        api_id: &str,
        resource_id: &str,
        spec: &MethodSpec,
    ) -> Result<()> {
        tracing::debug!("PutMethod {} on {}", spec.http_method, resource_id);

        let mut request = self
            .client
            .put_method()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(&spec.http_method)
            .authorization_type(&spec.authorization_type)
            .api_key_required(spec.api_key_required)
            .set_operation_name(spec.operation_name.clone());

        for (name, required) in &spec.request_parameters {
            request = request.request_parameters(name, *required);
        }

        request
            .send()
            .await
            .map_err(|e| classify("PutMethod", e))?;
        Ok(())
    }

    async fn create_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        spec: &IntegrationSpec,
    ) -> Result<()> {
        tracing::debug!("PutIntegration {} -> {}", resource_id, spec.uri);

        let mut request = self
            .client
            .put_integration()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(&spec.http_method)
            .r#type(IntegrationType::from(spec.integration_type.as_str()))
            .integration_http_method(&spec.integration_http_method)
            .uri(&spec.uri)
            .content_handling(ContentHandlingStrategy::from(spec.content_handling.as_str()))
            .passthrough_behavior(&spec.passthrough_behavior);

        for key in &spec.cache_key_parameters {
            request = request.cache_key_parameters(key);
        }
        for (target, source) in &spec.request_parameters {
            request = request.request_parameters(target, source);
        }

        request
            .send()
            .await
            .map_err(|e| classify("PutIntegration", e))?;
        Ok(())
    }

    async fn create_integration_response(
        &self,
        api_id: &str,
        resource_id: &str,
        spec: &IntegrationResponseSpec,
    ) -> Result<()> {
        let mut request = self
            .client
            .put_integration_response()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(&spec.http_method)
            .status_code(&spec.status_code);

        for (content_type, template) in &spec.response_templates {
            request = request.response_templates(content_type, template);
        }

        request
            .send()
            .await
            .map_err(|e| classify("PutIntegrationResponse", e))?;
        Ok(())
    }

    async fn create_deployment(&self, api_id: &str, stage_name: &str) -> Result<()> {
        tracing::debug!("CreateDeployment {} stage {}", api_id, stage_name);

        self.client
            .create_deployment()
            .rest_api_id(api_id)
            .stage_name(stage_name)
            .send()
            .await
            .map_err(|e| classify("CreateDeployment", e))?;
        Ok(())
    }

    async fn delete_api(&self, api_id: &str) -> Result<()> {
        tracing::debug!("DeleteRestApi {}", api_id);

        self.client
            .delete_rest_api()
            .rest_api_id(api_id)
            .send()
            .await
            .map_err(|e| classify("DeleteRestApi", e))?;
        Ok(())
    }
}
