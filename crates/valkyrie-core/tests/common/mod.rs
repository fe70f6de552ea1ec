use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Barrier;
use valkyrie_cloud::{
    ApiInfo, CloudError, ComputeProvider, FunctionConfig, FunctionInfo, FunctionSpec,
    GatewayProvider, IdentityProvider, IntegrationResponseSpec, IntegrationSpec, MethodSpec,
    PolicyInfo, PolicySpec, Providers, Result, RetryPolicy, RoleInfo, RoleSpec,
};
use valkyrie_core::Confirm;

pub const REGION: &str = "eu-west-1";
const ACCOUNT: &str = "123456789012";

/// Retry policy with the production attempt count and no real waiting
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(6, Duration::from_millis(1))
}

/// In-memory stand-in for IAM, Lambda and API Gateway
#[derive(Default)]
pub struct FakeCloud {
    calls: Mutex<Vec<String>>,
    /// Operation → remaining failures (`None` fails forever)
    failures: Mutex<HashMap<String, Option<u32>>>,
    roles: Mutex<HashSet<String>>,
    policies: Mutex<HashSet<String>>,
    attachments: Mutex<HashSet<(String, String)>>,
    functions: Mutex<HashSet<String>>,
    apis: Mutex<HashSet<String>>,
    pushed_configs: Mutex<Vec<FunctionConfig>>,
    /// Operation → barrier its calls wait on before completing
    barriers: Mutex<HashMap<String, Arc<Barrier>>>,
    next_id: AtomicUsize,
}

#[allow(dead_code)]
impl FakeCloud {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn providers(self: &Arc<Self>) -> Providers {
        Providers::new(REGION, self.clone(), self.clone(), self.clone())
    }

    /// Fail `operation` on every call
    pub fn fail_always(&self, operation: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation.to_string(), None);
    }

    /// Fail the next `times` calls of `operation`
    pub fn fail_times(&self, operation: &str, times: u32) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation.to_string(), Some(times));
    }

    /// Hold calls of `operations` until `parties` of them are in flight
    pub fn rendezvous(&self, operations: &[&str], parties: usize) {
        let barrier = Arc::new(Barrier::new(parties));
        let mut barriers = self.barriers.lock().unwrap();
        for operation in operations {
            barriers.insert(operation.to_string(), barrier.clone());
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn pushed_configs(&self) -> Vec<FunctionConfig> {
        self.pushed_configs.lock().unwrap().clone()
    }

    /// True when no resource of any kind is left
    pub fn is_empty(&self) -> bool {
        self.roles.lock().unwrap().is_empty()
            && self.policies.lock().unwrap().is_empty()
            && self.attachments.lock().unwrap().is_empty()
            && self.functions.lock().unwrap().is_empty()
            && self.apis.lock().unwrap().is_empty()
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.lock().unwrap().contains(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.lock().unwrap().contains(name)
    }

    pub fn api_count(&self) -> usize {
        self.apis.lock().unwrap().len()
    }

    /// Register a resource as if created outside the pipeline
    pub fn seed_function(&self, name: &str) {
        self.functions.lock().unwrap().insert(name.to_string());
    }

    fn call(&self, operation: &str) -> Result<()> {
        self.calls.lock().unwrap().push(operation.to_string());

        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(operation) {
            Some(None) => Err(CloudError::api(operation, "injected failure")),
            Some(Some(remaining)) if *remaining > 0 => {
                *remaining -= 1;
                Err(CloudError::api(
                    operation,
                    format!("injected failure ({} left)", remaining),
                ))
            }
            _ => Ok(()),
        }
    }

    async fn wait(&self, operation: &str) {
        let barrier = self.barriers.lock().unwrap().get(operation).cloned();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
    }

    fn id(&self) -> String {
        format!("id{:04}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn remove(set: &Mutex<HashSet<String>>, key: &str) -> Result<()> {
        if set.lock().unwrap().remove(key) {
            Ok(())
        } else {
            Err(CloudError::NotFound(key.to_string()))
        }
    }

    fn function_info(name: &str) -> FunctionInfo {
        FunctionInfo {
            function_name: name.to_string(),
            function_arn: format!("arn:aws:lambda:{}:{}:function:{}", REGION, ACCOUNT, name),
            ..Default::default()
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeCloud {
    async fn create_role(&self, spec: &RoleSpec) -> Result<RoleInfo> {
        self.call("create_role")?;
        self.roles.lock().unwrap().insert(spec.name.clone());
        Ok(RoleInfo {
            role_name: spec.name.clone(),
            role_arn: format!("arn:aws:iam::{}:role{}{}", ACCOUNT, spec.path, spec.name),
        })
    }

    async fn create_policy(&self, spec: &PolicySpec) -> Result<PolicyInfo> {
        self.call("create_policy")?;
        let arn = format!("arn:aws:iam::{}:policy{}{}", ACCOUNT, spec.path, spec.name);
        self.policies.lock().unwrap().insert(arn.clone());
        Ok(PolicyInfo {
            policy_name: spec.name.clone(),
            policy_arn: arn,
        })
    }

    async fn attach_policy(&self, policy_arn: &str, role_name: &str) -> Result<()> {
        self.call("attach_policy")?;
        self.attachments
            .lock()
            .unwrap()
            .insert((policy_arn.to_string(), role_name.to_string()));
        Ok(())
    }

    async fn detach_policy(&self, policy_arn: &str, role_name: &str) -> Result<()> {
        self.call("detach_policy")?;
        let key = (policy_arn.to_string(), role_name.to_string());
        if self.attachments.lock().unwrap().remove(&key) {
            Ok(())
        } else {
            Err(CloudError::NotFound(policy_arn.to_string()))
        }
    }

    async fn delete_policy(&self, policy_arn: &str) -> Result<()> {
        self.call("delete_policy")?;
        Self::remove(&self.policies, policy_arn)
    }

    async fn delete_role(&self, role_name: &str) -> Result<()> {
        self.call("delete_role")?;
        self.wait("delete_role").await;
        Self::remove(&self.roles, role_name)
    }
}

#[async_trait]
impl ComputeProvider for FakeCloud {
    async fn create_function(&self, spec: &FunctionSpec) -> Result<FunctionInfo> {
        self.call("create_function")?;
        assert!(!spec.code.is_empty(), "function created without code");
        self.functions.lock().unwrap().insert(spec.name.clone());
        Ok(FunctionInfo {
            runtime: Some(spec.runtime.clone()),
            memory_size: Some(spec.memory_size),
            timeout: Some(spec.timeout),
            ..Self::function_info(&spec.name)
        })
    }

    async fn update_function_code(&self, name: &str, code: &[u8]) -> Result<FunctionInfo> {
        self.call("update_function_code")?;
        self.wait("update_function_code").await;
        assert!(!code.is_empty(), "empty code pushed");
        if !self.has_function(name) {
            return Err(CloudError::NotFound(name.to_string()));
        }
        Ok(Self::function_info(name))
    }

    async fn update_function_configuration(
        &self,
        name: &str,
        config: &FunctionConfig,
    ) -> Result<FunctionInfo> {
        self.call("update_function_configuration")?;
        self.wait("update_function_configuration").await;
        if !self.has_function(name) {
            return Err(CloudError::NotFound(name.to_string()));
        }
        self.pushed_configs.lock().unwrap().push(config.clone());
        Ok(FunctionInfo {
            memory_size: config.memory_size,
            timeout: config.timeout,
            runtime: config.runtime.clone(),
            ..Self::function_info(name)
        })
    }

    async fn delete_function(&self, name: &str) -> Result<()> {
        self.call("delete_function")?;
        Self::remove(&self.functions, name)
    }
}

#[async_trait]
impl GatewayProvider for FakeCloud {
    async fn create_api(&self, name: &str, _description: &str) -> Result<ApiInfo> {
        self.call("create_api")?;
        let id = self.id();
        self.apis.lock().unwrap().insert(id.clone());
        Ok(ApiInfo {
            id,
            name: name.to_string(),
        })
    }

    async fn root_resource(&self, api_id: &str) -> Result<String> {
        self.call("root_resource")?;
        Ok(format!("{}-root", api_id))
    }

    async fn create_proxy_resource(
        &self,
        _api_id: &str,
        _parent_id: &str,
        path_part: &str,
    ) -> Result<String> {
        self.call("create_proxy_resource")?;
        assert_eq!(path_part, "{proxy+}");
        Ok(self.id())
    }

    async fn create_method(
        &self,
        _api_id: &str,
        _resource_id: &str,
        spec: &MethodSpec,
    ) -> Result<()> {
        self.call("create_method")?;
        assert_eq!(spec.http_method, "ANY");
        Ok(())
    }

    async fn create_integration(
        &self,
        _api_id: &str,
        _resource_id: &str,
        spec: &IntegrationSpec,
    ) -> Result<()> {
        self.call("create_integration")?;
        assert!(spec.uri.starts_with(&format!("arn:aws:apigateway:{}:lambda:", REGION)));
        Ok(())
    }

    async fn create_integration_response(
        &self,
        _api_id: &str,
        _resource_id: &str,
        _spec: &IntegrationResponseSpec,
    ) -> Result<()> {
        self.call("create_integration_response")
    }

    async fn create_deployment(&self, _api_id: &str, _stage_name: &str) -> Result<()> {
        self.call("create_deployment")
    }

    async fn delete_api(&self, api_id: &str) -> Result<()> {
        self.call("delete_api")?;
        Self::remove(&self.apis, api_id)
    }
}

/// Confirmation answering every prompt the same way
pub struct ScriptedConfirm {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedConfirm {
    pub fn yes() -> Self {
        Self {
            answer: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn no() -> Self {
        Self {
            answer: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}

/// Project directory with a minimal handler
pub struct TestProject {
    pub root: TempDir,
}

#[allow(dead_code)]
impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("index.js"),
            "exports.handler = async () => ({ statusCode: 200, body: '{}' });",
        )
        .unwrap();
        Self { root }
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn read_config(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.root.path().join("valkconfig.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}
