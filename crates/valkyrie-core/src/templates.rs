//! Fixed documents and identifiers of the deployed topology

use serde_json::json;

/// Path part of the catch-all gateway resource
pub const PROXY_PATH_PART: &str = "{proxy+}";
/// Method parameter carrying the matched proxy path
pub const PROXY_METHOD_PARAMETER: &str = "method.request.path.proxy";
/// Integration parameter the proxy path is forwarded to
pub const PROXY_INTEGRATION_PARAMETER: &str = "integration.request.path.proxy";

/// Trust policy letting the compute service assume the execution role
pub fn lambda_trust_policy() -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "lambda.amazonaws.com" },
            "Action": "sts:AssumeRole"
        }]
    })
    .to_string()
}

/// Permissions for the function to write its logs
pub fn log_policy() -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": [
                "logs:CreateLogGroup",
                "logs:CreateLogStream",
                "logs:PutLogEvents"
            ],
            "Resource": "arn:aws:logs:*:*:*"
        }]
    })
    .to_string()
}

/// Gateway integration URI invoking `function_arn`
pub fn lambda_integration_uri(region: &str, function_arn: &str) -> String {
    format!(
        "arn:aws:apigateway:{}:lambda:path/2015-03-31/functions/{}/invocations",
        region, function_arn
    )
}

/// Public URL of a deployed stage
pub fn invoke_url(api_id: &str, region: &str, stage: &str) -> String {
    format!(
        "https://{}.execute-api.{}.amazonaws.com/{}",
        api_id, region, stage
    )
}
