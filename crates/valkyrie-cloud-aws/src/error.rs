//! AWS SDK error classification
//!
//! SDK failures are folded into `CloudError` so that pipelines can tell a
//! missing resource from a denied request without knowing about the SDK.

use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;
use valkyrie_cloud::CloudError;

const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchEntity",
    "ResourceNotFoundException",
    "NotFoundException",
];

const AUTH_CODE_PREFIXES: &[&str] = &[
    "AccessDenied",
    "UnrecognizedClient",
    "InvalidClientTokenId",
    "ExpiredToken",
    "InvalidSignature",
    "SignatureDoesNotMatch",
];

const THROTTLE_CODE_PREFIXES: &[&str] = &["Throttling", "TooManyRequests", "RequestLimitExceeded"];

/// Errors raised while building the AWS clients
#[derive(Error, Debug)]
pub enum AwsError {
    #[error("AWS region is not configured")]
    MissingRegion,
}

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        CloudError::InvalidConfig(err.to_string())
    }
}

/// Convert an SDK error of any AWS service into a `CloudError`
pub(crate) fn classify<E, R>(operation: &str, err: SdkError<E, R>) -> CloudError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let detail = DisplayErrorContext(&err).to_string();

    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            return CloudError::Transport(format!("{}: {}", operation, detail));
        }
        _ => {}
    }

    let code = err.as_service_error().and_then(|e| e.code());
    let message = err
        .as_service_error()
        .and_then(|e| e.message())
        .map(str::to_string)
        .unwrap_or(detail);

    classify_code(operation, code, message)
}

/// Map an AWS error code to the matching `CloudError` variant
pub(crate) fn classify_code(operation: &str, code: Option<&str>, message: String) -> CloudError {
    let Some(code) = code else {
        return CloudError::api(operation, message);
    };

    if NOT_FOUND_CODES.contains(&code) {
        CloudError::NotFound(format!("{}: {}", operation, message))
    } else if AUTH_CODE_PREFIXES.iter().any(|p| code.starts_with(p)) {
        CloudError::AuthorizationFailed(format!("{}: {}", operation, message))
    } else if THROTTLE_CODE_PREFIXES.iter().any(|p| code.starts_with(p)) {
        CloudError::Throttled(format!("{}: {}", operation, message))
    } else {
        CloudError::api(operation, format!("{} ({})", message, code))
    }
}
