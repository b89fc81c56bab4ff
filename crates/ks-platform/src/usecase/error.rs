//! Use Case Errors
//!
//! Categorized error types for use case failures. The category decides the
//! HTTP status; the code is what clients match on.
//!
//! ```ignore
//! use ks_platform::usecase::{UseCaseError, codes};
//! use ks_platform::details;
//!
//! UseCaseError::validation(codes::INVALID_PARAMETER, "name is required");
//!
//! UseCaseError::business_rule_with_details(
//!     codes::MODULE_HAS_INSTANCES,
//!     "Module is in use",
//!     details! { "instanceCount" => 3 },
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::error::PlatformError;

/// Error codes surfaced to API clients.
pub mod codes {
    pub const INVALID_PARAMETER: &str = "INVALID_PARAMETER";
    pub const INVALID_ACTION_NAME: &str = "INVALID_ACTION_NAME";
    pub const DUPLICATE_NAME: &str = "DUPLICATE_NAME";
    pub const ACL_NO_RESOURCE_FOUND: &str = "ACL_NO_RESOURCE_FOUND";
    pub const MODULE_HAS_INSTANCES: &str = "MODULE_HAS_INSTANCES";
    pub const UNSUPPORTED_OPERATION: &str = "UNSUPPORTED_OPERATION";
    pub const FEATURE_DISABLED: &str = "FEATURE_DISABLED";
    pub const CANNOT_PUBLISH_PUBLISHED_PACKAGE: &str = "CANNOT_PUBLISH_PUBLISHED_PACKAGE";
    pub const NOTHING_TO_PUBLISH: &str = "NOTHING_TO_PUBLISH";
    pub const MODULE_NOT_PUBLISHED: &str = "MODULE_NOT_PUBLISHED";
    pub const PUBLISHED_VERSION_READ_ONLY: &str = "PUBLISHED_VERSION_READ_ONLY";
    pub const COMMIT_FAILED: &str = "COMMIT_FAILED";
}

/// Macro for creating error detail maps.
///
/// ```ignore
/// let details = details! {
///     "moduleId" => module_id,
///     "instanceCount" => 2
/// };
/// ```
#[macro_export]
macro_rules! details {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), serde_json::json!($value));
        )+
        map
    }};
}

/// Categorized error types for use case failures.
///
/// - `ValidationError` -> 400 Bad Request
/// - `BusinessRuleViolation` -> 409 Conflict
/// - `NotFoundError` -> 404 Not Found
/// - `ConcurrencyError` -> 409 Conflict
/// - `CommitError` -> 500 Internal Server Error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    /// Input validation failed before any write.
    ValidationError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Entity state forbids the operation (duplicate name, dependents exist).
    BusinessRuleViolation {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Entity not found, or not visible to the caller.
    NotFoundError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    ConcurrencyError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Storage failed; the transaction was rolled back.
    CommitError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },
}

impl UseCaseError {
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn validation_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn business_rule(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn business_rule_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::BusinessRuleViolation {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// The caller cannot see the resource, whether or not it exists.
    pub fn no_resource_found(resource: &str, id: &str) -> Self {
        Self::NotFoundError {
            code: codes::ACL_NO_RESOURCE_FOUND.to_string(),
            message: format!("Unable to find {} {}", resource, id),
            details: crate::details! { "resource" => resource, "id" => id },
        }
    }

    pub fn concurrency(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConcurrencyError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn commit(message: impl Into<String>) -> Self {
        Self::CommitError {
            code: codes::COMMIT_FAILED.to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::ValidationError { code, .. } => code,
            Self::BusinessRuleViolation { code, .. } => code,
            Self::NotFoundError { code, .. } => code,
            Self::ConcurrencyError { code, .. } => code,
            Self::CommitError { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. } => message,
            Self::BusinessRuleViolation { message, .. } => message,
            Self::NotFoundError { message, .. } => message,
            Self::ConcurrencyError { message, .. } => message,
            Self::CommitError { message, .. } => message,
        }
    }

    pub fn details(&self) -> &HashMap<String, serde_json::Value> {
        match self {
            Self::ValidationError { details, .. } => details,
            Self::BusinessRuleViolation { details, .. } => details,
            Self::NotFoundError { details, .. } => details,
            Self::ConcurrencyError { details, .. } => details,
            Self::CommitError { details, .. } => details,
        }
    }

    /// Get the suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::BusinessRuleViolation { .. } => 409,
            Self::NotFoundError { .. } => 404,
            Self::ConcurrencyError { .. } => 409,
            Self::CommitError { .. } => 500,
        }
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}

/// Repository failures inside a use case keep their category where one exists.
impl From<PlatformError> for UseCaseError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::UseCase(inner) => inner,
            PlatformError::NotFound { entity_type, id } => {
                UseCaseError::no_resource_found(&entity_type, &id)
            }
            PlatformError::Validation { message } => {
                UseCaseError::validation(codes::INVALID_PARAMETER, message)
            }
            PlatformError::UnsupportedOperation { operation } => {
                UseCaseError::validation(codes::UNSUPPORTED_OPERATION, operation)
            }
            other => UseCaseError::commit(other.to_string()),
        }
    }
}
