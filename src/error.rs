use crate::resources::ResourceType;

/// Error types for provisioning operations
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Required credential or endpoint missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network-level failure reaching the platform (DNS, refused, timeout)
    #[error("Transport error calling {path}: {message}")]
    Transport { path: String, message: String },

    /// The platform answered with a non-success status
    #[error("API error calling {path}: status {status}{}", body_suffix(.body))]
    Api {
        path: String,
        status: u16,
        body: Option<String>,
    },

    /// The response body could not be interpreted
    #[error("Malformed response from {path}: {message}")]
    MalformedResponse { path: String, message: String },

    /// Existence could not be checked, so the resource must not be created
    #[error("Could not determine whether {resource_type} '{natural_key}' exists: {source}")]
    AmbiguousState {
        resource_type: ResourceType,
        natural_key: String,
        #[source]
        source: Box<ProvisionError>,
    },

    /// A create call succeeded but returned no usable id
    #[error("Created {resource_type} '{natural_key}' but the response carried no id")]
    MissingRemoteId {
        resource_type: ResourceType,
        natural_key: String,
    },

    /// Design-time violation of the resource plan
    #[error("Invalid resource plan: {0}")]
    InvalidPlan(String),

    /// A placeholder referenced a resource that has not been resolved yet
    #[error("Resource '{spec}' references '{dependency}', which is not resolved")]
    UnresolvedDependency { spec: String, dependency: String },

    /// A resolved handle was asked to take a different remote id
    #[error("{resource_type} '{natural_key}' is already bound to id {current}")]
    HandleRebind {
        resource_type: ResourceType,
        natural_key: String,
        current: u64,
    },
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(text) if !text.trim().is_empty() => format!(": {}", text.trim()),
        _ => String::new(),
    }
}

/// Result type for provisioning operations
pub type ProvisionResult<T> = Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_includes_body() {
        let err = ProvisionError::Api {
            path: "tags/new".to_string(),
            status: 422,
            body: Some("{\"errors\":[\"tag is required\"]}".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("status 422"));
        assert!(text.contains("tag is required"));
    }

    #[test]
    fn test_api_error_without_body() {
        let err = ProvisionError::Api {
            path: "tags/new".to_string(),
            status: 500,
            body: None,
        };
        assert_eq!(err.to_string(), "API error calling tags/new: status 500");
    }

    #[test]
    fn test_ambiguous_state_keeps_source() {
        use std::error::Error;

        let err = ProvisionError::AmbiguousState {
            resource_type: ResourceType::Tag,
            natural_key: "Semente1".to_string(),
            source: Box::new(ProvisionError::Transport {
                path: "tags".to_string(),
                message: "connection refused".to_string(),
            }),
        };
        assert!(err.to_string().contains("Semente1"));
        let source = err.source().unwrap();
        assert!(source.to_string().contains("connection refused"));
    }
}
