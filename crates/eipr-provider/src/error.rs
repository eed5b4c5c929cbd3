//! Provider error types.
//!
//! Error definitions with transient/permanent classification. The engine
//! never retries within a run — the classification exists so operators can
//! tell from the run report which failures the next scheduled run is
//! likely to clear on its own.

use thiserror::Error;

use crate::ids::{AddressId, TargetId};

/// Error that can occur during a provider operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    // Availability errors (transient)
    /// The provider throttled the request.
    #[error("request throttled: {message}")]
    Throttled { message: String },

    /// The call did not complete within the allotted time.
    #[error("provider call timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The provider API is temporarily unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// Network error during communication.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Access errors (permanent)
    /// The credentials do not permit the operation.
    #[error("authorization denied for {operation}")]
    AuthorizationDenied { operation: String },

    // Resource errors (permanent)
    /// The address no longer exists (released between read and mutate).
    #[error("address not found: {address_id}")]
    AddressNotFound { address_id: AddressId },

    /// The target no longer exists (terminated between read and mutate).
    #[error("target not found: {target_id}")]
    TargetNotFound { target_id: TargetId },

    /// The address is already associated elsewhere — a race with another
    /// actor between inventory read and the associate call.
    #[error("address {address_id} is already associated with {current_target}")]
    AlreadyAssociated {
        address_id: AddressId,
        current_target: TargetId,
    },

    /// The target does not support the requested attribute.
    #[error("attribute not supported by {target_id}: {attribute}")]
    AttributeNotSupported {
        target_id: TargetId,
        attribute: String,
    },

    /// The request was malformed or rejected by provider-side validation.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    // Internal errors
    /// Internal provider adapter error.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ProviderError {
    /// Check if this error is transient — caused by a temporary condition
    /// the next scheduled run may not see.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Throttled { .. }
                | ProviderError::Timeout { .. }
                | ProviderError::Unavailable { .. }
                | ProviderError::Network { .. }
        )
    }

    /// Check if this error is permanent — it will recur until someone
    /// changes tags, permissions, or resources.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification in reports and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            ProviderError::Throttled { .. } => "THROTTLED",
            ProviderError::Timeout { .. } => "TIMEOUT",
            ProviderError::Unavailable { .. } => "UNAVAILABLE",
            ProviderError::Network { .. } => "NETWORK_ERROR",
            ProviderError::AuthorizationDenied { .. } => "AUTHORIZATION_DENIED",
            ProviderError::AddressNotFound { .. } => "ADDRESS_NOT_FOUND",
            ProviderError::TargetNotFound { .. } => "TARGET_NOT_FOUND",
            ProviderError::AlreadyAssociated { .. } => "ALREADY_ASSOCIATED",
            ProviderError::AttributeNotSupported { .. } => "ATTRIBUTE_NOT_SUPPORTED",
            ProviderError::InvalidRequest { .. } => "INVALID_REQUEST",
            ProviderError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    // Convenience constructors

    /// Create a throttled error.
    pub fn throttled(message: impl Into<String>) -> Self {
        ProviderError::Throttled {
            message: message.into(),
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        ProviderError::Unavailable {
            message: message.into(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        ProviderError::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProviderError::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ProviderError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ProviderError::Internal {
            message: message.into(),
            source: None,
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let transient = vec![
            ProviderError::throttled("slow down"),
            ProviderError::Timeout { timeout_secs: 30 },
            ProviderError::unavailable("maintenance"),
            ProviderError::network("connection reset"),
        ];

        for err in transient {
            assert!(
                err.is_transient(),
                "Expected {} to be transient",
                err.error_code()
            );
            assert!(!err.is_permanent());
        }
    }

    #[test]
    fn test_permanent_errors() {
        let permanent = vec![
            ProviderError::AuthorizationDenied {
                operation: "associate-address".to_string(),
            },
            ProviderError::AddressNotFound {
                address_id: AddressId::new("eipalloc-gone"),
            },
            ProviderError::AlreadyAssociated {
                address_id: AddressId::new("eipalloc-1"),
                current_target: TargetId::new("i-other"),
            },
            ProviderError::invalid_request("bad filter"),
        ];

        for err in permanent {
            assert!(
                err.is_permanent(),
                "Expected {} to be permanent",
                err.error_code()
            );
            assert!(!err.is_transient());
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ProviderError::Timeout { timeout_secs: 5 }.error_code(),
            "TIMEOUT"
        );
        assert_eq!(
            ProviderError::throttled("x").error_code(),
            "THROTTLED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::AlreadyAssociated {
            address_id: AddressId::new("eipalloc-1"),
            current_target: TargetId::new("i-9"),
        };
        assert_eq!(
            err.to_string(),
            "address eipalloc-1 is already associated with i-9"
        );

        let err = ProviderError::Timeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "provider call timed out after 30 seconds");
    }

    #[test]
    fn test_error_with_source() {
        let source = std::io::Error::other("socket closed");
        let err = ProviderError::network_with_source("read failed", source);

        assert!(err.is_transient());
        if let ProviderError::Network { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("Expected Network variant");
        }
    }
}
