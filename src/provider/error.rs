//! Provider error types

use thiserror::Error;

/// Errors surfaced by a [`ProviderGateway`](super::ProviderGateway)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider answered but knows no stack with this name
    #[error("Stack not found: {0}")]
    StackNotFound(String),

    /// A provider call failed (transport, authorization, throttling, ...)
    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn api(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Api {
            operation,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ProviderError::StackNotFound("prod".to_string()).to_string(),
            "Stack not found: prod"
        );
        assert_eq!(
            ProviderError::api("ListTables", "throttled").to_string(),
            "ListTables failed: throttled"
        );
    }
}
