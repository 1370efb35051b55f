use super::error::ProviderError;
use super::types::Stack;
use async_trait::async_trait;

/// Asynchronous infrastructure introspection used by the builders.
///
/// Implementations own their provider configuration (region, credentials).
/// Timeouts, if any, are theirs to enforce.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Describes a stack by name.
    async fn describe_stack(&self, stack_name: &str) -> Result<Stack, ProviderError>;

    /// Lists every table name visible to the gateway.
    async fn list_tables(&self) -> Result<Vec<String>, ProviderError>;

    /// Returns the ARN of the first stream attached to `table_name`, if any.
    async fn find_stream(&self, table_name: &str) -> Result<Option<String>, ProviderError>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyGateway;

    #[async_trait]
    impl ProviderGateway for EmptyGateway {
        async fn describe_stack(&self, stack_name: &str) -> Result<Stack, ProviderError> {
            Err(ProviderError::StackNotFound(stack_name.to_string()))
        }

        async fn list_tables(&self) -> Result<Vec<String>, ProviderError> {
            Ok(Vec::new())
        }

        async fn find_stream(&self, _table_name: &str) -> Result<Option<String>, ProviderError> {
            Ok(None)
        }

        fn name(&self) -> &str {
            "EmptyGateway"
        }
    }

    #[tokio::test]
    async fn test_gateway_trait_object() {
        let gateway: Box<dyn ProviderGateway> = Box::new(EmptyGateway);
        assert_eq!(gateway.name(), "EmptyGateway");
        assert!(gateway.list_tables().await.unwrap().is_empty());
        assert_eq!(gateway.find_stream("t").await.unwrap(), None);
        assert!(matches!(
            gateway.describe_stack("missing").await,
            Err(ProviderError::StackNotFound(name)) if name == "missing"
        ));
    }
}
