//! Parameter aggregation from live infrastructure

use super::customizer::ParametersCustomizer;
use super::document::{ParameterValue, Parameters};
use crate::config::DEFAULT_STREAM_CONCURRENCY;
use crate::error::BuildError;
use crate::normalize::normalize;
use crate::provider::{ProviderError, ProviderGateway};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Builds the parameter mapping for one stack.
///
/// All operations mutate the builder's own mapping in place. A failed
/// operation leaves whatever it already wrote.
pub struct ParameterBuilder {
    gateway: Arc<dyn ProviderGateway>,
    parameters: Parameters,
    stream_concurrency: usize,
}

impl ParameterBuilder {
    pub fn new(gateway: Arc<dyn ProviderGateway>) -> Self {
        Self {
            gateway,
            parameters: Parameters::new(),
            stream_concurrency: DEFAULT_STREAM_CONCURRENCY,
        }
    }

    /// Caps the number of stream lookups in flight at once (minimum 1).
    pub fn with_stream_concurrency(mut self, limit: usize) -> Self {
        self.stream_concurrency = limit.max(1);
        self
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    pub fn into_parameters(self) -> Parameters {
        self.parameters
    }

    pub fn normalize(&self, name: &str) -> String {
        normalize(name)
    }

    pub fn reset(&mut self) {
        self.parameters.clear();
    }

    /// Aggregates the stack outputs, then runs the customizer if one is given.
    pub async fn build(
        &mut self,
        stack_name: &str,
        customizer: Option<&dyn ParametersCustomizer>,
    ) -> Result<&Parameters, BuildError> {
        self.aggregate_stack_outputs(stack_name, None).await?;

        if let Some(customizer) = customizer {
            debug!(stack = stack_name, "Running parameters customizer");
            customizer
                .customize(self, stack_name)
                .await
                .map_err(BuildError::from_customizer)?;
        }

        info!(
            stack = stack_name,
            parameters = self.parameters.len(),
            "Parameters built"
        );
        Ok(&self.parameters)
    }

    /// Writes every output of `stack_name` under its normalized key.
    ///
    /// With a `root_key` the outputs go into the nested mapping stored under
    /// that key, which is created if absent. Colliding keys are overwritten.
    /// Returns the number of outputs written.
    pub async fn aggregate_stack_outputs(
        &mut self,
        stack_name: &str,
        root_key: Option<&str>,
    ) -> Result<usize, BuildError> {
        if stack_name.trim().is_empty() {
            return Err(BuildError::Validation("stack name missing".to_string()));
        }

        let stack = self.gateway.describe_stack(stack_name).await?;
        let count = stack.outputs.len();

        match non_empty(root_key) {
            Some(root_key) => {
                let target = self.parameters.nested_mut(root_key);
                for output in stack.outputs {
                    target.insert(normalize(&output.key), ParameterValue::Scalar(output.value));
                }
            }
            None => {
                for output in stack.outputs {
                    self.parameters.insert(normalize(&output.key), output.value);
                }
            }
        }

        debug!(
            stack = stack_name,
            root_key = ?root_key,
            outputs = count,
            "Aggregated stack outputs"
        );
        Ok(count)
    }

    /// Collects the values of `names` into a sequence, in input order.
    ///
    /// Keys that are missing or hold an empty value are skipped. When
    /// `delete_source_keys` is true the collected keys are removed from the
    /// mapping. An explicit `false` keeps them. With a `target` the sequence is
    /// also stored under that key.
    pub fn aggregate_parameters_as_array<I, S>(
        &mut self,
        names: I,
        target: Option<&str>,
        delete_source_keys: bool,
    ) -> Vec<ParameterValue>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut collected = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !self.parameters.is_set(name) {
                continue;
            }
            let value = if delete_source_keys {
                self.parameters.remove(name)
            } else {
                self.parameters.get(name).cloned()
            };
            collected.extend(value);
        }

        if let Some(target) = non_empty(target) {
            self.parameters.insert(target, collected.clone());
        }

        debug!(
            collected = collected.len(),
            target = ?target,
            delete_source_keys,
            "Aggregated parameters as array"
        );
        collected
    }

    /// Lists table names, keeping those matching both `prefix` and `suffix`
    /// when given, and optionally stores the list under `table_set_key`.
    pub async fn list_dynamo_tables(
        &mut self,
        prefix: Option<&str>,
        suffix: Option<&str>,
        table_set_key: Option<&str>,
    ) -> Result<Vec<String>, BuildError> {
        let tables: Vec<String> = self
            .gateway
            .list_tables()
            .await?
            .into_iter()
            .filter(|name| prefix.map_or(true, |p| name.starts_with(p)))
            .filter(|name| suffix.map_or(true, |s| name.ends_with(s)))
            .collect();

        if let Some(key) = non_empty(table_set_key) {
            self.parameters.insert(key, tables.clone());
        }

        debug!(
            prefix = ?prefix,
            suffix = ?suffix,
            tables = tables.len(),
            "Listed tables"
        );
        Ok(tables)
    }

    /// Looks up the stream of `table_name` and records its ARN.
    ///
    /// Returns the parameter key (`normalize(table_name + "-streamArn")`), or
    /// `None` without touching the mapping when the table has no stream.
    pub async fn find_stream_for_table(
        &mut self,
        table_name: &str,
    ) -> Result<Option<String>, BuildError> {
        let stream_arn = self.gateway.find_stream(table_name).await?;
        Ok(stream_arn.map(|arn| self.record_stream(table_name, arn)))
    }

    /// Lists matching tables and looks up all their streams concurrently.
    ///
    /// Returns the keys of the tables that have a stream, in table order. The
    /// first failed lookup aborts the remaining ones and fails the whole call;
    /// in that case no stream key is written.
    pub async fn list_streams_for_tables(
        &mut self,
        prefix: Option<&str>,
        suffix: Option<&str>,
        table_set_key: Option<&str>,
    ) -> Result<Vec<String>, BuildError> {
        let tables = self.list_dynamo_tables(prefix, suffix, table_set_key).await?;
        let gateway = Arc::clone(&self.gateway);

        let mut lookups: Vec<(usize, String, Option<String>)> =
            stream::iter(tables.into_iter().enumerate())
                .map(|(index, table)| {
                    let gateway = Arc::clone(&gateway);
                    async move {
                        let arn = gateway.find_stream(&table).await?;
                        Ok::<_, ProviderError>((index, table, arn))
                    }
                })
                .buffer_unordered(self.stream_concurrency)
                .try_collect()
                .await?;
        lookups.sort_by_key(|(index, _, _)| *index);

        let keys: Vec<String> = lookups
            .into_iter()
            .filter_map(|(_, table, arn)| arn.map(|arn| self.record_stream(&table, arn)))
            .collect();

        debug!(streams = keys.len(), "Resolved table streams");
        Ok(keys)
    }

    fn record_stream(&mut self, table_name: &str, stream_arn: String) -> String {
        let key = normalize(&format!("{table_name}-streamArn"));
        self.parameters.insert(key.clone(), stream_arn);
        key
    }
}

/// Empty keys count as not given.
fn non_empty(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockGateway, Stack};
    use std::time::Duration;

    fn builder_with(gateway: MockGateway) -> ParameterBuilder {
        ParameterBuilder::new(Arc::new(gateway))
    }

    fn seeded(pairs: &[(&str, &str)]) -> ParameterBuilder {
        let mut builder = builder_with(MockGateway::new());
        for (key, value) in pairs {
            builder.parameters_mut().insert(*key, *value);
        }
        builder
    }

    #[tokio::test]
    async fn test_stack_outputs_use_normalized_keys() {
        let stack = Stack::new("app")
            .with_output("db.host", "10.0.0.1")
            .with_output("queue url", "https://sqs/q")
            .with_output("BucketName", "b1");
        let mut builder = builder_with(MockGateway::new().with_stack(stack));

        let written = builder.aggregate_stack_outputs("app", None).await.unwrap();

        assert_eq!(written, 3);
        let params = builder.parameters();
        assert_eq!(params.len(), 3);
        assert_eq!(params.get_str("DbHost"), Some("10.0.0.1"));
        assert_eq!(params.get_str("QueueUrl"), Some("https://sqs/q"));
        assert_eq!(params.get_str("BucketName"), Some("b1"));
    }

    #[tokio::test]
    async fn test_stack_outputs_under_root_key() {
        let gateway = MockGateway::new()
            .with_stack(Stack::new("net").with_output("vpc id", "vpc-1"))
            .with_stack(Stack::new("data").with_output("table name", "users"));
        let mut builder = builder_with(gateway);

        builder.aggregate_stack_outputs("net", Some("shared")).await.unwrap();
        builder.aggregate_stack_outputs("data", Some("shared")).await.unwrap();

        let shared = builder.parameters().get("shared").and_then(ParameterValue::as_map).unwrap();
        assert_eq!(shared.get("VpcId"), Some(&ParameterValue::from("vpc-1")));
        assert_eq!(shared.get("TableName"), Some(&ParameterValue::from("users")));
        assert_eq!(builder.parameters().len(), 1);
    }

    #[tokio::test]
    async fn test_output_collision_overwrites() {
        let stack = Stack::new("app")
            .with_output("db host", "first")
            .with_output("db-host", "second");
        let mut builder = builder_with(MockGateway::new().with_stack(stack));

        builder.aggregate_stack_outputs("app", None).await.unwrap();
        assert_eq!(builder.parameters().get_str("DbHost"), Some("second"));
    }

    #[tokio::test]
    async fn test_missing_stack_name_is_validation_error() {
        let gateway = Arc::new(MockGateway::new());
        let mut builder = ParameterBuilder::new(gateway.clone());

        let err = builder.aggregate_stack_outputs("  ", None).await.unwrap_err();
        assert!(matches!(err, BuildError::Validation(_)));
        assert_eq!(gateway.describe_calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_wrapped() {
        let gateway = MockGateway::new()
            .fail_describe_stack(ProviderError::api("DescribeStacks", "access denied"));
        let mut builder = builder_with(gateway);

        let err = builder.aggregate_stack_outputs("app", None).await.unwrap_err();
        assert!(matches!(
            err,
            BuildError::Provider(ProviderError::Api { operation: "DescribeStacks", .. })
        ));
    }

    #[test]
    fn test_array_aggregation_deletes_and_stores() {
        let mut builder = seeded(&[("A", "a"), ("B", "b"), ("C", "c")]);

        let values = builder.aggregate_parameters_as_array(["A", "B"], Some("arr"), true);

        assert_eq!(values, vec![ParameterValue::from("a"), ParameterValue::from("b")]);
        let params = builder.parameters();
        assert!(!params.contains_key("A"));
        assert!(!params.contains_key("B"));
        assert_eq!(params.get_str("C"), Some("c"));
        assert_eq!(params.get("arr"), Some(&ParameterValue::List(values)));
    }

    #[test]
    fn test_array_aggregation_preserves_input_order() {
        let mut builder = seeded(&[("A", "a"), ("B", "b")]);
        let values = builder.aggregate_parameters_as_array(["B", "A"], None, true);
        assert_eq!(values, vec![ParameterValue::from("b"), ParameterValue::from("a")]);
    }

    #[test]
    fn test_array_aggregation_skips_absent_and_empty_keys() {
        let mut builder = seeded(&[("A", "a"), ("Empty", "")]);

        let values = builder.aggregate_parameters_as_array(["Missing", "A", "Empty"], Some("arr"), true);

        assert_eq!(values, vec![ParameterValue::from("a")]);
        assert!(builder.parameters().contains_key("Empty"));
    }

    #[test]
    fn test_array_aggregation_respects_explicit_keep() {
        // Passing false keeps the source keys. The original library coalesced
        // false back to true and always deleted them.
        let mut builder = seeded(&[("A", "a"), ("B", "b")]);

        let values = builder.aggregate_parameters_as_array(["A", "B"], Some("arr"), false);

        assert_eq!(values.len(), 2);
        assert_eq!(builder.parameters().get_str("A"), Some("a"));
        assert_eq!(builder.parameters().get_str("B"), Some("b"));
        assert!(builder.parameters().contains_key("arr"));
    }

    #[test]
    fn test_array_aggregation_without_target_leaves_no_entry() {
        let mut builder = seeded(&[("A", "a")]);
        builder.aggregate_parameters_as_array(["A"], None, true);
        assert!(builder.parameters().is_empty());
    }

    #[tokio::test]
    async fn test_list_tables_prefix_filter() {
        let gateway = MockGateway::new()
            .with_table("prod-users")
            .with_table("dev-users")
            .with_table("prod-orders");
        let mut builder = builder_with(gateway);

        let tables = builder.list_dynamo_tables(Some("prod-"), None, None).await.unwrap();

        assert_eq!(tables, vec!["prod-users", "prod-orders"]);
        assert!(builder.parameters().is_empty());
    }

    #[tokio::test]
    async fn test_list_tables_prefix_and_suffix_combined() {
        let gateway = MockGateway::new()
            .with_table("prod-users")
            .with_table("prod-orders")
            .with_table("dev-orders");
        let mut builder = builder_with(gateway);

        let tables = builder
            .list_dynamo_tables(Some("prod-"), Some("-orders"), Some("OrderTables"))
            .await
            .unwrap();

        assert_eq!(tables, vec!["prod-orders"]);
        assert_eq!(
            builder.parameters().get("OrderTables"),
            Some(&ParameterValue::from(vec!["prod-orders".to_string()]))
        );
    }

    #[tokio::test]
    async fn test_list_tables_unfiltered() {
        let gateway = MockGateway::new().with_table("a").with_table("b");
        let mut builder = builder_with(gateway);
        let tables = builder.list_dynamo_tables(None, None, None).await.unwrap();
        assert_eq!(tables, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_find_stream_records_normalized_key() {
        let gateway = MockGateway::new().with_streamed_table("users table", "arn:aws:stream/1");
        let mut builder = builder_with(gateway);

        let key = builder.find_stream_for_table("users table").await.unwrap();

        assert_eq!(key.as_deref(), Some("UsersTableStreamArn"));
        assert_eq!(
            builder.parameters().get_str("UsersTableStreamArn"),
            Some("arn:aws:stream/1")
        );
    }

    #[tokio::test]
    async fn test_find_stream_without_stream_leaves_mapping() {
        let mut builder = builder_with(MockGateway::new().with_table("plain"));
        builder.parameters_mut().insert("Existing", "x");

        let key = builder.find_stream_for_table("plain").await.unwrap();

        assert!(key.is_none());
        assert_eq!(builder.parameters().len(), 1);
    }

    #[tokio::test]
    async fn test_list_streams_collects_only_streamed_tables() {
        let gateway = MockGateway::new()
            .with_streamed_table("prod-users", "arn:users")
            .with_table("prod-audit")
            .with_streamed_table("prod-orders", "arn:orders")
            .with_streamed_table("dev-orders", "arn:dev");
        let mut builder = builder_with(gateway);

        let keys = builder
            .list_streams_for_tables(Some("prod-"), None, None)
            .await
            .unwrap();

        assert_eq!(keys, vec!["ProdUsersStreamArn", "ProdOrdersStreamArn"]);
        assert_eq!(builder.parameters().len(), 2);
    }

    #[tokio::test]
    async fn test_list_streams_fails_when_any_lookup_fails() {
        let gateway = MockGateway::new()
            .with_streamed_table("a", "arn:a")
            .with_streamed_table("b", "arn:b")
            .fail_stream_lookup("b", ProviderError::api("ListStreams", "throttled"));
        let mut builder = builder_with(gateway);

        let err = builder
            .list_streams_for_tables(None, None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::Provider(ProviderError::Api { .. })));
        assert!(!builder.parameters().contains_key("AStreamArn"));
    }

    #[tokio::test]
    async fn test_list_streams_runs_lookups_concurrently() {
        let mut gateway = MockGateway::new().with_stream_delay(Duration::from_millis(20));
        for i in 0..6 {
            gateway = gateway.with_streamed_table(format!("t{i}"), format!("arn:{i}"));
        }
        let gateway = Arc::new(gateway);
        let mut builder = ParameterBuilder::new(gateway.clone()).with_stream_concurrency(3);

        let keys = builder.list_streams_for_tables(None, None, None).await.unwrap();

        assert_eq!(keys.len(), 6);
        assert_eq!(gateway.stream_calls(), 6);
        assert!(gateway.max_concurrent_stream_lookups() > 1);
        assert!(gateway.max_concurrent_stream_lookups() <= 3);
    }

    #[tokio::test]
    async fn test_build_runs_customizer_after_outputs() {
        struct Collect;

        #[async_trait::async_trait]
        impl ParametersCustomizer for Collect {
            async fn customize(
                &self,
                builder: &mut ParameterBuilder,
                stack_name: &str,
            ) -> anyhow::Result<()> {
                assert_eq!(stack_name, "app");
                assert!(builder.parameters().contains_key("SubnetA"));
                builder.aggregate_parameters_as_array(["SubnetA", "SubnetB"], Some("Subnets"), true);
                Ok(())
            }
        }

        let stack = Stack::new("app")
            .with_output("subnet a", "subnet-1")
            .with_output("subnet b", "subnet-2");
        let mut builder = builder_with(MockGateway::new().with_stack(stack));

        let params = builder.build("app", Some(&Collect)).await.unwrap();

        assert_eq!(params.len(), 1);
        assert_eq!(
            params.get("Subnets"),
            Some(&ParameterValue::from(vec!["subnet-1".to_string(), "subnet-2".to_string()]))
        );
    }

    #[tokio::test]
    async fn test_build_propagates_customizer_error() {
        struct Failing;

        #[async_trait::async_trait]
        impl ParametersCustomizer for Failing {
            async fn customize(
                &self,
                _builder: &mut ParameterBuilder,
                _stack_name: &str,
            ) -> anyhow::Result<()> {
                anyhow::bail!("no subnets configured")
            }
        }

        let mut builder = builder_with(MockGateway::new().with_stack(Stack::new("app")));
        let err = builder.build("app", Some(&Failing)).await.unwrap_err();

        assert!(matches!(err, BuildError::Customizer(_)));
        assert_eq!(err.to_string(), "no subnets configured");
    }

    #[tokio::test]
    async fn test_build_keeps_provider_error_raised_by_customizer() {
        let gateway = MockGateway::new()
            .with_stack(Stack::new("app"))
            .with_streamed_table("app-users", "arn:users")
            .fail_stream_lookup("app-users", ProviderError::api("ListStreams", "denied"));
        let mut builder = builder_with(gateway);
        let discovery = crate::builder::StreamDiscovery {
            prefix: Some("app-".to_string()),
            ..Default::default()
        };

        let err = builder.build("app", Some(&discovery)).await.unwrap_err();

        assert!(matches!(err, BuildError::Provider(ProviderError::Api { .. })));
        assert_eq!(err.to_string(), "Provider error: ListStreams failed: denied");
    }
}
