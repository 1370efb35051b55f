//! AWS implementation of the provider gateway
//!
//! Each gateway owns its own `SdkConfig`, so several gateways with different
//! regions or profiles can coexist in one process.

use super::error::ProviderError;
use super::gateway::ProviderGateway;
use super::types::{Stack, StackOutput};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata};
use tracing::debug;

/// Gateway backed by CloudFormation, DynamoDB and DynamoDB Streams clients
#[derive(Debug, Clone)]
pub struct AwsGateway {
    cloudformation: aws_sdk_cloudformation::Client,
    dynamodb: aws_sdk_dynamodb::Client,
    dynamodb_streams: aws_sdk_dynamodbstreams::Client,
}

impl AwsGateway {
    /// Loads an SDK configuration and builds the clients from it.
    ///
    /// `region` and `profile` override the SDK default provider chains when set.
    pub async fn connect(region: Option<&str>, profile: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }

        let sdk_config = loader.load().await;
        debug!(
            region = ?sdk_config.region().map(|r| r.as_ref().to_string()),
            profile = ?profile,
            "AWS configuration loaded"
        );
        Self::from_sdk_config(&sdk_config)
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self {
            cloudformation: aws_sdk_cloudformation::Client::new(sdk_config),
            dynamodb: aws_sdk_dynamodb::Client::new(sdk_config),
            dynamodb_streams: aws_sdk_dynamodbstreams::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ProviderGateway for AwsGateway {
    async fn describe_stack(&self, stack_name: &str) -> Result<Stack, ProviderError> {
        let response = self
            .cloudformation
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|err| {
                // CloudFormation reports unknown stacks as a ValidationError
                let missing = err
                    .as_service_error()
                    .and_then(|service_err| service_err.message())
                    .is_some_and(|message| message.contains("does not exist"));
                if missing {
                    ProviderError::StackNotFound(stack_name.to_string())
                } else {
                    ProviderError::api("DescribeStacks", DisplayErrorContext(&err).to_string())
                }
            })?;

        let stack = response
            .stacks()
            .first()
            .ok_or_else(|| ProviderError::StackNotFound(stack_name.to_string()))?;

        let outputs = stack
            .outputs()
            .iter()
            .filter_map(|output| match (output.output_key(), output.output_value()) {
                (Some(key), Some(value)) => Some(StackOutput::new(key, value)),
                _ => None,
            })
            .collect();

        Ok(Stack {
            name: stack_name.to_string(),
            outputs,
        })
    }

    async fn list_tables(&self) -> Result<Vec<String>, ProviderError> {
        let mut tables = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .dynamodb
                .list_tables()
                .set_exclusive_start_table_name(cursor.take())
                .send()
                .await
                .map_err(|err| {
                    ProviderError::api(
                        "ListTables",
                        aws_sdk_dynamodb::error::DisplayErrorContext(&err).to_string(),
                    )
                })?;

            tables.extend(page.table_names().iter().cloned());

            match page.last_evaluated_table_name() {
                Some(last) => cursor = Some(last.to_string()),
                None => break,
            }
        }

        debug!(count = tables.len(), "Listed DynamoDB tables");
        Ok(tables)
    }

    async fn find_stream(&self, table_name: &str) -> Result<Option<String>, ProviderError> {
        let response = self
            .dynamodb_streams
            .list_streams()
            .table_name(table_name)
            .limit(1)
            .send()
            .await
            .map_err(|err| {
                ProviderError::api(
                    "ListStreams",
                    aws_sdk_dynamodbstreams::error::DisplayErrorContext(&err).to_string(),
                )
            })?;

        Ok(response
            .streams()
            .first()
            .and_then(|stream| stream.stream_arn())
            .map(str::to_string))
    }

    fn name(&self) -> &str {
        "aws"
    }
}
