//! Cloud provider access
//!
//! The builders never talk to AWS directly. They go through a
//! [`ProviderGateway`], which exposes the three introspection calls the
//! configuration pipeline needs:
//!
//! - describe a CloudFormation stack and read its outputs
//! - list DynamoDB table names
//! - find the change stream attached to a table
//!
//! [`AwsGateway`] is the production implementation. [`MockGateway`] serves
//! canned responses and is used by tests and offline runs.

pub mod aws;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod types;

pub use aws::AwsGateway;
pub use error::ProviderError;
pub use gateway::ProviderGateway;
pub use mock::MockGateway;
pub use types::{Stack, StackOutput};
