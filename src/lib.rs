//! gordon-config - deployment configuration from live AWS stack state
//!
//! This library reads the outputs of a deployed CloudFormation stack and the
//! DynamoDB tables of an account, and turns them into two documents consumed
//! by a serverless deployment:
//!
//! - a flat **parameters** document for one deployment stage, keyed by
//!   normalized identifiers (`db.host` becomes `DbHost`)
//! - a nested **settings** document, seeded from an optional YAML template and
//!   extended with Lambda VPC and DynamoDB stream trigger definitions
//!
//! # Core Concepts
//!
//! - **Provider gateway**: the only boundary to AWS. [`AwsGateway`] talks to
//!   the SDK, [`MockGateway`] serves canned data in tests
//! - **Builders**: [`ParameterBuilder`] and [`SettingBuilder`] own one
//!   document each and expose the operations customizers call
//! - **Customizers**: caller hooks run after each stage's built-in work
//! - **Orchestrator**: [`ConfigOrchestrator`] runs the two stages in order and
//!   writes the results
//!
//! # Example Usage
//!
//! ```no_run
//! use gordon_config::{ConfigOrchestrator, GeneratorConfig, StreamDiscovery};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeneratorConfig::default();
//! let gateway = Arc::new(config.create_gateway().await);
//!
//! let mut orchestrator = ConfigOrchestrator::with_config(gateway, &config);
//! orchestrator
//!     .add_setting_template("settings.tpl.yml")
//!     .add_parameters_customizer(StreamDiscovery {
//!         prefix: Some("app-prod-".to_string()),
//!         ..StreamDiscovery::default()
//!     });
//!
//! orchestrator.build("app-prod").await?;
//! orchestrator.write("prod", Path::new("config"))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`provider`]: gateway trait, AWS and mock implementations
//! - [`builder`]: parameter and setting builders, document types, customizers
//! - [`pipeline`]: orchestration and persistence
//! - [`progress`]: build progress events
//! - [`cli`]: command-line interface

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod provider;
pub mod util;

pub use builder::{
    DynamoTrigger, ParameterBuilder, ParameterValue, Parameters, ParametersCustomizer,
    SettingBuilder, SettingRef, Settings, SettingsCustomizer, StreamDiscovery, VpcDefinition,
};
pub use config::{ConfigError, GeneratorConfig};
pub use error::BuildError;
pub use normalize::normalize;
pub use output::OutputFormat;
pub use pipeline::{ConfigOrchestrator, ConfigWriter, SessionState, WrittenDocuments};
pub use progress::{LoggingHandler, NoOpHandler, ProgressEvent, ProgressHandler};
pub use provider::{AwsGateway, MockGateway, ProviderError, ProviderGateway, Stack, StackOutput};
pub use util::{init_default, init_from_env, init_logging, LogFormat, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
