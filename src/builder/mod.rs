//! Two-stage configuration builders
//!
//! [`ParameterBuilder`] collects a flat (optionally nested) parameter mapping
//! from live infrastructure. [`SettingBuilder`] then synthesizes the settings
//! document from a template plus declarative definitions that reference those
//! parameters. Both stages accept an optional customizer hook that receives
//! the builder itself and may run further aggregation.

pub mod customizer;
pub mod document;
pub mod parameters;
pub mod settings;

pub use customizer::{ParametersCustomizer, SettingsCustomizer, StreamDiscovery};
pub use document::{DynamoTrigger, ParameterValue, Parameters, SettingRef, Settings, VpcDefinition};
pub use parameters::ParameterBuilder;
pub use settings::{SettingBuilder, DEFAULT_BATCH_SIZE, DEFAULT_STARTING_POSITION, REFERENCE_PREFIX};
