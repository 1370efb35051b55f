//! Settings synthesis from a template and declarative definitions

use super::customizer::SettingsCustomizer;
use super::document::{DynamoTrigger, Parameters, SettingRef, Settings, VpcDefinition};
use crate::error::BuildError;
use crate::normalize::normalize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Prefix of a deploy-time parameter reference
pub const REFERENCE_PREFIX: &str = "ref://";

pub const DEFAULT_BATCH_SIZE: u32 = 75;
pub const DEFAULT_STARTING_POSITION: &str = "TRIM_HORIZON";

const VPCS_SECTION: &str = "vpcs";
const DYNAMODB_SECTION: &str = "dynamodb";

/// Builds the settings document.
#[derive(Debug, Default)]
pub struct SettingBuilder {
    settings: Settings,
}

impl SettingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    pub fn normalize(&self, name: &str) -> String {
        normalize(name)
    }

    pub fn reset(&mut self) {
        self.settings = Settings::new();
    }

    /// Loads the template (replacing the current settings wholesale), then
    /// runs the customizer with the finished parameters.
    pub async fn build(
        &mut self,
        parameters: &Parameters,
        template_path: Option<&Path>,
        customizer: Option<&dyn SettingsCustomizer>,
    ) -> Result<&Settings, BuildError> {
        if let Some(path) = template_path {
            self.settings = Self::load_template(path)?;
        }

        if let Some(customizer) = customizer {
            debug!("Running settings customizer");
            customizer
                .customize(self, parameters)
                .await
                .map_err(BuildError::from_customizer)?;
        }

        info!(sections = self.settings.len(), "Settings built");
        Ok(&self.settings)
    }

    /// Reads a YAML template into a settings document.
    ///
    /// An empty file yields empty settings. Anything other than a mapping at
    /// the root is rejected.
    pub fn load_template(path: &Path) -> Result<Settings, BuildError> {
        let content = fs::read_to_string(path).map_err(|e| BuildError::template(path, e))?;
        let document: Value =
            serde_yaml::from_str(&content).map_err(|e| BuildError::template(path, e))?;

        let settings = match document {
            Value::Null => Settings::new(),
            Value::Mapping(mapping) => Settings::from(mapping),
            _ => {
                return Err(BuildError::template(
                    path,
                    "template root must be a mapping",
                ))
            }
        };

        debug!(
            path = %path.display(),
            sections = settings.len(),
            "Loaded settings template"
        );
        Ok(settings)
    }

    /// Returns `ref://<key>` if `key` is set in `parameters`.
    pub fn reference(parameters: &Parameters, key: &str) -> Option<String> {
        parameters
            .is_set(key)
            .then(|| format!("{REFERENCE_PREFIX}{key}"))
    }

    /// Sets `vpcs.<name>`, replacing any previous definition.
    pub fn define_vpc(
        &mut self,
        name: &str,
        subnets: impl Into<SettingRef>,
        security_groups: impl Into<SettingRef>,
    ) {
        let vpc = VpcDefinition {
            subnet_ids: subnets.into(),
            security_groups: security_groups.into(),
        };
        self.settings.set_section_entry(VPCS_SECTION, name, vpc.into());
        debug!(name, "Defined VPC");
    }

    /// Sets `dynamodb.<name>`, replacing any previous trigger.
    ///
    /// A missing (or zero) batch size falls back to [`DEFAULT_BATCH_SIZE`], a
    /// missing (or empty) starting position to [`DEFAULT_STARTING_POSITION`].
    pub fn define_dynamo_trigger(
        &mut self,
        name: &str,
        lambda_name: &str,
        stream_arn: impl Into<SettingRef>,
        batch_size: Option<u32>,
        starting_position: Option<&str>,
    ) {
        let trigger = DynamoTrigger {
            lambda: lambda_name.to_string(),
            stream: stream_arn.into(),
            batch_size: batch_size
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_BATCH_SIZE),
            starting_position: starting_position
                .filter(|position| !position.is_empty())
                .unwrap_or(DEFAULT_STARTING_POSITION)
                .to_string(),
        };
        self.settings
            .set_section_entry(DYNAMODB_SECTION, name, trigger.into());
        debug!(name, lambda = lambda_name, "Defined DynamoDB trigger");
    }
}
