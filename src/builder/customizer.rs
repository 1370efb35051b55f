//! Caller-supplied build hooks
//!
//! A customizer receives the builder explicitly and may call any of its
//! operations, including further provider aggregation. Errors are returned
//! as `anyhow::Error` and surface from the build unchanged.

use super::document::Parameters;
use super::parameters::ParameterBuilder;
use super::settings::SettingBuilder;
use async_trait::async_trait;
use tracing::debug;

/// Hook run after the stack outputs have been aggregated
#[async_trait]
pub trait ParametersCustomizer: Send + Sync {
    async fn customize(
        &self,
        builder: &mut ParameterBuilder,
        stack_name: &str,
    ) -> anyhow::Result<()>;
}

/// Hook run after the settings template has been loaded
#[async_trait]
pub trait SettingsCustomizer: Send + Sync {
    async fn customize(
        &self,
        builder: &mut SettingBuilder,
        parameters: &Parameters,
    ) -> anyhow::Result<()>;
}

/// Parameters customizer that records the stream ARN of every matching table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamDiscovery {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub table_set_key: Option<String>,
}

impl StreamDiscovery {
    /// Whether any filter or key was configured.
    pub fn is_configured(&self) -> bool {
        self.prefix.is_some() || self.suffix.is_some() || self.table_set_key.is_some()
    }
}

#[async_trait]
impl ParametersCustomizer for StreamDiscovery {
    async fn customize(
        &self,
        builder: &mut ParameterBuilder,
        stack_name: &str,
    ) -> anyhow::Result<()> {
        let keys = builder
            .list_streams_for_tables(
                self.prefix.as_deref(),
                self.suffix.as_deref(),
                self.table_set_key.as_deref(),
            )
            .await?;
        debug!(stack = stack_name, streams = keys.len(), "Stream discovery complete");
        Ok(())
    }
}
