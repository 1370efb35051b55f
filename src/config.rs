//! Runtime configuration for gordon-config
//!
//! Settings are loaded from environment variables with defaults, and can be
//! overridden field by field (the CLI does this for its flags). The
//! configuration is an explicit value handed to the gateway factory; nothing
//! is stored globally, so independent configurations can coexist.
//!
//! # Environment Variables
//!
//! - `GORDON_CONFIG_REGION`: AWS region - falls back to `AWS_REGION`, then the SDK default chain
//! - `GORDON_CONFIG_PROFILE`: AWS shared-config profile - default: SDK default chain
//! - `GORDON_CONFIG_STREAM_CONCURRENCY`: max concurrent stream lookups - default: "8"
//!
//! Logging reads its own variables; see [`crate::util::logging`].
//!
//! # Example
//!
//! ```no_run
//! use gordon_config::GeneratorConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeneratorConfig {
//!     region: Some("eu-west-1".to_string()),
//!     ..GeneratorConfig::default()
//! };
//! config.validate()?;
//!
//! let gateway = config.create_gateway().await;
//! # Ok(())
//! # }
//! ```

use crate::provider::AwsGateway;
use std::env;
use thiserror::Error;

pub const DEFAULT_STREAM_CONCURRENCY: usize = 8;
const MAX_STREAM_CONCURRENCY: usize = 64;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// AWS region override
    pub region: Option<String>,

    /// AWS profile override
    pub profile: Option<String>,

    /// Maximum number of table stream lookups in flight
    pub stream_concurrency: usize,
}

impl Default for GeneratorConfig {
    /// Loads GORDON_CONFIG_* environment variables, falling back to defaults
    fn default() -> Self {
        let region = env::var("GORDON_CONFIG_REGION")
            .or_else(|_| env::var("AWS_REGION"))
            .ok();

        let profile = env::var("GORDON_CONFIG_PROFILE").ok();

        let stream_concurrency = env::var("GORDON_CONFIG_STREAM_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_STREAM_CONCURRENCY);

        Self {
            region,
            profile,
            stream_concurrency,
        }
    }
}

impl GeneratorConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is blank or out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream_concurrency == 0 {
            return Err(ConfigError::ValidationFailed(
                "Stream concurrency must be at least 1".to_string(),
            ));
        }
        if self.stream_concurrency > MAX_STREAM_CONCURRENCY {
            return Err(ConfigError::ValidationFailed(format!(
                "Stream concurrency cannot exceed {}",
                MAX_STREAM_CONCURRENCY
            )));
        }

        if self.region.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "Region must not be blank".to_string(),
            ));
        }
        if self.profile.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "Profile must not be blank".to_string(),
            ));
        }

        Ok(())
    }

    /// Creates an AWS gateway owning an SDK configuration built from this one
    pub async fn create_gateway(&self) -> AwsGateway {
        AwsGateway::connect(self.region.as_deref(), self.profile.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> GeneratorConfig {
        GeneratorConfig {
            region: Some("eu-west-1".to_string()),
            profile: None,
            stream_concurrency: DEFAULT_STREAM_CONCURRENCY,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(base().validate().is_ok());
        assert!(GeneratorConfig { region: None, ..base() }.validate().is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        let zero = GeneratorConfig { stream_concurrency: 0, ..base() };
        assert!(zero.validate().is_err());

        let too_many = GeneratorConfig { stream_concurrency: 65, ..base() };
        assert!(too_many.validate().is_err());

        let max = GeneratorConfig { stream_concurrency: 64, ..base() };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn test_blank_region_and_profile_rejected() {
        let region = GeneratorConfig { region: Some("  ".to_string()), ..base() };
        assert!(region.validate().is_err());

        let profile = GeneratorConfig { profile: Some(String::new()), ..base() };
        assert!(profile.validate().is_err());
    }
}
