//! Diagnostic rendering of the generated documents
//!
//! Used by `print_config` and the CLI `--print` flag. Rendering has no effect
//! on the documents themselves.

use crate::builder::{Parameters, Settings};
use crate::error::BuildError;
use serde::Serialize;

/// Output format enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML, same shape as the written files
    Yaml,
}

#[derive(Serialize)]
struct ConfigView<'a> {
    parameters: &'a Parameters,
    settings: &'a Settings,
}

/// Renders both documents under `parameters` and `settings` keys.
pub fn render(
    parameters: &Parameters,
    settings: &Settings,
    format: OutputFormat,
) -> Result<String, BuildError> {
    let view = ConfigView {
        parameters,
        settings,
    };

    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&view).map_err(|e| BuildError::Serialize {
                document: "configuration",
                reason: e.to_string(),
            })
        }
        OutputFormat::Yaml => serde_yaml::to_string(&view).map_err(|e| BuildError::Serialize {
            document: "configuration",
            reason: e.to_string(),
        }),
    }
}
