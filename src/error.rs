//! Build error taxonomy
//!
//! Nothing is retried or swallowed: the first failure aborts the build and is
//! returned as a [`BuildError`]. Mutations applied before the failure are kept,
//! so a builder that returned an error holds an indeterminate partial document.

use crate::provider::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    /// A required identifier is missing or malformed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The provider gateway reported a failure
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The settings template could not be read or parsed
    #[error("Failed to load settings template {path}: {reason}")]
    TemplateLoad { path: PathBuf, reason: String },

    /// A caller-supplied customizer failed; shown exactly as the hook reported it
    #[error(transparent)]
    Customizer(anyhow::Error),

    /// A generated document could not be written
    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A generated document could not be serialized
    #[error("Failed to serialize {document}: {reason}")]
    Serialize {
        document: &'static str,
        reason: String,
    },
}

impl BuildError {
    /// Classifies a customizer failure.
    ///
    /// Errors raised by builder operations called from inside the hook keep
    /// their own variant; anything else is a `Customizer` error.
    pub(crate) fn from_customizer(err: anyhow::Error) -> Self {
        err.downcast::<BuildError>()
            .unwrap_or_else(BuildError::Customizer)
    }

    pub(crate) fn template(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::TemplateLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
