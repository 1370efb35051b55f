//! Persistence of the generated documents
//!
//! Layout under the output directory:
//!
//! ```text
//! <dir>/parameters/<stage>.yml   one parameters file per stage
//! <dir>/settings.yml             settings shared by all stages
//! ```

use crate::builder::{Parameters, Settings};
use crate::error::BuildError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const PARAMETERS_DIR: &str = "parameters";
const SETTINGS_FILE: &str = "settings.yml";

/// Paths of the files produced by one write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocuments {
    pub parameters: PathBuf,
    pub settings: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConfigWriter {
    directory: PathBuf,
}

impl ConfigWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn parameters_path(&self, stage: &str) -> PathBuf {
        self.directory
            .join(PARAMETERS_DIR)
            .join(format!("{stage}.yml"))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.directory.join(SETTINGS_FILE)
    }

    /// Writes both documents, creating the parameters directory if needed.
    pub fn write(
        &self,
        stage: &str,
        parameters: &Parameters,
        settings: &Settings,
    ) -> Result<WrittenDocuments, BuildError> {
        validate_stage(stage)?;

        let parameters_dir = self.directory.join(PARAMETERS_DIR);
        fs::create_dir_all(&parameters_dir).map_err(|source| BuildError::Persist {
            path: parameters_dir.clone(),
            source,
        })?;

        let written = WrittenDocuments {
            parameters: self.parameters_path(stage),
            settings: self.settings_path(),
        };
        write_yaml(&written.parameters, "parameters", parameters)?;
        write_yaml(&written.settings, "settings", settings)?;

        Ok(written)
    }
}

fn validate_stage(stage: &str) -> Result<(), BuildError> {
    let invalid = stage.trim().is_empty()
        || stage == "."
        || stage == ".."
        || stage.contains(['/', '\\']);
    if invalid {
        return Err(BuildError::Validation(format!(
            "invalid stage name: {stage:?}"
        )));
    }
    Ok(())
}

fn write_yaml<T: Serialize>(
    path: &Path,
    document: &'static str,
    value: &T,
) -> Result<(), BuildError> {
    let content = serde_yaml::to_string(value).map_err(|e| BuildError::Serialize {
        document,
        reason: e.to_string(),
    })?;
    fs::write(path, content).map_err(|source| BuildError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(document, path = %path.display(), "Wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_layout() {
        let dir = TempDir::new().unwrap();
        let writer = ConfigWriter::new(dir.path());
        let parameters: Parameters = [("DbHost", "10.0.0.1")].into_iter().collect();
        let mut settings = Settings::new();
        settings.insert("region", "eu-west-1");

        let written = writer.write("prod", &parameters, &settings).unwrap();

        assert_eq!(written.parameters, dir.path().join("parameters/prod.yml"));
        assert_eq!(written.settings, dir.path().join("settings.yml"));
        assert_eq!(
            fs::read_to_string(&written.parameters).unwrap(),
            "DbHost: 10.0.0.1\n"
        );
        assert_eq!(
            fs::read_to_string(&written.settings).unwrap(),
            "region: eu-west-1\n"
        );
    }

    #[test]
    fn test_existing_parameters_dir_is_reused() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("parameters")).unwrap();
        fs::write(dir.path().join("parameters/dev.yml"), "Old: value\n").unwrap();

        let writer = ConfigWriter::new(dir.path());
        writer
            .write("prod", &Parameters::new(), &Settings::new())
            .unwrap();

        assert!(dir.path().join("parameters/dev.yml").exists());
        assert!(dir.path().join("parameters/prod.yml").exists());
    }

    #[test]
    fn test_invalid_stage_names() {
        let dir = TempDir::new().unwrap();
        let writer = ConfigWriter::new(dir.path());

        for stage in ["", "  ", "..", "a/b", "a\\b"] {
            let result = writer.write(stage, &Parameters::new(), &Settings::new());
            assert!(
                matches!(result, Err(BuildError::Validation(_))),
                "stage {stage:?} should be rejected"
            );
        }
        assert!(!dir.path().join("parameters").exists());
    }

    #[test]
    fn test_unwritable_directory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let writer = ConfigWriter::new(&blocker);
        let err = writer
            .write("prod", &Parameters::new(), &Settings::new())
            .unwrap_err();

        assert!(matches!(err, BuildError::Persist { .. }));
    }
}
