use super::writer::{ConfigWriter, WrittenDocuments};
use crate::builder::{
    ParameterBuilder, Parameters, ParametersCustomizer, SettingBuilder, Settings,
    SettingsCustomizer,
};
use crate::config::GeneratorConfig;
use crate::error::BuildError;
use crate::normalize::normalize;
use crate::output::{self, OutputFormat};
use crate::progress::{ProgressEvent, ProgressHandler, Stage};
use crate::provider::ProviderGateway;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Lifecycle of one configuration session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing attached yet
    Unconfigured,
    /// Template or customizers attached, or the last build failed
    Configured,
    /// The last build succeeded; documents can be printed and written
    Built,
}

/// Runs the parameters stage, then the settings stage, for one stack.
///
/// The settings stage only starts once the parameters stage has fully
/// completed, so settings customizers always see the final parameters.
pub struct ConfigOrchestrator {
    parameter_builder: ParameterBuilder,
    setting_builder: SettingBuilder,
    template_path: Option<PathBuf>,
    parameters_customizer: Option<Box<dyn ParametersCustomizer>>,
    settings_customizer: Option<Box<dyn SettingsCustomizer>>,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
    verbose: bool,
    state: SessionState,
}

impl ConfigOrchestrator {
    pub fn new(gateway: Arc<dyn ProviderGateway>) -> Self {
        Self {
            parameter_builder: ParameterBuilder::new(gateway),
            setting_builder: SettingBuilder::new(),
            template_path: None,
            parameters_customizer: None,
            settings_customizer: None,
            progress_handler: None,
            verbose: true,
            state: SessionState::Unconfigured,
        }
    }

    pub fn with_config(gateway: Arc<dyn ProviderGateway>, config: &GeneratorConfig) -> Self {
        let mut orchestrator = Self::new(gateway);
        orchestrator.parameter_builder = orchestrator
            .parameter_builder
            .with_stream_concurrency(config.stream_concurrency);
        orchestrator
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    /// Stops dumping the built documents to the debug log.
    pub fn silent(&mut self) -> &mut Self {
        self.verbose = false;
        self
    }

    pub fn add_setting_template(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.template_path = Some(path.into());
        self.mark_configured()
    }

    pub fn add_settings_customizer(
        &mut self,
        customizer: impl SettingsCustomizer + 'static,
    ) -> &mut Self {
        self.settings_customizer = Some(Box::new(customizer));
        self.mark_configured()
    }

    pub fn add_parameters_customizer(
        &mut self,
        customizer: impl ParametersCustomizer + 'static,
    ) -> &mut Self {
        self.parameters_customizer = Some(Box::new(customizer));
        self.mark_configured()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn normalize(&self, name: &str) -> String {
        normalize(name)
    }

    pub fn parameters(&self) -> &Parameters {
        self.parameter_builder.parameters()
    }

    pub fn settings(&self) -> &Settings {
        self.setting_builder.settings()
    }

    /// Builds both documents for `stack_name`.
    ///
    /// Each build starts from empty documents. On failure the session drops
    /// back to `Configured` (or `Unconfigured`) and the partial documents must
    /// not be written.
    pub async fn build(&mut self, stack_name: &str) -> Result<(), BuildError> {
        let start = Instant::now();
        let fallback_state = match self.state {
            SessionState::Unconfigured => SessionState::Unconfigured,
            _ => SessionState::Configured,
        };
        self.state = fallback_state;

        debug!(stack = stack_name, "Building configuration");
        self.notify(ProgressEvent::Started {
            stack: stack_name.to_string(),
        });

        self.parameter_builder.reset();
        self.setting_builder.reset();

        let stage_start = self.begin_stage(Stage::Parameters);
        let result = self
            .parameter_builder
            .build(stack_name, self.parameters_customizer.as_deref())
            .await
            .map(|_| ());
        self.end_stage(Stage::Parameters, stage_start, result)?;

        let stage_start = self.begin_stage(Stage::Settings);
        let result = self
            .setting_builder
            .build(
                self.parameter_builder.parameters(),
                self.template_path.as_deref(),
                self.settings_customizer.as_deref(),
            )
            .await
            .map(|_| ());
        self.end_stage(Stage::Settings, stage_start, result)?;

        self.state = SessionState::Built;
        self.notify(ProgressEvent::Completed {
            parameters: self.parameters().len(),
            settings_sections: self.settings().len(),
            total_time: start.elapsed(),
        });
        info!(
            stack = stack_name,
            parameters = self.parameters().len(),
            settings_sections = self.settings().len(),
            "Configuration built"
        );

        if self.verbose {
            match output::render(self.parameters(), self.settings(), OutputFormat::Json) {
                Ok(rendered) => debug!("Generated configuration:\n{}", rendered),
                Err(e) => warn!(error = %e, "Could not render generated configuration"),
            }
        }

        Ok(())
    }

    /// Renders both documents to `out`.
    pub fn print_config(
        &self,
        out: &mut impl Write,
        format: OutputFormat,
    ) -> Result<(), BuildError> {
        self.ensure_built()?;
        let rendered = output::render(self.parameters(), self.settings(), format)?;
        writeln!(out, "{}", rendered.trim_end()).map_err(|source| BuildError::Persist {
            path: PathBuf::from("<output>"),
            source,
        })
    }

    /// Writes `<directory>/parameters/<stage>.yml` and `<directory>/settings.yml`.
    pub fn write(&self, stage: &str, directory: &Path) -> Result<WrittenDocuments, BuildError> {
        self.ensure_built()?;
        let written =
            ConfigWriter::new(directory).write(stage, self.parameters(), self.settings())?;

        self.notify(ProgressEvent::DocumentWritten {
            document: format!("parameters ({stage})"),
            path: written.parameters.display().to_string(),
        });
        self.notify(ProgressEvent::DocumentWritten {
            document: "settings".to_string(),
            path: written.settings.display().to_string(),
        });
        if self.progress_handler.is_none() {
            info!(
                stage,
                parameters = %written.parameters.display(),
                settings = %written.settings.display(),
                "Wrote configuration"
            );
        }
        Ok(written)
    }

    fn mark_configured(&mut self) -> &mut Self {
        self.state = SessionState::Configured;
        self
    }

    fn ensure_built(&self) -> Result<(), BuildError> {
        if self.state != SessionState::Built {
            return Err(BuildError::Validation(
                "configuration has not been built".to_string(),
            ));
        }
        Ok(())
    }

    fn begin_stage(&self, stage: Stage) -> Instant {
        self.notify(ProgressEvent::StageStarted { stage });
        Instant::now()
    }

    fn end_stage(
        &self,
        stage: Stage,
        started: Instant,
        result: Result<(), BuildError>,
    ) -> Result<(), BuildError> {
        match result {
            Ok(()) => {
                self.notify(ProgressEvent::StageComplete {
                    stage,
                    duration: started.elapsed(),
                });
                Ok(())
            }
            Err(e) => {
                self.notify(ProgressEvent::Failed {
                    stage,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn notify(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }
}
