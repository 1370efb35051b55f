//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { stack } => {
                info!(stack = %stack, "Starting configuration build");
            }
            ProgressEvent::StageStarted { stage } => {
                debug!(stage = %stage, "Starting stage");
            }
            ProgressEvent::StageComplete { stage, duration } => {
                info!(
                    stage = %stage,
                    duration_ms = duration.as_millis(),
                    "Stage complete"
                );
            }
            ProgressEvent::Completed {
                parameters,
                settings_sections,
                total_time,
            } => {
                info!(
                    parameters,
                    settings_sections,
                    total_time_ms = total_time.as_millis(),
                    "Configuration build complete"
                );
            }
            ProgressEvent::Failed { stage, error } => {
                warn!(stage = %stage, error = %error, "Configuration build failed");
            }
            ProgressEvent::DocumentWritten { document, path } => {
                info!(document = %document, path = %path, "Wrote document");
            }
        }
    }
}
