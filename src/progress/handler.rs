//! Progress handler trait and events

use std::fmt;
use std::time::Duration;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parameters,
    Settings,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parameters => write!(f, "parameters"),
            Stage::Settings => write!(f, "settings"),
        }
    }
}

/// Events emitted while a configuration is built and written
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Build started for a stack
    Started { stack: String },

    /// A pipeline stage started
    StageStarted { stage: Stage },

    /// A pipeline stage completed
    StageComplete { stage: Stage, duration: Duration },

    /// Build completed successfully
    Completed {
        parameters: usize,
        settings_sections: usize,
        total_time: Duration,
    },

    /// Build failed in the given stage
    Failed { stage: Stage, error: String },

    /// A document was written to disk
    DocumentWritten { document: String, path: String },
}

/// Trait for handling progress events during a build
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
