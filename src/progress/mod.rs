//! Progress reporting for configuration builds

mod handler;
mod logging;

pub use handler::{NoOpHandler, ProgressEvent, ProgressHandler, Stage};
pub use logging::LoggingHandler;
