//! Configuration pipeline
//!
//! [`ConfigOrchestrator`] runs parameter aggregation, then settings synthesis,
//! strictly in that order, and hands the two documents to [`ConfigWriter`].

pub mod orchestrator;
pub mod writer;

pub use orchestrator::{ConfigOrchestrator, SessionState};
pub use writer::{ConfigWriter, WrittenDocuments};
