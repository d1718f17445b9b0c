//! Logging and failure reporting collaborators.
//!
//! - [`log`] - [`EventLog`] for progress lines, plus parameter dumps
//! - [`sink`] - [`ErrorSink`] for centralized failure reporting

pub mod log;
pub mod sink;

pub use log::{log_params, EventLog, LogLevel, MemoryLog, TracingLog};
pub use sink::{save_report_to, scrub, ErrorSink, FailureReport, FileSink, TracingSink};
