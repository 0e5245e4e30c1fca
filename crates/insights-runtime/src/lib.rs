pub mod config;
pub mod error;
pub mod inference;
pub mod ops;
pub mod prompts;

pub use config::{BatchLimits, Config, InferenceConfig, RetryConfig};
pub use error::{Error, Result};
pub use inference::{
    CommandBackend, Envelope, InferenceBackend, InferenceError, RetryPolicy, resolve_program,
};
pub use ops::{
    ExtractProgress, ExtractService, ExtractSummary, PreparedReport, ReportArtifact,
    ReportService, SessionScan, TranscriptLoad, load_pending, scan_sessions, update_latest_alias,
};
pub use prompts::Prompts;
