mod extract;
mod report;
mod scan;

pub use extract::{ExtractProgress, ExtractService, ExtractSummary};
pub use report::{LATEST_REPORT_NAME, PreparedReport, ReportArtifact, ReportService, update_latest_alias};
pub use scan::{SessionScan, TranscriptLoad, load_pending, scan_sessions};
