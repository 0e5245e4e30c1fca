use std::path::Path;
use std::process::{Command, Stdio};

#[cfg(target_os = "macos")]
const OPENER: Option<&str> = Some("open");
#[cfg(all(unix, not(target_os = "macos")))]
const OPENER: Option<&str> = Some("xdg-open");
#[cfg(not(unix))]
const OPENER: Option<&str> = None;

/// Hand the report to the platform opener; failures are only logged
pub fn open_report(path: &Path) {
    let Some(opener) = OPENER else {
        return;
    };

    let spawned = Command::new(opener)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    if let Err(err) = spawned {
        tracing::debug!(opener, error = %err, "could not open report");
    }
}
