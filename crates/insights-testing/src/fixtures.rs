//! Claude Code session logs for integration tests.
//!
//! Logs are laid out the way Claude Code stores them:
//! `<corpus>/<encoded project dir>/<session id>.jsonl`.

use anyhow::Result;
use filetime::{FileTime, set_file_mtime};
use std::fs;
use std::path::{Path, PathBuf};

/// A short user/assistant exchange on `day` (`YYYY-MM-DD`), with noise records mixed in
pub fn conversation(topic: &str, day: &str) -> String {
    [
        format!(
            r#"{{"type":"user","timestamp":"{day}T09:00:00Z","message":{{"role":"user","content":"Help me with {topic}"}}}}"#
        ),
        format!(r#"{{"type":"progress","timestamp":"{day}T09:00:10Z","data":{{"tick":1}}}}"#),
        format!(
            r#"{{"type":"assistant","timestamp":"{day}T09:01:00Z","message":{{"role":"assistant","content":[{{"type":"text","text":"Looking into {topic} now."}},{{"type":"tool_use","name":"Read"}}]}}}}"#
        ),
        format!(
            r#"{{"type":"user","timestamp":"{day}T09:20:00Z","message":{{"role":"user","content":"That worked, thanks"}}}}"#
        ),
    ]
    .join("\n")
}

/// A log that passes the size floor but holds only noise records
pub fn noise_only() -> String {
    [
        r#"{"type":"progress","timestamp":"2024-02-12T09:00:00Z","data":{"tick":1}}"#,
        r#"{"type":"file-history-snapshot","messageId":"m1","snapshot":{"files":[]}}"#,
        r#"{"type":"system","timestamp":"2024-02-12T09:00:01Z","content":"hook ran"}"#,
    ]
    .join("\n")
}

/// Write `<corpus>/<project>/<session_id>.jsonl`
pub fn write_log(corpus: &Path, project: &str, session_id: &str, content: &str) -> Result<PathBuf> {
    let dir = corpus.join(project);
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.jsonl", session_id));
    fs::write(&path, content)?;
    Ok(path)
}

/// Pin a file's modification time to whole epoch seconds
pub fn set_mtime(path: &Path, epoch_seconds: i64) -> Result<()> {
    set_mtime_nanos(path, epoch_seconds, 0)
}

/// Pin a file's modification time with a sub-second part
pub fn set_mtime_nanos(path: &Path, epoch_seconds: i64, nanos: u32) -> Result<()> {
    set_file_mtime(path, FileTime::from_unix_time(epoch_seconds, nanos))?;
    Ok(())
}
