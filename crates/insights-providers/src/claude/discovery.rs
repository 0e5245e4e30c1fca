use crate::{Error, Result};
use insights_types::{SessionDescriptor, epoch_seconds, now_epoch_seconds};
use std::path::Path;
use walkdir::WalkDir;

/// Files smaller than this are stubs, not sessions
pub const MIN_SESSION_BYTES: u64 = 100;

/// Directory holding sub-agent invocations; never a top-level session
pub const SUBAGENTS_DIR: &str = "subagents";

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Filters applied while scanning the corpus
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Substring that the project directory name must contain
    pub project_filter: Option<String>,
    /// Only sessions modified within the last N days
    pub since_days: Option<u64>,
    /// Keep at most this many sessions (newest first); `0` means no cap
    pub limit: Option<usize>,
}

/// Enumerate top-level session logs under a Claude Code projects directory.
///
/// Layout: `<root>/<project>/<session_id>.jsonl`. Only files directly inside
/// a project directory are sessions; anything deeper (notably
/// `<session>/subagents/*.jsonl`) is ignored.
///
/// Returns descriptors sorted by modification time, newest first.
pub fn discover_sessions(root: &Path, options: &DiscoveryOptions) -> Result<Vec<SessionDescriptor>> {
    if !root.exists() {
        return Err(Error::CorpusNotFound(root.to_path_buf()));
    }

    let cutoff = options
        .since_days
        .map(|days| now_epoch_seconds() - days as f64 * SECONDS_PER_DAY);

    let mut sessions = Vec::new();

    for project_entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let project_entry = project_entry?;
        if !project_entry.file_type().is_dir() {
            continue;
        }

        let project_name = project_entry.file_name().to_string_lossy().to_string();
        if let Some(filter) = &options.project_filter {
            if !project_name.contains(filter.as_str()) {
                continue;
            }
        }

        for entry in WalkDir::new(project_entry.path())
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "jsonl") {
                continue;
            }

            if is_subagent_log(path, project_entry.path()) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "cannot stat session log");
                    continue;
                }
            };

            let size = metadata.len();
            if size < MIN_SESSION_BYTES {
                continue;
            }

            let mtime = match metadata.modified() {
                Ok(t) => epoch_seconds(t),
                Err(_) => continue,
            };

            if cutoff.is_some_and(|c| mtime < c) {
                continue;
            }

            let Some(session_id) = path.file_stem().map(|s| s.to_string_lossy().to_string())
            else {
                continue;
            };

            sessions.push(SessionDescriptor {
                session_id,
                project: project_name.clone(),
                path: path.to_path_buf(),
                mtime,
                size,
            });
        }
    }

    sessions.sort_by(|a, b| b.mtime.total_cmp(&a.mtime));

    if let Some(limit) = options.limit.filter(|n| *n > 0) {
        sessions.truncate(limit);
    }

    Ok(sessions)
}

fn is_subagent_log(path: &Path, project_dir: &Path) -> bool {
    path.strip_prefix(project_dir)
        .map(|rel| rel.components().any(|c| c.as_os_str() == SUBAGENTS_DIR))
        .unwrap_or(false)
}
