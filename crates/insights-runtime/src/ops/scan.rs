use insights_index::FacetStore;
use insights_providers::{DiscoveryOptions, clean_transcript, discover_sessions};
use insights_types::{PendingSession, SessionDescriptor};
use std::path::Path;

use crate::Result;

/// Corpus sessions split by cache state
#[derive(Debug, Clone, Default)]
pub struct SessionScan {
    /// Every session found, newest first
    pub discovered: Vec<SessionDescriptor>,
    /// Sessions with no fresh facet (all of them when forced), same order
    pub stale: Vec<SessionDescriptor>,
}

impl SessionScan {
    pub fn cached(&self) -> usize {
        self.discovered.len() - self.stale.len()
    }
}

/// Discover the corpus and decide which sessions need inference
pub fn scan_sessions(
    sessions_dir: &Path,
    store: &FacetStore,
    options: &DiscoveryOptions,
    force: bool,
) -> Result<SessionScan> {
    let discovered = discover_sessions(sessions_dir, options)?;
    let stale = store.filter_stale(&discovered, force);
    tracing::info!(
        discovered = discovered.len(),
        stale = stale.len(),
        force,
        "session scan complete"
    );
    Ok(SessionScan { discovered, stale })
}

#[derive(Debug, Clone, Default)]
pub struct TranscriptLoad {
    pub pending: Vec<PendingSession>,
    /// Sessions dropped because their transcript was empty or unreadable
    pub skipped: usize,
}

/// Clean each stale session's log, keeping only non-empty transcripts
pub fn load_pending(sessions: Vec<SessionDescriptor>) -> TranscriptLoad {
    let mut load = TranscriptLoad::default();

    for descriptor in sessions {
        let transcript = match clean_transcript(&descriptor.path) {
            Ok(t) => t,
            Err(err) => {
                tracing::warn!(path = %descriptor.path.display(), error = %err, "cannot read session log");
                load.skipped += 1;
                continue;
            }
        };

        if transcript.parse_errors > 0 {
            tracing::debug!(
                session_id = %descriptor.session_id,
                errors = transcript.parse_errors,
                "session log has unparseable lines"
            );
        }

        if transcript.is_empty() {
            load.skipped += 1;
            continue;
        }

        load.pending.push(PendingSession::new(descriptor, &transcript));
    }

    load
}
