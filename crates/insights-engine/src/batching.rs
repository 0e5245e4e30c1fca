use insights_types::{Batch, PendingSession};
use serde::{Deserialize, Serialize};

/// Size constraints for a single inference batch (all sizes in characters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchLimits {
    /// Maximum sessions per batch
    pub max_sessions: usize,
    /// Maximum total transcript characters per batch
    pub max_chars: usize,
    /// A transcript longer than this always travels alone
    pub oversize_chars: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_sessions: 12,
            max_chars: 700_000,
            oversize_chars: 200_000,
        }
    }
}

/// Greedily pack sessions into batches, preserving input order.
///
/// Every batch satisfies `len <= max_sessions` and `char_count <= max_chars`,
/// except a singleton holding one oversized transcript.
pub fn make_batches(sessions: Vec<PendingSession>, limits: &BatchLimits) -> Vec<Batch> {
    let max_sessions = limits.max_sessions.max(1);
    let mut batches = Vec::new();
    let mut current: Vec<PendingSession> = Vec::new();
    let mut current_chars = 0usize;

    for session in sessions {
        let chars = session.char_count();

        if chars > limits.oversize_chars {
            if !current.is_empty() {
                batches.push(Batch::new(std::mem::take(&mut current)));
                current_chars = 0;
            }
            batches.push(Batch::new(vec![session]));
            continue;
        }

        if current.len() >= max_sessions || current_chars + chars > limits.max_chars {
            if !current.is_empty() {
                batches.push(Batch::new(std::mem::take(&mut current)));
            }
            current_chars = 0;
        }

        current_chars += chars;
        current.push(session);
    }

    if !current.is_empty() {
        batches.push(Batch::new(current));
    }

    batches
}
