use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Maximum characters kept per transcript line before truncation
pub const SEGMENT_CHAR_LIMIT: usize = 20_000;

/// Marker appended to a line that was cut at [`SEGMENT_CHAR_LIMIT`]
pub const TRUNCATION_MARKER: &str = "\n[...truncated...]";

/// One session log discovered in the corpus.
///
/// Recomputed on every scan; never persisted. `mtime` is the freshness
/// fingerprint compared against a cached facet's `_source_mtime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    pub session_id: String,
    pub project: String,
    pub path: PathBuf,
    /// Seconds since the Unix epoch (fractional)
    pub mtime: f64,
    pub size: u64,
}

/// Speaker tag of a transcript line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentTag {
    Summary,
    /// Uppercased role name (`USER`, `ASSISTANT`, ...)
    Role(String),
}

impl SegmentTag {
    pub fn role(role: &str) -> Self {
        SegmentTag::Role(role.to_uppercase())
    }
}

impl fmt::Display for SegmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentTag::Summary => write!(f, "SUMMARY"),
            SegmentTag::Role(role) => write!(f, "{}", role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSegment {
    pub tag: SegmentTag,
    pub text: String,
}

impl TranscriptSegment {
    /// Build a segment, capping the text at [`SEGMENT_CHAR_LIMIT`] characters.
    pub fn new(tag: SegmentTag, text: &str) -> Self {
        let text = if text.chars().count() > SEGMENT_CHAR_LIMIT {
            let mut cut: String = text.chars().take(SEGMENT_CHAR_LIMIT).collect();
            cut.push_str(TRUNCATION_MARKER);
            cut
        } else {
            text.to_string()
        };
        Self { tag, text }
    }

    pub fn is_truncated(&self) -> bool {
        self.text.ends_with(TRUNCATION_MARKER)
    }
}

impl fmt::Display for TranscriptSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag, self.text)
    }
}

/// Cleaned text view of one session log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
    /// Lines that failed to parse as JSON
    pub parse_errors: usize,
}

impl Transcript {
    /// Newline-joined tagged lines
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }
}

/// A stale session whose transcript has been extracted and is waiting for a batch
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSession {
    pub descriptor: SessionDescriptor,
    pub transcript: String,
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
    char_count: usize,
}

impl PendingSession {
    pub fn new(descriptor: SessionDescriptor, transcript: &Transcript) -> Self {
        Self::from_text(
            descriptor,
            transcript.text(),
            transcript.start_timestamp.clone(),
            transcript.end_timestamp.clone(),
        )
    }

    pub fn from_text(
        descriptor: SessionDescriptor,
        transcript: String,
        start_timestamp: Option<String>,
        end_timestamp: Option<String>,
    ) -> Self {
        let char_count = transcript.chars().count();
        Self {
            descriptor,
            transcript,
            start_timestamp,
            end_timestamp,
            char_count,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.descriptor.session_id
    }

    /// Transcript length in characters (the unit of the batch budget)
    pub fn char_count(&self) -> usize {
        self.char_count
    }
}

/// Sessions submitted together in one inference call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub items: Vec<PendingSession>,
}

impl Batch {
    pub fn new(items: Vec<PendingSession>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.items.iter().map(|i| i.char_count()).sum()
    }

    pub fn session_ids(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.session_id()).collect()
    }

    pub fn get(&self, session_id: &str) -> Option<&PendingSession> {
        self.items.iter().find(|i| i.session_id() == session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str) -> SessionDescriptor {
        SessionDescriptor {
            session_id: id.to_string(),
            project: "-Users-me-code-demo".to_string(),
            path: PathBuf::from(format!("/tmp/{}.jsonl", id)),
            mtime: 1_700_000_000.5,
            size: 512,
        }
    }

    #[test]
    fn test_segment_truncates_long_text() {
        let long = "x".repeat(SEGMENT_CHAR_LIMIT + 10);
        let segment = TranscriptSegment::new(SegmentTag::role("user"), &long);

        assert!(segment.is_truncated());
        assert_eq!(
            segment.text.chars().count(),
            SEGMENT_CHAR_LIMIT + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_segment_at_limit_is_kept() {
        let exact = "y".repeat(SEGMENT_CHAR_LIMIT);
        let segment = TranscriptSegment::new(SegmentTag::Summary, &exact);
        assert!(!segment.is_truncated());
        assert_eq!(segment.text, exact);
    }

    #[test]
    fn test_transcript_text_joins_tagged_lines() {
        let transcript = Transcript {
            segments: vec![
                TranscriptSegment::new(SegmentTag::Summary, "Fix login"),
                TranscriptSegment::new(SegmentTag::role("user"), "hello"),
                TranscriptSegment::new(SegmentTag::role("assistant"), "hi"),
            ],
            ..Default::default()
        };

        assert_eq!(
            transcript.text(),
            "[SUMMARY] Fix login\n[USER] hello\n[ASSISTANT] hi"
        );
    }

    #[test]
    fn test_pending_session_counts_chars_not_bytes() {
        let pending =
            PendingSession::from_text(descriptor("a"), "héllo".to_string(), None, None);
        assert_eq!(pending.char_count(), 5);
    }

    #[test]
    fn test_batch_lookup_and_totals() {
        let batch = Batch::new(vec![
            PendingSession::from_text(descriptor("a"), "abc".to_string(), None, None),
            PendingSession::from_text(descriptor("b"), "de".to_string(), None, None),
        ]);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.char_count(), 5);
        assert_eq!(batch.session_ids(), vec!["a", "b"]);
        assert!(batch.get("b").is_some());
        assert!(batch.get("c").is_none());
    }
}
