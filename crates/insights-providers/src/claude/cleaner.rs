use crate::Result;
use insights_types::{SegmentTag, Transcript, TranscriptSegment};
use serde_json::Value;
use std::path::Path;

use super::schema::MessageRecord;

/// Record types that never contribute to a transcript
pub const NOISE_TYPES: [&str; 4] = ["progress", "file-history-snapshot", "system", "queue-operation"];

/// Read a Claude Code session log and reduce it to a tagged text transcript.
///
/// Invalid UTF-8 is replaced rather than rejected; unparseable lines are
/// counted in [`Transcript::parse_errors`] and skipped.
pub fn clean_transcript(path: &Path) -> Result<Transcript> {
    let bytes = std::fs::read(path)?;
    Ok(clean_transcript_str(&String::from_utf8_lossy(&bytes)))
}

/// Clean an in-memory JSONL session log (see [`clean_transcript`])
pub fn clean_transcript_str(text: &str) -> Transcript {
    let mut segments = Vec::new();
    let mut start: Option<String> = None;
    let mut end: Option<String> = None;
    let mut errors = 0usize;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let entry = match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Value::Object(map),
            _ => {
                errors += 1;
                continue;
            }
        };

        let kind = entry.get("type").and_then(Value::as_str).unwrap_or("");
        if NOISE_TYPES.contains(&kind) {
            continue;
        }

        if let Some(ts) = entry.get("timestamp").and_then(Value::as_str) {
            if !ts.is_empty() {
                if start.as_deref().is_none_or(|s| ts < s) {
                    start = Some(ts.to_string());
                }
                if end.as_deref().is_none_or(|e| ts > e) {
                    end = Some(ts.to_string());
                }
            }
        }

        match kind {
            "summary" => {
                if let Some(summary) = entry.get("summary").and_then(Value::as_str) {
                    if !summary.is_empty() {
                        segments.push(TranscriptSegment::new(SegmentTag::Summary, summary));
                    }
                }
            }
            "user" | "assistant" => {
                let role_fallback = kind.to_string();
                let Ok(record) = serde_json::from_value::<MessageRecord>(entry) else {
                    tracing::debug!(kind = %role_fallback, "skipping record with unexpected message shape");
                    continue;
                };
                let Some(message) = record.message else {
                    continue;
                };
                let role = message.role.as_deref().unwrap_or(&role_fallback);

                for text in message.content.texts() {
                    let text = text.trim();
                    if !text.is_empty() {
                        segments.push(TranscriptSegment::new(SegmentTag::role(role), text));
                    }
                }
            }
            _ => {}
        }
    }

    if errors > 0 && segments.is_empty() {
        tracing::debug!(errors, "session log has no parseable text records");
    }

    // A wholly corrupt log comes back with no segments; callers drop it as empty
    Transcript {
        segments,
        start_timestamp: start,
        end_timestamp: end,
        parse_errors: errors,
    }
}
