use insights_types::{Batch, truncate_chars};
use std::fmt;

use super::kilo;

const SHORT_ID_CHARS: usize = 12;

/// The dry-run plan: one line per batch, plus one per session when verbose
pub struct PlanView<'a> {
    pub batches: &'a [Batch],
    pub verbose: bool,
}

impl fmt::Display for PlanView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- DRY RUN ---")?;
        for (i, batch) in self.batches.iter().enumerate() {
            writeln!(
                f,
                "  Batch {}: {} sessions, {}K chars",
                i + 1,
                batch.len(),
                kilo(batch.char_count())
            )?;
            if !self.verbose {
                continue;
            }
            for item in &batch.items {
                writeln!(
                    f,
                    "    - {}... ({}K chars, {})",
                    truncate_chars(item.session_id(), SHORT_ID_CHARS),
                    kilo(item.char_count()),
                    item.descriptor.project
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_types::{PendingSession, SessionDescriptor};
    use std::path::PathBuf;

    fn pending(id: &str, project: &str, chars: usize) -> PendingSession {
        let descriptor = SessionDescriptor {
            session_id: id.to_string(),
            project: project.to_string(),
            path: PathBuf::from(format!("/c/{}/{}.jsonl", project, id)),
            mtime: 1_700_000_000.0,
            size: 1_000,
        };
        PendingSession::from_text(descriptor, "x".repeat(chars), None, None)
    }

    fn batches() -> Vec<Batch> {
        vec![
            Batch::new(vec![
                pending("0f6c2a9e-41d7-4b55-9a8e-1c2d3e4f5a6b", "-Users-me-code-app", 4_200),
                pending("7b1d9e00-aaaa-bbbb-cccc-000000000001", "-Users-me-code-app", 950),
            ]),
            Batch::new(vec![pending("short", "-Users-me-writing-blog", 250_000)]),
        ]
    }

    #[test]
    fn test_plan_compact() {
        let batches = batches();
        let view = PlanView {
            batches: &batches,
            verbose: false,
        };
        insta::assert_snapshot!(view.to_string().trim_end(), @r"
        --- DRY RUN ---
          Batch 1: 2 sessions, 5K chars
          Batch 2: 1 sessions, 250K chars
        ");
    }

    #[test]
    fn test_plan_verbose_lists_sessions() {
        let batches = batches();
        let view = PlanView {
            batches: &batches,
            verbose: true,
        };
        insta::assert_snapshot!(view.to_string().trim_end(), @r"
        --- DRY RUN ---
          Batch 1: 2 sessions, 5K chars
            - 0f6c2a9e-41d... (4K chars, -Users-me-code-app)
            - 7b1d9e00-aaa... (0K chars, -Users-me-code-app)
          Batch 2: 1 sessions, 250K chars
            - short... (250K chars, -Users-me-writing-blog)
        ");
    }
}
