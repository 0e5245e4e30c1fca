use insights_runtime::{ExtractProgress, ExtractSummary};
use std::io::Write;

use super::{Palette, kilo};

/// Render one extraction event.
///
/// A batch line is opened by `BatchStarted` and closed by whichever event
/// follows, so a batch that succeeds first time stays on one line.
pub fn print_extract_progress(event: &ExtractProgress, palette: Palette, verbose: bool) {
    match event {
        ExtractProgress::BatchStarted {
            index,
            total,
            sessions,
            chars,
        } => {
            print!(
                "  [Batch {}/{}] Processing {} sessions ({}K chars)...",
                index,
                total,
                sessions,
                kilo(*chars)
            );
            let _ = std::io::stdout().flush();
        }
        ExtractProgress::AttemptFailed {
            attempt,
            max_attempts,
            error,
            retry_in,
            ..
        } => {
            println!(" {}", palette.error(&format!("error: {}", error)));
            if let Some(delay) = retry_in {
                print!(
                    "    Retrying in {}s (attempt {}/{})...",
                    delay.as_secs(),
                    attempt + 1,
                    max_attempts
                );
                let _ = std::io::stdout().flush();
            }
        }
        ExtractProgress::CountMismatch {
            got,
            expected,
            accepting_partial,
            retry_in,
            ..
        } => {
            println!(
                " {}",
                palette.warn(&format!("count mismatch: got {}, expected {}", got, expected))
            );
            if let Some(delay) = retry_in {
                print!("    Retrying in {}s...", delay.as_secs());
                let _ = std::io::stdout().flush();
            } else if *accepting_partial {
                print!("    Using {} of {} (partial)...", got, expected);
                let _ = std::io::stdout().flush();
            }
        }
        ExtractProgress::BatchCompleted {
            facets,
            unmatched,
            latency_ms,
            ..
        } => {
            let done = match latency_ms {
                Some(ms) => format!("done ({}s, {} facets)", ms / 1000, facets),
                None => format!("done ({} facets)", facets),
            };
            println!(" {}", palette.ok(&done));
            if verbose && !unmatched.is_empty() {
                println!("    Unmatched session IDs: {}", unmatched.join(", "));
            }
        }
        ExtractProgress::BatchFailed { attempts, .. } => {
            println!(
                "    {}",
                palette.error(&format!("FAILED after {} attempts", attempts))
            );
        }
    }
}

pub fn print_extract_summary(summary: &ExtractSummary, palette: Palette) {
    println!();
    println!(
        "{}",
        palette.heading(&format!(
            "Phase 2 complete: {} facets in {:.0}s",
            summary.facets_written,
            summary.elapsed.as_secs_f64()
        ))
    );
    if summary.batches_failed > 0 {
        println!(
            "  {}",
            palette.warn(&format!(
                "{} of {} batches failed; their sessions will be retried next run",
                summary.batches_failed, summary.batches_total
            ))
        );
    }
    if summary.sessions_unmatched > 0 {
        println!("  {} sessions left without a facet", summary.sessions_unmatched);
    }
}
