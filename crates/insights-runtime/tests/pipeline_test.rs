use anyhow::Result;
use filetime::{FileTime, set_file_mtime};
use insights_engine::{SESSION_BOUNDARY_PREFIX, compute_aggregate_stats, make_batches};
use insights_index::{FacetFilter, FacetStore};
use insights_providers::DiscoveryOptions;
use insights_runtime::{
    BatchLimits, Envelope, ExtractService, InferenceBackend, InferenceError, RetryPolicy,
    load_pending, scan_sessions,
};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Answers every batch with one facet per session boundary found in the prompt
struct EchoBackend {
    calls: Cell<usize>,
}

impl EchoBackend {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
        }
    }
}

impl InferenceBackend for EchoBackend {
    fn model(&self) -> &str {
        "echo"
    }

    fn invoke(&self, prompt: &str) -> std::result::Result<Envelope, InferenceError> {
        self.calls.set(self.calls.get() + 1);
        let records: Vec<String> = prompt
            .lines()
            .filter_map(|line| line.strip_prefix(SESSION_BOUNDARY_PREFIX))
            .filter_map(|rest| rest.strip_suffix("==="))
            .map(|id| {
                format!(
                    r#"{{"session_id":"{}","outcome":"fully_achieved","goal_categories":{{"bug_fix":1}}}}"#,
                    id
                )
            })
            .collect();
        Ok(Envelope::new(format!("```json\n[{}]\n```", records.join(","))))
    }
}

fn write_session(project_dir: &Path, id: &str) -> Result<()> {
    fs::create_dir_all(project_dir)?;
    let lines = [
        r#"{"type":"user","timestamp":"2024-02-12T09:00:00Z","message":{"role":"user","content":"The login form rejects valid passwords"}}"#,
        r#"{"type":"progress","timestamp":"2024-02-12T09:00:30Z","data":{}}"#,
        r#"{"type":"assistant","timestamp":"2024-02-12T09:01:00Z","message":{"role":"assistant","content":[{"type":"text","text":"The hash comparison trims input; fixing."}]}}"#,
        r#"{"type":"user","timestamp":"2024-02-12T09:05:00Z","message":{"role":"user","content":"Works now, thanks"}}"#,
    ];
    fs::write(project_dir.join(format!("{}.jsonl", id)), lines.join("\n"))?;
    Ok(())
}

fn run_once(corpus: &Path, store: &FacetStore, backend: &EchoBackend) -> Result<usize> {
    let scan = scan_sessions(corpus, store, &DiscoveryOptions::default(), false)?;
    let load = load_pending(scan.stale);
    let batches = make_batches(load.pending, &BatchLimits::default());

    let retry = RetryPolicy::immediate(3);
    let service = ExtractService::new(backend, store, &retry, "PROMPT");
    let summary = service.run(&batches, |_| {})?;
    Ok(summary.facets_written)
}

#[test]
fn test_single_session_end_to_end() -> Result<()> {
    let corpus = TempDir::new()?;
    let output = TempDir::new()?;
    let project = corpus.path().join("X");
    write_session(&project, "sess-1")?;
    set_file_mtime(project.join("sess-1.jsonl"), FileTime::from_unix_time(1_707_728_400, 0))?;

    let store = FacetStore::for_output_dir(output.path());
    let scan = scan_sessions(corpus.path(), &store, &DiscoveryOptions::default(), false)?;
    assert_eq!(scan.stale.len(), 1);

    let load = load_pending(scan.stale);
    assert_eq!(load.skipped, 0);
    assert!(load.pending[0].transcript.starts_with("[USER] The login form"));
    assert_eq!(
        load.pending[0].start_timestamp.as_deref(),
        Some("2024-02-12T09:00:00Z")
    );

    let batches = make_batches(load.pending, &BatchLimits::default());
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);

    let backend = EchoBackend::new();
    let retry = RetryPolicy::immediate(3);
    let summary = ExtractService::new(&backend, &store, &retry, "PROMPT").run(&batches, |_| {})?;
    assert_eq!(summary.facets_written, 1);

    let facet = store.load("sess-1")?.expect("facet persisted");
    assert_eq!(facet.source_mtime, Some(1_707_728_400.0));
    assert_eq!(facet.project.as_deref(), Some("X"));
    assert_eq!(facet.end_timestamp.as_deref(), Some("2024-02-12T09:05:00Z"));

    let stats = compute_aggregate_stats(&store.load_all(&FacetFilter::default())?);
    assert_eq!(stats.total_sessions, 1);
    Ok(())
}

#[test]
fn test_second_run_is_a_full_cache_hit() -> Result<()> {
    let corpus = TempDir::new()?;
    let output = TempDir::new()?;
    let project = corpus.path().join("-Users-me-code-app");
    for (i, id) in ["a", "b", "c"].into_iter().enumerate() {
        write_session(&project, id)?;
        let mtime = FileTime::from_unix_time(1_769_266_173, 685_951_500 + i as u32 * 17_389);
        set_file_mtime(project.join(format!("{}.jsonl", id)), mtime)?;
    }
    let store = FacetStore::for_output_dir(output.path());
    let backend = EchoBackend::new();

    assert_eq!(run_once(corpus.path(), &store, &backend)?, 3);
    assert_eq!(backend.calls.get(), 1);

    assert_eq!(run_once(corpus.path(), &store, &backend)?, 0);
    assert_eq!(backend.calls.get(), 1);
    Ok(())
}

#[test]
fn test_mtime_change_alone_marks_session_stale() -> Result<()> {
    let corpus = TempDir::new()?;
    let output = TempDir::new()?;
    let project = corpus.path().join("-Users-me-code-app");
    write_session(&project, "a")?;
    write_session(&project, "b")?;
    let store = FacetStore::for_output_dir(output.path());
    let backend = EchoBackend::new();
    run_once(corpus.path(), &store, &backend)?;

    set_file_mtime(project.join("b.jsonl"), FileTime::from_unix_time(1_800_000_000, 0))?;

    let scan = scan_sessions(corpus.path(), &store, &DiscoveryOptions::default(), false)?;
    let stale: Vec<_> = scan.stale.iter().map(|s| s.session_id.as_str()).collect();
    assert_eq!(stale, vec!["b"]);
    assert_eq!(scan.cached(), 1);

    let forced = scan_sessions(corpus.path(), &store, &DiscoveryOptions::default(), true)?;
    assert_eq!(forced.stale.len(), 2);
    Ok(())
}

#[test]
fn test_corrupt_log_is_skipped_not_batched() -> Result<()> {
    let corpus = TempDir::new()?;
    let output = TempDir::new()?;
    let project = corpus.path().join("-Users-me-code-app");
    write_session(&project, "good")?;
    fs::write(project.join("bad.jsonl"), "garbage line that is long enough to pass the size floor\n".repeat(3))?;

    let store = FacetStore::for_output_dir(output.path());
    let scan = scan_sessions(corpus.path(), &store, &DiscoveryOptions::default(), false)?;
    assert_eq!(scan.stale.len(), 2);

    let load = load_pending(scan.stale);
    assert_eq!(load.skipped, 1);
    assert_eq!(load.pending.len(), 1);
    assert_eq!(load.pending[0].session_id(), "good");
    Ok(())
}
