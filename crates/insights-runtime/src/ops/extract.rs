use insights_engine::{build_batch_prompt, parse_facet_records, reconcile};
use insights_index::FacetStore;
use insights_types::Batch;
use std::time::{Duration, Instant};

use crate::inference::{InferenceBackend, RetryPolicy};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractProgress {
    BatchStarted {
        index: usize,
        total: usize,
        sessions: usize,
        chars: usize,
    },
    /// An attempt failed; `retry_in` is `None` when no attempts remain
    AttemptFailed {
        index: usize,
        attempt: u32,
        max_attempts: u32,
        error: String,
        retry_in: Option<Duration>,
    },
    /// The model returned a different number of records than the batch holds
    CountMismatch {
        index: usize,
        got: usize,
        expected: usize,
        accepting_partial: bool,
        retry_in: Option<Duration>,
    },
    BatchCompleted {
        index: usize,
        facets: usize,
        unmatched: Vec<String>,
        latency_ms: Option<u64>,
    },
    BatchFailed {
        index: usize,
        attempts: u32,
    },
}

/// What an extraction pass did, returned instead of kept in shared counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractSummary {
    pub batches_total: usize,
    pub batches_failed: usize,
    pub facets_written: usize,
    /// Batch sessions left without a facet; they stay stale for the next run
    pub sessions_unmatched: usize,
    pub records_dropped: usize,
    pub inference_calls: usize,
    pub elapsed: Duration,
}

/// Sends batches through the backend and persists every accepted facet
pub struct ExtractService<'a, B: InferenceBackend> {
    backend: &'a B,
    store: &'a FacetStore,
    retry: &'a RetryPolicy,
    facet_prompt: &'a str,
}

impl<'a, B: InferenceBackend> ExtractService<'a, B> {
    pub fn new(
        backend: &'a B,
        store: &'a FacetStore,
        retry: &'a RetryPolicy,
        facet_prompt: &'a str,
    ) -> Self {
        Self {
            backend,
            store,
            retry,
            facet_prompt,
        }
    }

    /// Process batches strictly in order, one inference call at a time.
    ///
    /// A batch that exhausts its retries is abandoned and the run moves on; its
    /// sessions keep no facet and are picked up again next run. Only a cache
    /// write failure aborts the pass.
    pub fn run<F>(&self, batches: &[Batch], mut on_progress: F) -> Result<ExtractSummary>
    where
        F: FnMut(ExtractProgress),
    {
        let started = Instant::now();
        let mut summary = ExtractSummary {
            batches_total: batches.len(),
            ..Default::default()
        };

        for (i, batch) in batches.iter().enumerate() {
            self.process_batch(i + 1, batches.len(), batch, &mut summary, &mut on_progress)?;
        }

        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    fn process_batch<F>(
        &self,
        index: usize,
        total: usize,
        batch: &Batch,
        summary: &mut ExtractSummary,
        on_progress: &mut F,
    ) -> Result<()>
    where
        F: FnMut(ExtractProgress),
    {
        on_progress(ExtractProgress::BatchStarted {
            index,
            total,
            sessions: batch.len(),
            chars: batch.char_count(),
        });

        let prompt = build_batch_prompt(batch, self.facet_prompt);
        let max_attempts = self.retry.max_attempts();

        for attempt in 1..=max_attempts {
            let last = self.retry.is_last(attempt);
            let retry_in = (!last).then(|| self.retry.delay_after(attempt));

            summary.inference_calls += 1;
            let outcome = self
                .backend
                .invoke(&prompt)
                .map_err(|e| e.to_string())
                .and_then(|envelope| {
                    parse_facet_records(&envelope.response)
                        .map(|records| (envelope, records))
                        .map_err(|e| format!("parse error: {}", e))
                });

            let (envelope, records) = match outcome {
                Ok(parsed) => parsed,
                Err(error) => {
                    tracing::warn!(batch = index, attempt, %error, "batch attempt failed");
                    on_progress(ExtractProgress::AttemptFailed {
                        index,
                        attempt,
                        max_attempts,
                        error,
                        retry_in,
                    });
                    if let Some(delay) = retry_in {
                        std::thread::sleep(delay);
                    }
                    continue;
                }
            };

            if records.len() != batch.len() {
                tracing::warn!(
                    batch = index,
                    got = records.len(),
                    expected = batch.len(),
                    "record count mismatch"
                );
                on_progress(ExtractProgress::CountMismatch {
                    index,
                    got: records.len(),
                    expected: batch.len(),
                    accepting_partial: last,
                    retry_in,
                });
                if let Some(delay) = retry_in {
                    std::thread::sleep(delay);
                    continue;
                }
            }

            let reconciled = reconcile(records, batch);
            for facet in &reconciled.facets {
                self.store.save(facet)?;
            }
            if !reconciled.unmatched.is_empty() {
                tracing::info!(batch = index, unmatched = ?reconciled.unmatched, "sessions without a facet");
            }

            summary.facets_written += reconciled.facets.len();
            summary.sessions_unmatched += reconciled.unmatched.len();
            summary.records_dropped += reconciled.dropped;

            on_progress(ExtractProgress::BatchCompleted {
                index,
                facets: reconciled.facets.len(),
                unmatched: reconciled.unmatched,
                latency_ms: envelope.latency_ms(self.backend.model()),
            });
            return Ok(());
        }

        summary.batches_failed += 1;
        summary.sessions_unmatched += batch.len();
        on_progress(ExtractProgress::BatchFailed {
            index,
            attempts: max_attempts,
        });
        Ok(())
    }
}
