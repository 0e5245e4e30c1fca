// Engine - pure processing logic (batching, facet extraction, aggregation, prompt assembly)
// Sits between the cleaned corpus (providers) and the inference backend (runtime); performs no IO

pub mod analysis;
mod batching;
mod error;
pub mod extract;
pub mod prompt;

pub use analysis::{compute_aggregate_stats, compute_temporal_stats, iso_week_key};
pub use batching::{BatchLimits, make_batches};
pub use error::{ExtractError, Result};
pub use extract::{Reconciled, parse_facet_records, reconcile, strip_code_fence};
pub use prompt::{ReportInput, SESSION_BOUNDARY_PREFIX, build_batch_prompt, compact_facet};
