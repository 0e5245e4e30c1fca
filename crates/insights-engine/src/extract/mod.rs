//! Turning a model response back into per-session facets
//!
//! Parsing is two-tier (whole document, then a brace scan) and
//! reconciliation is by session id only.

mod parse;
mod reconcile;

pub use parse::{FacetRecord, parse_facet_records, strip_code_fence};
pub use reconcile::{Reconciled, reconcile};
