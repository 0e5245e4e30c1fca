// Facet cache
// One JSON file per session under <output>/facets; the source log mtime is the only freshness key

mod error;
mod records;
mod store;

// Public API
pub use error::{Error, Result};
pub use records::{FacetFilter, ProjectSummary};
pub use store::FacetStore;
