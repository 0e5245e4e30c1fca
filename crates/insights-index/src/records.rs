/// Filters for [`crate::FacetStore::load_all`]
#[derive(Debug, Clone, Default)]
pub struct FacetFilter {
    /// Substring that the facet's `project` must contain
    pub project: Option<String>,
    /// Only facets whose `start_timestamp` falls within the last N days.
    /// Facets without a parseable timestamp are kept.
    pub since_days: Option<u64>,
}

impl FacetFilter {
    pub fn project(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            since_days: None,
        }
    }
}

/// One row of the project listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    /// Demangled, human readable name (`papers/sandbagging`)
    pub name: String,
    /// Directory name as stored on the facet (`-Users-me-code-papers-sandbagging`)
    pub encoded: String,
    pub session_count: usize,
}
