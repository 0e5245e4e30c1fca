use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Corpus-wide rollup of facet fields.
///
/// Always recomputed from the full facet set; never updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_sessions: usize,
    pub goal_categories: BTreeMap<String, u64>,
    pub outcomes: BTreeMap<String, usize>,
    pub helpfulness: BTreeMap<String, usize>,
    pub session_types: BTreeMap<String, usize>,
    pub friction_types: BTreeMap<String, u64>,
    pub sessions_with_friction: usize,
    pub projects: BTreeMap<String, ProjectStats>,
}

/// Per-project slice of [`AggregateStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub count: usize,
    pub outcomes: BTreeMap<String, usize>,
    pub goal_categories: BTreeMap<String, u64>,
    /// Sessions in this project that reported any friction
    pub friction_count: usize,
}

/// One ISO calendar week of activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalBucket {
    /// ISO week key, e.g. `2024-W07`
    pub week: String,
    pub count: usize,
    pub fully_achieved: usize,
    /// Percentage of `fully_achieved` outcomes, rounded half-to-even
    pub success_rate: u32,
    pub active_projects: usize,
}
