use insights_types::{AggregateStats, Facet};
use std::collections::BTreeMap;

/// Fold a facet collection into corpus-wide and per-project counts.
///
/// Missing classifications land in default buckets (`unclear` outcome,
/// `unknown` helpfulness and session type, `unknown` project).
pub fn compute_aggregate_stats(facets: &[Facet]) -> AggregateStats {
    let mut stats = AggregateStats {
        total_sessions: facets.len(),
        ..Default::default()
    };

    for facet in facets {
        add_counts(&mut stats.goal_categories, &facet.goal_categories);

        let outcome = facet.outcome_or_default();
        *stats.outcomes.entry(outcome.to_string()).or_default() += 1;
        *stats
            .helpfulness
            .entry(facet.helpfulness_or_default().to_string())
            .or_default() += 1;
        *stats
            .session_types
            .entry(facet.session_type_or_default().to_string())
            .or_default() += 1;

        let has_friction = facet.has_friction();
        if has_friction {
            stats.sessions_with_friction += 1;
        }
        add_counts(&mut stats.friction_types, &facet.friction_counts);

        let project = stats
            .projects
            .entry(facet.project_or_default().to_string())
            .or_default();
        project.count += 1;
        *project.outcomes.entry(outcome.to_string()).or_default() += 1;
        add_counts(&mut project.goal_categories, &facet.goal_categories);
        if has_friction {
            project.friction_count += 1;
        }
    }

    stats
}

fn add_counts(into: &mut BTreeMap<String, u64>, from: &BTreeMap<String, u64>) {
    for (name, count) in from {
        *into.entry(name.clone()).or_default() += count;
    }
}
