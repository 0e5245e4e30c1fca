use chrono::{DateTime, TimeZone};
use insights_types::{Facet, TemporalBucket};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct WeekAccumulator<'a> {
    count: usize,
    fully_achieved: usize,
    projects: BTreeSet<&'a str>,
}

/// ISO year-week key (`2024-W07`) of a timestamp, in its own offset
pub fn iso_week_key<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%G-W%V").to_string()
}

/// Group facets into ISO calendar weeks by `start_timestamp`, oldest week first.
///
/// Facets without a parseable start timestamp are left out.
pub fn compute_temporal_stats(facets: &[Facet]) -> Vec<TemporalBucket> {
    let mut weeks: BTreeMap<String, WeekAccumulator<'_>> = BTreeMap::new();

    for facet in facets {
        let Some(started) = facet.started_at() else {
            continue;
        };

        let week = weeks.entry(iso_week_key(&started)).or_default();
        week.count += 1;
        if facet.is_fully_achieved() {
            week.fully_achieved += 1;
        }
        week.projects.insert(facet.project_or_default());
    }

    weeks
        .into_iter()
        .map(|(week, acc)| TemporalBucket {
            week,
            count: acc.count,
            fully_achieved: acc.fully_achieved,
            success_rate: success_rate(acc.fully_achieved, acc.count),
            active_projects: acc.projects.len(),
        })
        .collect()
}

/// Whole-number percentage, halves rounded to even
fn success_rate(fully_achieved: usize, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    (fully_achieved as f64 / count as f64 * 100.0).round_ties_even() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facet(id: &str, project: &str, start: &str, outcome: &str) -> Facet {
        let mut facet = Facet::new(id);
        facet.project = Some(project.to_string());
        facet.start_timestamp = Some(start.to_string());
        facet.outcome = Some(outcome.to_string());
        facet
    }

    #[test]
    fn test_same_iso_week_shares_a_bucket() {
        // Monday and Sunday of ISO week 2024-W07
        let facets = vec![
            facet("a", "app", "2024-02-12T09:00:00Z", "fully_achieved"),
            facet("b", "lib", "2024-02-18T23:00:00Z", "partially_achieved"),
        ];
        let buckets = compute_temporal_stats(&facets);

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].week, "2024-W07");
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[0].fully_achieved, 1);
        assert_eq!(buckets[0].success_rate, 50);
        assert_eq!(buckets[0].active_projects, 2);
    }

    #[test]
    fn test_unparseable_timestamps_are_excluded() {
        let mut undated = Facet::new("c");
        undated.outcome = Some("fully_achieved".to_string());
        let facets = vec![
            facet("a", "app", "2024-02-12T09:00:00Z", "fully_achieved"),
            facet("b", "app", "not a date", "fully_achieved"),
            undated,
        ];

        let buckets = compute_temporal_stats(&facets);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[0].active_projects, 1);
    }

    #[test]
    fn test_buckets_sorted_and_iso_year_used() {
        let facets = vec![
            facet("a", "app", "2024-03-01T00:00:00Z", "fully_achieved"),
            // ISO week 1 of 2025 starts on 2024-12-30
            facet("b", "app", "2024-12-31T12:00:00Z", "fully_achieved"),
            facet("c", "app", "2024-01-03T12:00:00Z", "fully_achieved"),
        ];
        let weeks: Vec<_> = compute_temporal_stats(&facets)
            .into_iter()
            .map(|b| b.week)
            .collect();

        assert_eq!(weeks, vec!["2024-W01", "2024-W09", "2025-W01"]);
    }

    #[test]
    fn test_success_rate_rounds_half_to_even() {
        assert_eq!(success_rate(1, 3), 33);
        assert_eq!(success_rate(2, 3), 67);
        assert_eq!(success_rate(1, 8), 12);
        assert_eq!(success_rate(3, 8), 38);
        assert_eq!(success_rate(0, 0), 0);
    }
}
