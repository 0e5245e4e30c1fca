use insights_types::{Batch, Facet};
use serde_json::Value;
use std::collections::HashSet;

use super::parse::FacetRecord;

/// Result of matching parsed records back to the sessions of a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    /// Accepted facets, enriched and in the order the model returned them
    pub facets: Vec<Facet>,
    /// Batch sessions that no record matched, in batch order
    pub unmatched: Vec<String>,
    /// Records discarded: unknown or missing session id, duplicates
    pub dropped: usize,
}

impl Reconciled {
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Match records to batch sessions by `session_id` and enrich the matches.
///
/// A record is never assigned to a session by position. Each match gets the
/// session's project, time bounds and the source mtime it was produced from;
/// values the model wrote for those fields are overwritten. The first record
/// for a session wins.
pub fn reconcile(records: Vec<FacetRecord>, batch: &Batch) -> Reconciled {
    let mut result = Reconciled::default();
    let mut matched: HashSet<String> = HashSet::new();

    for record in records {
        let Some(session_id) = record.get("session_id").and_then(Value::as_str) else {
            result.dropped += 1;
            continue;
        };
        let session_id = session_id.to_string();

        let Some(pending) = batch.get(&session_id) else {
            tracing::debug!(%session_id, "dropping record for a session not in this batch");
            result.dropped += 1;
            continue;
        };

        if matched.contains(&session_id) {
            tracing::debug!(%session_id, "dropping duplicate record");
            result.dropped += 1;
            continue;
        }

        let mut facet: Facet = match serde_json::from_value(Value::Object(record)) {
            Ok(facet) => facet,
            Err(err) => {
                tracing::warn!(%session_id, error = %err, "record has malformed fields");
                result.dropped += 1;
                continue;
            }
        };

        facet.project = Some(pending.descriptor.project.clone());
        facet.start_timestamp = pending.start_timestamp.clone();
        facet.end_timestamp = pending.end_timestamp.clone();
        facet.source_mtime = Some(pending.descriptor.mtime);

        matched.insert(session_id);
        result.facets.push(facet);
    }

    result.unmatched = batch
        .session_ids()
        .into_iter()
        .filter(|id| !matched.contains(*id))
        .map(str::to_string)
        .collect();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_facet_records;
    use insights_types::{PendingSession, SessionDescriptor};
    use std::path::PathBuf;

    fn batch(ids: &[&str]) -> Batch {
        Batch::new(
            ids.iter()
                .enumerate()
                .map(|(i, id)| {
                    let descriptor = SessionDescriptor {
                        session_id: id.to_string(),
                        project: "-Users-me-code-app".to_string(),
                        path: PathBuf::from(format!("/c/{}.jsonl", id)),
                        mtime: 1_700_000_000.0 + i as f64,
                        size: 200,
                    };
                    PendingSession::from_text(
                        descriptor,
                        "[USER] hi".to_string(),
                        Some("2024-02-12T09:00:00Z".to_string()),
                        Some("2024-02-12T10:00:00Z".to_string()),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_matches_by_id_not_position() {
        let records = parse_facet_records(
            r#"[{"session_id":"b","outcome":"fully_achieved"},{"session_id":"a","outcome":"not_achieved"}]"#,
        )
        .unwrap();
        let result = reconcile(records, &batch(&["a", "b"]));

        assert!(result.is_complete());
        assert_eq!(result.facets[0].session_id, "b");
        assert_eq!(result.facets[0].source_mtime, Some(1_700_000_001.0));
        assert_eq!(result.facets[1].outcome.as_deref(), Some("not_achieved"));
        assert_eq!(result.facets[1].source_mtime, Some(1_700_000_000.0));
    }

    #[test]
    fn test_enrichment_overrides_model_values() {
        let records = parse_facet_records(
            r#"{"session_id":"a","project":"made-up","_source_mtime":1,"start_timestamp":"1999-01-01"}"#,
        )
        .unwrap();
        let facet = reconcile(records, &batch(&["a"])).facets.remove(0);

        assert_eq!(facet.project.as_deref(), Some("-Users-me-code-app"));
        assert_eq!(facet.start_timestamp.as_deref(), Some("2024-02-12T09:00:00Z"));
        assert_eq!(facet.end_timestamp.as_deref(), Some("2024-02-12T10:00:00Z"));
        assert_eq!(facet.source_mtime, Some(1_700_000_000.0));
    }

    #[test]
    fn test_unknown_missing_and_duplicate_ids_are_dropped() {
        let records = parse_facet_records(
            r#"[{"session_id":"a"},{"session_id":"zzz"},{"outcome":"x"},{"session_id":"a","outcome":"second"}]"#,
        )
        .unwrap();
        let result = reconcile(records, &batch(&["a", "b", "c"]));

        assert_eq!(result.facets.len(), 1);
        assert!(result.facets[0].outcome.is_none());
        assert_eq!(result.dropped, 3);
        assert_eq!(result.unmatched, vec!["b", "c"]);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_wrongly_typed_fields_keep_the_record() {
        let records = parse_facet_records(
            r#"[{"session_id":"a","outcome":7,"underlying_goal":false,"goal_categories":"lots"},{"session_id":"b"}]"#,
        )
        .unwrap();
        let result = reconcile(records, &batch(&["a", "b"]));

        assert!(result.is_complete());
        assert_eq!(result.dropped, 0);
        assert_eq!(result.facets[0].session_id, "a");
        assert!(result.facets[0].outcome.is_none());
        assert!(result.facets[0].underlying_goal.is_none());
        assert!(result.facets[0].goal_categories.is_empty());
        assert_eq!(result.facets[0].source_mtime, Some(1_700_000_000.0));
    }
}
