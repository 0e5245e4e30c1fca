use insights_types::{AggregateStats, Batch, Facet, TemporalBucket};
use serde_json::{Map, Value};

/// Marker line opening each transcript in a batch prompt
pub const SESSION_BOUNDARY_PREFIX: &str = "===SESSION_BOUNDARY::";

/// Appended to the report prompt when the facets cover a single project
const PROJECT_NOTE: &str = "\n\nNOTE: These facets are filtered to a single project. \
Tailor the report specifically to this project rather than cross-project comparisons.\n";

/// Facet prompt followed by every transcript of the batch, each behind a boundary marker
pub fn build_batch_prompt(batch: &Batch, facet_prompt: &str) -> String {
    let capacity = facet_prompt.len() + batch.items.iter().map(|i| i.transcript.len() + 64).sum::<usize>();
    let mut prompt = String::with_capacity(capacity);
    prompt.push_str(facet_prompt);
    prompt.push_str("\n\n");

    for item in &batch.items {
        prompt.push_str(SESSION_BOUNDARY_PREFIX);
        prompt.push_str(item.session_id());
        prompt.push_str("===\n");
        prompt.push_str(&item.transcript);
        prompt.push_str("\n\n");
    }

    prompt
}

/// Reduced view of a facet for the report prompt.
///
/// Only a fixed field subset is kept and empty values are omitted.
pub fn compact_facet(facet: &Facet) -> Map<String, Value> {
    let mut out = Map::new();

    let mut text = |key: &str, value: &Option<String>| {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            out.insert(key.to_string(), Value::String(v.to_string()));
        }
    };

    text("session_id", &Some(facet.session_id.clone()));
    text("project", &facet.project);
    text("underlying_goal", &facet.underlying_goal);
    text("outcome", &facet.outcome);
    text("claude_helpfulness", &facet.claude_helpfulness);
    text("session_type", &facet.session_type);
    text("friction_detail", &facet.friction_detail);
    text("primary_success", &facet.primary_success);
    text("improvement_opportunity", &facet.improvement_opportunity);
    text("start_timestamp", &facet.start_timestamp);
    text("end_timestamp", &facet.end_timestamp);

    for (key, counts) in [
        ("goal_categories", &facet.goal_categories),
        ("friction_counts", &facet.friction_counts),
    ] {
        if !counts.is_empty() {
            let map = counts
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(*v)))
                .collect();
            out.insert(key.to_string(), Value::Object(map));
        }
    }

    out
}

/// Everything the report call needs, rendered into one prompt
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub report_prompt: &'a str,
    pub project_filtered: bool,
    pub stats: &'a AggregateStats,
    pub temporal: &'a [TemporalBucket],
    pub facets: &'a [Facet],
}

impl ReportInput<'_> {
    pub fn render(&self) -> serde_json::Result<String> {
        let compact: Vec<Value> = self
            .facets
            .iter()
            .map(|f| Value::Object(compact_facet(f)))
            .collect();

        let mut prompt = self.report_prompt.to_string();
        if self.project_filtered {
            prompt.push_str(PROJECT_NOTE);
        }

        Ok(format!(
            "{prompt}\n\n\
             ## AGGREGATE STATS\n```json\n{stats}\n```\n\n\
             ## TEMPORAL DATA\n```json\n{temporal}\n```\n\n\
             ## ALL FACETS ({count} sessions)\n```json\n{facets}\n```\n",
            prompt = prompt,
            stats = serde_json::to_string_pretty(self.stats)?,
            temporal = serde_json::to_string_pretty(self.temporal)?,
            count = compact.len(),
            facets = serde_json::to_string(&compact)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_types::{PendingSession, SessionDescriptor};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn pending(id: &str, transcript: &str) -> PendingSession {
        let descriptor = SessionDescriptor {
            session_id: id.to_string(),
            project: "app".to_string(),
            path: PathBuf::from(format!("/c/app/{}.jsonl", id)),
            mtime: 0.0,
            size: 100,
        };
        PendingSession::from_text(descriptor, transcript.to_string(), None, None)
    }

    #[test]
    fn test_batch_prompt_layout() {
        let batch = Batch::new(vec![
            pending("s1", "[USER] fix tests\n[ASSISTANT] done"),
            pending("s2", "[SUMMARY] Refactor"),
        ]);
        let prompt = build_batch_prompt(&batch, "Analyze each session.");

        insta::assert_snapshot!(prompt.trim_end(), @r"
Analyze each session.

===SESSION_BOUNDARY::s1===
[USER] fix tests
[ASSISTANT] done

===SESSION_BOUNDARY::s2===
[SUMMARY] Refactor
");
        assert!(prompt.ends_with("[SUMMARY] Refactor\n\n"));
    }

    #[test]
    fn test_compact_facet_drops_empty_fields() {
        let mut facet = Facet::new("s1");
        facet.project = Some("app".to_string());
        facet.outcome = Some("fully_achieved".to_string());
        facet.friction_detail = Some(String::new());
        facet.goal_categories = BTreeMap::from([("bug_fix".to_string(), 2)]);
        facet.source_mtime = Some(12.5);
        facet
            .extra
            .insert("user_satisfaction".to_string(), Value::from("high"));

        let compact = Value::Object(compact_facet(&facet));

        insta::assert_json_snapshot!(compact, @r#"
        {
          "goal_categories": {
            "bug_fix": 2
          },
          "outcome": "fully_achieved",
          "project": "app",
          "session_id": "s1"
        }
        "#);
    }

    #[test]
    fn test_report_input_sections() {
        let facets = vec![Facet::new("s1")];
        let stats = AggregateStats {
            total_sessions: 1,
            ..Default::default()
        };
        let rendered = ReportInput {
            report_prompt: "Write a report.",
            project_filtered: true,
            stats: &stats,
            temporal: &[],
            facets: &facets,
        }
        .render()
        .unwrap();

        assert!(rendered.starts_with("Write a report.\n\nNOTE: These facets are filtered"));
        assert!(rendered.contains("## AGGREGATE STATS\n```json\n{\n  \"total_sessions\": 1,"));
        assert!(rendered.contains("## TEMPORAL DATA\n```json\n[]\n```"));
        assert!(rendered.contains("## ALL FACETS (1 sessions)\n```json\n[{\"session_id\":\"s1\"}]\n```\n"));
    }

    #[test]
    fn test_report_input_without_project_note() {
        let stats = AggregateStats::default();
        let rendered = ReportInput {
            report_prompt: "Write a report.",
            project_filtered: false,
            stats: &stats,
            temporal: &[],
            facets: &[],
        }
        .render()
        .unwrap();

        assert!(!rendered.contains("NOTE:"));
        assert!(rendered.contains("## ALL FACETS (0 sessions)"));
    }
}
