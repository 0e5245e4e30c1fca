use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Outcome value counted as a success in temporal stats
pub const OUTCOME_FULLY_ACHIEVED: &str = "fully_achieved";

/// Per-session analysis record produced by the inference step.
///
/// This is also the unit of the on-disk cache: one file per session, replaced
/// wholesale when the session is reprocessed. Fields the model emits that are
/// not modelled here survive a round trip through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub session_id: String,

    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub project: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub underlying_goal: Option<String>,

    #[serde(default, deserialize_with = "deserialize_counts")]
    pub goal_categories: BTreeMap<String, u64>,

    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub outcome: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub claude_helpfulness: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_type: Option<String>,

    #[serde(default, deserialize_with = "deserialize_counts")]
    pub friction_counts: BTreeMap<String, u64>,

    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub friction_detail: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_success: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub improvement_opportunity: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_timestamp: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_timestamp: Option<String>,

    /// Source log mtime at analysis time (the freshness fingerprint)
    #[serde(
        rename = "_source_mtime",
        default,
        deserialize_with = "deserialize_mtime",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_mtime: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Facet {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            project: None,
            underlying_goal: None,
            goal_categories: BTreeMap::new(),
            outcome: None,
            claude_helpfulness: None,
            session_type: None,
            friction_counts: BTreeMap::new(),
            friction_detail: None,
            primary_success: None,
            improvement_opportunity: None,
            start_timestamp: None,
            end_timestamp: None,
            source_mtime: None,
            extra: Map::new(),
        }
    }

    pub fn outcome_or_default(&self) -> &str {
        self.outcome.as_deref().unwrap_or("unclear")
    }

    pub fn helpfulness_or_default(&self) -> &str {
        self.claude_helpfulness.as_deref().unwrap_or("unknown")
    }

    pub fn session_type_or_default(&self) -> &str {
        self.session_type.as_deref().unwrap_or("unknown")
    }

    pub fn project_or_default(&self) -> &str {
        self.project.as_deref().unwrap_or("unknown")
    }

    pub fn is_fully_achieved(&self) -> bool {
        self.outcome.as_deref() == Some(OUTCOME_FULLY_ACHIEVED)
    }

    pub fn has_friction(&self) -> bool {
        !self.friction_counts.is_empty()
    }

    /// Parsed `start_timestamp`, if present and well-formed
    pub fn started_at(&self) -> Option<DateTime<FixedOffset>> {
        self.start_timestamp
            .as_deref()
            .and_then(crate::parse_timestamp)
    }

    /// True when this facet was produced from the file state described by `mtime`
    pub fn is_fresh_for(&self, mtime: f64) -> bool {
        self.source_mtime == Some(mtime)
    }
}

/// Accept a text field leniently: anything other than a string becomes `None`
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Ok(Some(text)),
        _ => Ok(None),
    }
}

fn deserialize_mtime<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_f64()))
}

/// Accept a `{name: count}` object leniently.
///
/// Models occasionally emit floats, strings or booleans as counts; any entry
/// that is not a non-negative number counts as one. Non-object values
/// (including `null`) become an empty map.
fn deserialize_counts<'de, D>(deserializer: D) -> Result<BTreeMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(entries)) = value else {
        return Ok(BTreeMap::new());
    };

    Ok(entries
        .into_iter()
        .map(|(name, count)| {
            let count = count
                .as_u64()
                .or_else(|| count.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .unwrap_or(1);
            (name, count)
        })
        .collect())
}
