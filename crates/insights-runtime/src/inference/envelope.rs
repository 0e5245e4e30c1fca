use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured wrapper printed by the inference command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Model output text
    pub response: String,
    /// Usage and timing statistics, shape owned by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
}

impl Envelope {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            stats: None,
        }
    }

    /// `stats.models.<model>.api.totalLatencyMs`, falling back to the first model listed
    pub fn latency_ms(&self, model: &str) -> Option<u64> {
        let models = self.stats.as_ref()?.get("models")?.as_object()?;
        let entry = models.get(model).or_else(|| models.values().next())?;
        entry.get("api")?.get("totalLatencyMs")?.as_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_envelope_with_stats() {
        let envelope: Envelope = serde_json::from_value(json!({
            "response": "[]",
            "stats": {"models": {"gemini-2.5-pro": {"api": {"totalLatencyMs": 41250}}}}
        }))
        .unwrap();

        assert_eq!(envelope.response, "[]");
        assert_eq!(envelope.latency_ms("gemini-2.5-pro"), Some(41_250));
        assert_eq!(envelope.latency_ms("other-model"), Some(41_250));
    }

    #[test]
    fn test_latency_absent() {
        assert_eq!(Envelope::new("x").latency_ms("m"), None);

        let envelope: Envelope =
            serde_json::from_value(json!({"response": "x", "stats": {"models": {}}})).unwrap();
        assert_eq!(envelope.latency_ms("m"), None);
    }

    #[test]
    fn test_response_is_required() {
        assert!(serde_json::from_value::<Envelope>(json!({"stats": {}})).is_err());
        assert!(serde_json::from_value::<Envelope>(json!(["response"])).is_err());
    }
}
