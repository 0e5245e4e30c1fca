use serde_json::{Map, Value};

use crate::{ExtractError, Result};

const FENCE: &str = "```";

/// One object emitted by the model, before it is matched to a session
pub type FacetRecord = Map<String, Value>;

/// Remove a single markdown code fence wrapping the whole text.
///
/// The opening line (with any language tag) is dropped; the closing line is
/// dropped only if it is a bare fence. Unfenced text is returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with(FENCE) {
        return text;
    }

    let body = match text.find('\n') {
        Some(idx) => &text[idx + 1..],
        None => "",
    };

    let body = match body.rfind('\n') {
        Some(idx) if body[idx + 1..].trim() == FENCE => &body[..idx],
        None if body.trim() == FENCE => "",
        _ => body,
    };

    body.trim()
}

/// Parse a model response into facet records.
///
/// The whole document is tried first: a list of objects, or a single object
/// promoted to a one-element list. Only when that parse fails is the text
/// scanned for top-level `{...}` blocks, each parsed on its own; prose around
/// or between them is ignored.
pub fn parse_facet_records(response: &str) -> Result<Vec<FacetRecord>> {
    let text = strip_code_fence(response);
    if text.is_empty() {
        return Err(ExtractError::EmptyResponse);
    }

    let records = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => {
            let total = items.len();
            let objects: Vec<FacetRecord> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            if objects.len() < total {
                tracing::debug!(
                    skipped = total - objects.len(),
                    "ignoring non-object entries in response list"
                );
            }
            objects
        }
        Ok(Value::Object(map)) => vec![map],
        Ok(other) => return Err(ExtractError::UnexpectedShape(json_kind(&other).to_string())),
        Err(err) => {
            tracing::debug!(error = %err, "response is not a JSON document, scanning for objects");
            scan_objects(text)
        }
    };

    if records.is_empty() {
        return Err(ExtractError::NoRecords);
    }
    Ok(records)
}

/// Collect every balanced top-level `{...}` span that parses as an object.
///
/// Braces inside JSON strings do not affect nesting; a stray `}` outside any
/// object is ignored.
fn scan_objects(text: &str) -> Vec<FacetRecord> {
    let mut records = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(begin) = start.take() {
                        if let Ok(Value::Object(map)) =
                            serde_json::from_str::<Value>(&text[begin..=idx])
                        {
                            records.push(map);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    records
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
