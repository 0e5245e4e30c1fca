use serde::Deserialize;
use serde_json::Value;

/// Body of a `user` / `assistant` record.
///
/// Every field is optional: the cleaner only needs the role and the text
/// content, and must not reject a record because an unrelated field changed
/// shape between Claude Code versions.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct MessageRecord {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: MessageContent,
}

/// `content` is either a plain string or a list of typed parts
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Other(Value::Null)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ContentPart {
    Typed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        text: Option<Value>,
    },
    Other(Value),
}

impl ContentPart {
    /// Text of a `text`-typed part; tool calls, images, thinking blocks are ignored
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentPart::Typed { kind, text } if kind == "text" => {
                text.as_ref().and_then(|t| t.as_str())
            }
            _ => None,
        }
    }
}

impl MessageContent {
    /// Text-bearing items in document order
    pub fn texts(&self) -> Vec<&str> {
        match self {
            MessageContent::Text(text) => vec![text.as_str()],
            MessageContent::Parts(parts) => parts.iter().filter_map(|p| p.text()).collect(),
            MessageContent::Other(_) => Vec::new(),
        }
    }
}
