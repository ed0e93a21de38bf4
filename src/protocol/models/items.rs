use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ArbitraryJson, ItemStatus, Role};

/// Conversation item as it appears on the wire.
///
/// Manual (de)serialization preserves unknown variants as raw JSON while keeping
/// strong typing for the items the bridge reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Message {
        id: Option<String>,
        status: Option<ItemStatus>,
        role: Role,
        content: Vec<ContentPart>,
    },
    FunctionCall {
        id: Option<String>,
        status: Option<ItemStatus>,
        name: String,
        call_id: Option<String>,
        arguments: String,
    },
    FunctionCallOutput {
        id: Option<String>,
        call_id: String,
        output: String,
    },
    Unknown(ArbitraryJson),
}

impl Item {
    /// User message made of `input_text` parts.
    #[must_use]
    pub fn user_text<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Message {
            id: None,
            status: None,
            role: Role::User,
            content: texts
                .into_iter()
                .map(|text| ContentPart::InputText { text: text.into() })
                .collect(),
        }
    }

    /// Assistant message made of `text` parts.
    #[must_use]
    pub fn assistant_text<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Message {
            id: None,
            status: None,
            role: Role::Assistant,
            content: texts
                .into_iter()
                .map(|text| ContentPart::Text { text: text.into() })
                .collect(),
        }
    }

    /// Item id, falling back to the call id for function calls.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Message { id, .. } | Self::FunctionCallOutput { id, .. } => id.as_deref(),
            Self::FunctionCall { id, call_id, .. } => id.as_deref().or(call_id.as_deref()),
            Self::Unknown(value) => value.get("id").and_then(|v| v.as_str()),
        }
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Message { .. } => "message",
            Self::FunctionCall { .. } => "function_call",
            Self::FunctionCallOutput { .. } => "function_call_output",
            Self::Unknown(_) => "unknown",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ItemRepr {
    Message {
        id: Option<String>,
        status: Option<ItemStatus>,
        #[serde(default)]
        role: Role,
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    FunctionCall {
        id: Option<String>,
        status: Option<ItemStatus>,
        #[serde(default)]
        name: String,
        call_id: Option<String>,
        #[serde(default)]
        arguments: String,
    },
    FunctionCallOutput {
        id: Option<String>,
        #[serde(default)]
        call_id: String,
        #[serde(default)]
        output: String,
    },
}

impl From<ItemRepr> for Item {
    fn from(repr: ItemRepr) -> Self {
        match repr {
            ItemRepr::Message { id, status, role, content } => {
                Self::Message { id, status, role, content }
            }
            ItemRepr::FunctionCall { id, status, name, call_id, arguments } => {
                Self::FunctionCall { id, status, name, call_id, arguments }
            }
            ItemRepr::FunctionCallOutput { id, call_id, output } => {
                Self::FunctionCallOutput { id, call_id, output }
            }
        }
    }
}

impl Serialize for Item {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Unknown(value) => value.serialize(serializer),
            Self::Message { id, status, role, content } => {
                let mut state = serializer.serialize_struct("Item", 5)?;
                state.serialize_field("type", "message")?;
                if let Some(value) = id {
                    state.serialize_field("id", value)?;
                }
                if let Some(value) = status {
                    state.serialize_field("status", value)?;
                }
                state.serialize_field("role", role)?;
                state.serialize_field("content", content)?;
                state.end()
            }
            Self::FunctionCall { id, status, name, call_id, arguments } => {
                let mut state = serializer.serialize_struct("Item", 6)?;
                state.serialize_field("type", "function_call")?;
                if let Some(value) = id {
                    state.serialize_field("id", value)?;
                }
                if let Some(value) = status {
                    state.serialize_field("status", value)?;
                }
                state.serialize_field("name", name)?;
                if let Some(value) = call_id {
                    state.serialize_field("call_id", value)?;
                }
                state.serialize_field("arguments", arguments)?;
                state.end()
            }
            Self::FunctionCallOutput { id, call_id, output } => {
                let mut state = serializer.serialize_struct("Item", 4)?;
                state.serialize_field("type", "function_call_output")?;
                if let Some(value) = id {
                    state.serialize_field("id", value)?;
                }
                state.serialize_field("call_id", call_id)?;
                state.serialize_field("output", output)?;
                state.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = ArbitraryJson::deserialize(deserializer)?;
        match ItemRepr::deserialize(&value) {
            Ok(repr) => Ok(repr.into()),
            Err(err) => {
                tracing::debug!("Failed to parse Item: {err}");
                Ok(Self::Unknown(value))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    /// User-authored text.
    InputText { text: String },
    /// Assistant-authored text in a replayed message.
    Text { text: String },
    OutputText { text: String },
    Audio {
        audio: Option<String>,
        transcript: Option<String>,
    },
    Unknown(ArbitraryJson),
}

impl ContentPart {
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::InputText { text } | Self::Text { text } | Self::OutputText { text } => Some(text),
            Self::Audio { transcript, .. } => transcript.as_deref(),
            Self::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPartRepr {
    InputText {
        #[serde(default)]
        text: String,
    },
    Text {
        #[serde(default)]
        text: String,
    },
    OutputText {
        #[serde(default)]
        text: String,
    },
    #[serde(alias = "output_audio")]
    Audio {
        audio: Option<String>,
        transcript: Option<String>,
    },
}

impl From<ContentPartRepr> for ContentPart {
    fn from(repr: ContentPartRepr) -> Self {
        match repr {
            ContentPartRepr::InputText { text } => Self::InputText { text },
            ContentPartRepr::Text { text } => Self::Text { text },
            ContentPartRepr::OutputText { text } => Self::OutputText { text },
            ContentPartRepr::Audio { audio, transcript } => Self::Audio { audio, transcript },
        }
    }
}

impl Serialize for ContentPart {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (kind, text) = match self {
            Self::Unknown(value) => return value.serialize(serializer),
            Self::Audio { audio, transcript } => {
                let mut state = serializer.serialize_struct("ContentPart", 3)?;
                state.serialize_field("type", "audio")?;
                if let Some(value) = audio {
                    state.serialize_field("audio", value)?;
                }
                if let Some(value) = transcript {
                    state.serialize_field("transcript", value)?;
                }
                return state.end();
            }
            Self::InputText { text } => ("input_text", text),
            Self::Text { text } => ("text", text),
            Self::OutputText { text } => ("output_text", text),
        };
        let mut state = serializer.serialize_struct("ContentPart", 2)?;
        state.serialize_field("type", kind)?;
        state.serialize_field("text", text)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ContentPart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = ArbitraryJson::deserialize(deserializer)?;
        match ContentPartRepr::deserialize(&value) {
            Ok(repr) => Ok(repr.into()),
            Err(err) => {
                tracing::debug!("Failed to parse ContentPart: {err}");
                Ok(Self::Unknown(value))
            }
        }
    }
}
