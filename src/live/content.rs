//! The runtime-side conversation model: turns made of parts.

use serde_json::{Map, Value};

/// Author of a [`Content`] item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentRole {
    #[default]
    User,
    Model,
    /// Out-of-band signals produced by the bridge itself (speech activity,
    /// playback state). Never sent upstream.
    Server,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Content {
    pub role: ContentRole,
    pub parts: Vec<Part>,
}

impl Content {
    #[must_use]
    pub const fn new(role: ContentRole, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(ContentRole::User, vec![Part::text(text)])
    }

    #[must_use]
    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(ContentRole::Model, vec![Part::text(text)])
    }

    #[must_use]
    pub fn server_text(text: impl Into<String>) -> Self {
        Self::new(ContentRole::Server, vec![Part::text(text)])
    }

    /// Non-empty text parts, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .filter(|text| !text.is_empty())
    }

    #[must_use]
    pub fn first_part(&self) -> Option<&Part> {
        self.parts.first()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
    InlineData(Blob),
}

impl Part {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_function_call(&self) -> Option<&FunctionCall> {
        match self {
            Self::FunctionCall(call) => Some(call),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_function_response(&self) -> Option<&FunctionResponse> {
        match self {
            Self::FunctionResponse(response) => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_inline_data(&self) -> Option<&Blob> {
        match self {
            Self::InlineData(blob) => Some(blob),
            _ => None,
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionCall {
    pub id: Option<String>,
    pub name: String,
    pub args: Map<String, Value>,
}

/// The result of a tool invocation, sent back to the model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionResponse {
    /// Call id this result answers.
    pub id: Option<String>,
    pub name: String,
    pub response: Value,
}

impl FunctionResponse {
    /// Payload as sent on the wire: the response serialized as compact JSON.
    #[must_use]
    pub fn output_text(&self) -> String {
        self.response.to_string()
    }
}

/// Raw media bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Blob {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Blob {
    pub const PCM_MIME_TYPE: &'static str = "audio/pcm";

    #[must_use]
    pub fn pcm(data: Vec<u8>) -> Self {
        Self {
            mime_type: Self::PCM_MIME_TYPE.to_string(),
            data,
        }
    }

    /// Audio blobs, and blobs with no declared type, are accepted as audio.
    #[must_use]
    pub fn is_audio(&self) -> bool {
        self.mime_type.is_empty() || self.mime_type.starts_with("audio/")
    }
}
