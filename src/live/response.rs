use serde_json::{Map, Value};

use super::content::{Blob, Content, ContentRole, FunctionCall, Part};

/// Sentinel texts carried by `Server`-role partial responses.
pub const SPEECH_START: &str = "SPEECH_START";
pub const SPEECH_END: &str = "SPEECH_END";
pub const TIMEOUT: &str = "TIMEOUT";
pub const TTS_START: &str = "TTS_START";
pub const TTS_END: &str = "TTS_END";

/// Error code reported when the provider's error event carries none.
pub const DEFAULT_ERROR_CODE: &str = "OPENAI_ERROR";

/// Normalized record handed to the runtime for each meaningful inbound signal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiveResponse {
    pub content: Option<Content>,
    /// More of the same unit will follow.
    pub partial: bool,
    pub turn_complete: bool,
    pub interrupted: bool,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub custom_metadata: Option<Map<String, Value>>,
}

impl LiveResponse {
    #[must_use]
    pub fn partial(content: Content) -> Self {
        Self {
            content: Some(content),
            partial: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn complete(content: Content) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn model_text(text: impl Into<String>, partial: bool) -> Self {
        let content = Content::model_text(text);
        if partial { Self::partial(content) } else { Self::complete(content) }
    }

    #[must_use]
    pub fn user_text(text: impl Into<String>, partial: bool) -> Self {
        let content = Content::user_text(text);
        if partial { Self::partial(content) } else { Self::complete(content) }
    }

    #[must_use]
    pub fn model_audio(data: Vec<u8>) -> Self {
        Self::partial(Content::new(
            ContentRole::Model,
            vec![Part::InlineData(Blob::pcm(data))],
        ))
    }

    /// Partial `Server` sentinel such as [`SPEECH_START`].
    #[must_use]
    pub fn signal(sentinel: &str) -> Self {
        Self::partial(Content::server_text(sentinel))
    }

    #[must_use]
    pub fn function_call(call: FunctionCall) -> Self {
        Self::complete(Content::new(ContentRole::Model, vec![Part::FunctionCall(call)]))
    }

    #[must_use]
    pub fn interrupted() -> Self {
        Self {
            interrupted: true,
            partial: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn turn_complete(custom_metadata: Option<Map<String, Value>>) -> Self {
        Self {
            turn_complete: true,
            custom_metadata,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn error(code: Option<String>, message: Option<String>) -> Self {
        Self {
            error_code: Some(code.unwrap_or_else(|| DEFAULT_ERROR_CODE.to_string())),
            error_message: message,
            ..Self::default()
        }
    }

    /// Text of the first text part, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|content| content.parts.iter().find_map(Part::as_text))
    }

    /// Sentinel text, when this is a `Server` signal.
    #[must_use]
    pub fn signal_name(&self) -> Option<&str> {
        match &self.content {
            Some(content) if content.role == ContentRole::Server => self.text(),
            _ => None,
        }
    }
}
