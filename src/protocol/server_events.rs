use serde::{Deserialize, Deserializer, Serialize};

use super::event_types::ServerEventKind;
use super::models::common::or_default;
use super::models::{ArbitraryJson, Item, Response};
use crate::error::ServerError;

/// Inbound frame, decoded.
///
/// The provider routinely omits fields, so every payload is lenient: missing
/// fields take their default. A frame whose `type` is unknown, or whose body
/// does not fit the payload for its `type`, is kept whole as
/// [`ServerEvent::Unknown`].
#[derive(Debug, Clone)]
pub enum ServerEvent {
    SessionCreated(SessionEvent),
    SessionUpdated(SessionEvent),
    RateLimitsUpdated(RateLimitsUpdated),
    ConversationItemCreated(ConversationItemEvent),
    ConversationItemTruncated(ItemTruncated),
    InputAudioTranscriptionDelta(TranscriptionDelta),
    InputAudioTranscriptionCompleted(TranscriptionCompleted),
    InputAudioBufferSpeechStarted(SpeechStarted),
    InputAudioBufferSpeechStopped(SpeechStopped),
    InputAudioBufferCommitted(BufferCommitted),
    InputAudioBufferTimeoutTriggered(TimeoutTriggered),
    ResponseCreated(ResponseEvent),
    ResponseDone(ResponseEvent),
    ResponseOutputItemAdded(OutputItemEvent),
    ResponseOutputItemDone(OutputItemEvent),
    ResponseFunctionCallArgumentsDelta(ArgumentsDelta),
    ResponseFunctionCallArgumentsDone(ArgumentsDone),
    ResponseOutputTextDelta(ContentDelta),
    ResponseOutputTextDone(TextDone),
    ResponseOutputAudioDelta(ContentDelta),
    ResponseOutputAudioDone(ContentDone),
    ResponseOutputAudioTranscriptDelta(ContentDelta),
    ResponseOutputAudioTranscriptDone(TranscriptDone),
    OutputAudioBufferStarted(OutputAudioBufferEvent),
    OutputAudioBufferStopped(OutputAudioBufferEvent),
    OutputAudioBufferCleared(OutputAudioBufferEvent),
    Error(ErrorEvent),
    Unknown(ArbitraryJson),
}

macro_rules! payload {
    ($value:expr, $variant:ident) => {
        Deserialize::deserialize($value).map(ServerEvent::$variant)
    };
}

impl ServerEvent {
    /// Decode an already JSON-parsed frame.
    ///
    /// Never fails: anything that cannot be typed comes back as `Unknown`.
    #[must_use]
    pub fn parse(value: ArbitraryJson) -> Self {
        let Some(kind) = value
            .get("type")
            .and_then(|v| v.as_str())
            .and_then(ServerEventKind::from_wire)
        else {
            return Self::Unknown(value);
        };

        let parsed = match kind {
            ServerEventKind::SessionCreated => payload!(&value, SessionCreated),
            ServerEventKind::SessionUpdated => payload!(&value, SessionUpdated),
            ServerEventKind::RateLimitsUpdated => payload!(&value, RateLimitsUpdated),
            ServerEventKind::ConversationItemCreated => payload!(&value, ConversationItemCreated),
            ServerEventKind::ConversationItemTruncated => {
                payload!(&value, ConversationItemTruncated)
            }
            ServerEventKind::InputAudioTranscriptionDelta => {
                payload!(&value, InputAudioTranscriptionDelta)
            }
            ServerEventKind::InputAudioTranscriptionCompleted => {
                payload!(&value, InputAudioTranscriptionCompleted)
            }
            ServerEventKind::InputAudioBufferSpeechStarted => {
                payload!(&value, InputAudioBufferSpeechStarted)
            }
            ServerEventKind::InputAudioBufferSpeechStopped => {
                payload!(&value, InputAudioBufferSpeechStopped)
            }
            ServerEventKind::InputAudioBufferCommitted => {
                payload!(&value, InputAudioBufferCommitted)
            }
            ServerEventKind::InputAudioBufferTimeoutTriggered => {
                payload!(&value, InputAudioBufferTimeoutTriggered)
            }
            ServerEventKind::ResponseCreated => payload!(&value, ResponseCreated),
            ServerEventKind::ResponseDone => payload!(&value, ResponseDone),
            ServerEventKind::ResponseOutputItemAdded => payload!(&value, ResponseOutputItemAdded),
            ServerEventKind::ResponseOutputItemDone => payload!(&value, ResponseOutputItemDone),
            ServerEventKind::ResponseFunctionCallArgumentsDelta => {
                payload!(&value, ResponseFunctionCallArgumentsDelta)
            }
            ServerEventKind::ResponseFunctionCallArgumentsDone => {
                payload!(&value, ResponseFunctionCallArgumentsDone)
            }
            ServerEventKind::ResponseOutputTextDelta => payload!(&value, ResponseOutputTextDelta),
            ServerEventKind::ResponseOutputTextDone => payload!(&value, ResponseOutputTextDone),
            ServerEventKind::ResponseOutputAudioDelta => payload!(&value, ResponseOutputAudioDelta),
            ServerEventKind::ResponseOutputAudioDone => payload!(&value, ResponseOutputAudioDone),
            ServerEventKind::ResponseOutputAudioTranscriptDelta => {
                payload!(&value, ResponseOutputAudioTranscriptDelta)
            }
            ServerEventKind::ResponseOutputAudioTranscriptDone => {
                payload!(&value, ResponseOutputAudioTranscriptDone)
            }
            ServerEventKind::OutputAudioBufferStarted => payload!(&value, OutputAudioBufferStarted),
            ServerEventKind::OutputAudioBufferStopped => payload!(&value, OutputAudioBufferStopped),
            ServerEventKind::OutputAudioBufferCleared => payload!(&value, OutputAudioBufferCleared),
            ServerEventKind::Error => payload!(&value, Error),
        };

        match parsed {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!("Failed to parse ServerEvent {kind}: {err}");
                Self::Unknown(value)
            }
        }
    }

    /// Routing key; `None` for unknown frames.
    #[must_use]
    pub const fn kind(&self) -> Option<ServerEventKind> {
        let kind = match self {
            Self::SessionCreated(_) => ServerEventKind::SessionCreated,
            Self::SessionUpdated(_) => ServerEventKind::SessionUpdated,
            Self::RateLimitsUpdated(_) => ServerEventKind::RateLimitsUpdated,
            Self::ConversationItemCreated(_) => ServerEventKind::ConversationItemCreated,
            Self::ConversationItemTruncated(_) => ServerEventKind::ConversationItemTruncated,
            Self::InputAudioTranscriptionDelta(_) => ServerEventKind::InputAudioTranscriptionDelta,
            Self::InputAudioTranscriptionCompleted(_) => {
                ServerEventKind::InputAudioTranscriptionCompleted
            }
            Self::InputAudioBufferSpeechStarted(_) => {
                ServerEventKind::InputAudioBufferSpeechStarted
            }
            Self::InputAudioBufferSpeechStopped(_) => {
                ServerEventKind::InputAudioBufferSpeechStopped
            }
            Self::InputAudioBufferCommitted(_) => ServerEventKind::InputAudioBufferCommitted,
            Self::InputAudioBufferTimeoutTriggered(_) => {
                ServerEventKind::InputAudioBufferTimeoutTriggered
            }
            Self::ResponseCreated(_) => ServerEventKind::ResponseCreated,
            Self::ResponseDone(_) => ServerEventKind::ResponseDone,
            Self::ResponseOutputItemAdded(_) => ServerEventKind::ResponseOutputItemAdded,
            Self::ResponseOutputItemDone(_) => ServerEventKind::ResponseOutputItemDone,
            Self::ResponseFunctionCallArgumentsDelta(_) => {
                ServerEventKind::ResponseFunctionCallArgumentsDelta
            }
            Self::ResponseFunctionCallArgumentsDone(_) => {
                ServerEventKind::ResponseFunctionCallArgumentsDone
            }
            Self::ResponseOutputTextDelta(_) => ServerEventKind::ResponseOutputTextDelta,
            Self::ResponseOutputTextDone(_) => ServerEventKind::ResponseOutputTextDone,
            Self::ResponseOutputAudioDelta(_) => ServerEventKind::ResponseOutputAudioDelta,
            Self::ResponseOutputAudioDone(_) => ServerEventKind::ResponseOutputAudioDone,
            Self::ResponseOutputAudioTranscriptDelta(_) => {
                ServerEventKind::ResponseOutputAudioTranscriptDelta
            }
            Self::ResponseOutputAudioTranscriptDone(_) => {
                ServerEventKind::ResponseOutputAudioTranscriptDone
            }
            Self::OutputAudioBufferStarted(_) => ServerEventKind::OutputAudioBufferStarted,
            Self::OutputAudioBufferStopped(_) => ServerEventKind::OutputAudioBufferStopped,
            Self::OutputAudioBufferCleared(_) => ServerEventKind::OutputAudioBufferCleared,
            Self::Error(_) => ServerEventKind::Error,
            Self::Unknown(_) => return None,
        };
        Some(kind)
    }

    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        macro_rules! extract {
            ($($variant:ident),*) => {
                match self {
                    $(Self::$variant(payload) => payload.event_id.as_deref(),)*
                    Self::Unknown(value) => value.get("event_id").and_then(|v| v.as_str()),
                }
            };
        }
        extract!(
            SessionCreated, SessionUpdated, RateLimitsUpdated, ConversationItemCreated,
            ConversationItemTruncated, InputAudioTranscriptionDelta,
            InputAudioTranscriptionCompleted, InputAudioBufferSpeechStarted,
            InputAudioBufferSpeechStopped, InputAudioBufferCommitted,
            InputAudioBufferTimeoutTriggered, ResponseCreated, ResponseDone,
            ResponseOutputItemAdded, ResponseOutputItemDone,
            ResponseFunctionCallArgumentsDelta, ResponseFunctionCallArgumentsDone,
            ResponseOutputTextDelta, ResponseOutputTextDone, ResponseOutputAudioDelta,
            ResponseOutputAudioDone, ResponseOutputAudioTranscriptDelta,
            ResponseOutputAudioTranscriptDone, OutputAudioBufferStarted,
            OutputAudioBufferStopped, OutputAudioBufferCleared, Error
        )
    }
}

impl<'de> Deserialize<'de> for ServerEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = ArbitraryJson::deserialize(deserializer)?;
        Ok(Self::parse(value))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionEvent {
    pub event_id: Option<String>,
    /// Effective session settings as echoed by the provider.
    pub session: ArbitraryJson,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitsUpdated {
    pub event_id: Option<String>,
    pub rate_limits: Vec<RateLimit>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimit {
    pub name: String,
    pub limit: u32,
    pub remaining: u32,
    pub reset_seconds: f32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversationItemEvent {
    pub event_id: Option<String>,
    pub previous_item_id: Option<String>,
    pub item: Option<Item>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ItemTruncated {
    pub event_id: Option<String>,
    pub item_id: String,
    pub content_index: u32,
    pub audio_end_ms: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TranscriptionDelta {
    pub event_id: Option<String>,
    pub item_id: String,
    pub content_index: u32,
    pub delta: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TranscriptionCompleted {
    pub event_id: Option<String>,
    pub item_id: String,
    pub content_index: u32,
    pub transcript: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SpeechStarted {
    pub event_id: Option<String>,
    pub item_id: String,
    pub audio_start_ms: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SpeechStopped {
    pub event_id: Option<String>,
    pub item_id: String,
    pub audio_end_ms: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BufferCommitted {
    pub event_id: Option<String>,
    pub previous_item_id: Option<String>,
    pub item_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutTriggered {
    pub event_id: Option<String>,
    pub item_id: String,
    pub audio_start_ms: u32,
    pub audio_end_ms: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseEvent {
    #[serde(deserialize_with = "or_default")]
    pub event_id: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub response: Option<Response>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputItemEvent {
    pub event_id: Option<String>,
    pub response_id: Option<String>,
    pub output_index: u32,
    pub item: Option<Item>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ArgumentsDelta {
    pub event_id: Option<String>,
    pub response_id: Option<String>,
    pub item_id: Option<String>,
    pub output_index: u32,
    pub call_id: Option<String>,
    pub delta: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ArgumentsDone {
    pub event_id: Option<String>,
    pub response_id: Option<String>,
    pub item_id: Option<String>,
    pub output_index: u32,
    pub call_id: Option<String>,
    pub arguments: Option<String>,
}

/// Shared shape of the text, audio and transcript delta events.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentDelta {
    pub event_id: Option<String>,
    pub response_id: Option<String>,
    pub item_id: Option<String>,
    pub output_index: u32,
    pub content_index: u32,
    pub delta: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TextDone {
    pub event_id: Option<String>,
    pub response_id: Option<String>,
    pub item_id: Option<String>,
    pub output_index: u32,
    pub content_index: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentDone {
    pub event_id: Option<String>,
    pub response_id: Option<String>,
    pub item_id: Option<String>,
    pub output_index: u32,
    pub content_index: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TranscriptDone {
    pub event_id: Option<String>,
    pub response_id: Option<String>,
    pub item_id: Option<String>,
    pub output_index: u32,
    pub content_index: u32,
    pub transcript: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputAudioBufferEvent {
    pub event_id: Option<String>,
    pub response_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ErrorEvent {
    #[serde(deserialize_with = "or_default")]
    pub event_id: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub error: ServerError,
}
