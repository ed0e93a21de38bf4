//! Wire event kinds for both directions of a realtime session.
//!
//! Outbound kinds are a closed set: the bridge only ever writes these frames.
//! Inbound kinds are the subset the bridge understands; the provider adds new
//! ones over time, so anything missing from [`ServerEventKind::from_wire`]
//! simply parses as an unknown event.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientEventKind {
    SessionUpdate,
    ConversationItemCreate,
    ConversationItemDelete,
    ConversationItemTruncate,
    InputAudioBufferAppend,
    InputAudioBufferCommit,
    InputAudioBufferClear,
    ResponseCreate,
    ResponseCancel,
    OutputAudioBufferClear,
}

impl ClientEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionUpdate => "session.update",
            Self::ConversationItemCreate => "conversation.item.create",
            Self::ConversationItemDelete => "conversation.item.delete",
            Self::ConversationItemTruncate => "conversation.item.truncate",
            Self::InputAudioBufferAppend => "input_audio_buffer.append",
            Self::InputAudioBufferCommit => "input_audio_buffer.commit",
            Self::InputAudioBufferClear => "input_audio_buffer.clear",
            Self::ResponseCreate => "response.create",
            Self::ResponseCancel => "response.cancel",
            Self::OutputAudioBufferClear => "output_audio_buffer.clear",
        }
    }
}

impl fmt::Display for ClientEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerEventKind {
    SessionCreated,
    SessionUpdated,
    RateLimitsUpdated,
    ConversationItemCreated,
    ConversationItemTruncated,
    InputAudioTranscriptionDelta,
    InputAudioTranscriptionCompleted,
    InputAudioBufferSpeechStarted,
    InputAudioBufferSpeechStopped,
    InputAudioBufferCommitted,
    InputAudioBufferTimeoutTriggered,
    ResponseCreated,
    ResponseDone,
    ResponseOutputItemAdded,
    ResponseOutputItemDone,
    ResponseFunctionCallArgumentsDelta,
    ResponseFunctionCallArgumentsDone,
    ResponseOutputTextDelta,
    ResponseOutputTextDone,
    ResponseOutputAudioDelta,
    ResponseOutputAudioDone,
    ResponseOutputAudioTranscriptDelta,
    ResponseOutputAudioTranscriptDone,
    OutputAudioBufferStarted,
    OutputAudioBufferStopped,
    OutputAudioBufferCleared,
    Error,
}

impl ServerEventKind {
    /// Look up the kind for a wire `type` string.
    ///
    /// Accepts both the GA names and the beta (`OpenAI-Beta: realtime=v1`)
    /// names the provider still emits.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        let kind = match name {
            "session.created" => Self::SessionCreated,
            "session.updated" => Self::SessionUpdated,
            "rate_limits.updated" => Self::RateLimitsUpdated,
            "conversation.item.created" | "conversation.item.added" => {
                Self::ConversationItemCreated
            }
            "conversation.item.truncated" => Self::ConversationItemTruncated,
            "conversation.item.input_audio_transcription.delta" => {
                Self::InputAudioTranscriptionDelta
            }
            "conversation.item.input_audio_transcription.completed" => {
                Self::InputAudioTranscriptionCompleted
            }
            "input_audio_buffer.speech_started" => Self::InputAudioBufferSpeechStarted,
            "input_audio_buffer.speech_stopped" => Self::InputAudioBufferSpeechStopped,
            "input_audio_buffer.committed" => Self::InputAudioBufferCommitted,
            "input_audio_buffer.timeout_triggered" => Self::InputAudioBufferTimeoutTriggered,
            "response.created" => Self::ResponseCreated,
            "response.done" => Self::ResponseDone,
            "response.output_item.added" => Self::ResponseOutputItemAdded,
            "response.output_item.done" => Self::ResponseOutputItemDone,
            "response.function_call_arguments.delta" => Self::ResponseFunctionCallArgumentsDelta,
            "response.function_call_arguments.done" => Self::ResponseFunctionCallArgumentsDone,
            "response.output_text.delta" | "response.text.delta" => Self::ResponseOutputTextDelta,
            "response.output_text.done" | "response.text.done" => Self::ResponseOutputTextDone,
            "response.output_audio.delta" | "response.audio.delta" => {
                Self::ResponseOutputAudioDelta
            }
            "response.output_audio.done" | "response.audio.done" => Self::ResponseOutputAudioDone,
            "response.output_audio_transcript.delta" | "response.audio_transcript.delta" => {
                Self::ResponseOutputAudioTranscriptDelta
            }
            "response.output_audio_transcript.done" | "response.audio_transcript.done" => {
                Self::ResponseOutputAudioTranscriptDone
            }
            "output_audio_buffer.started" => Self::OutputAudioBufferStarted,
            "output_audio_buffer.stopped" => Self::OutputAudioBufferStopped,
            "output_audio_buffer.cleared" => Self::OutputAudioBufferCleared,
            "error" => Self::Error,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical (GA) wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionCreated => "session.created",
            Self::SessionUpdated => "session.updated",
            Self::RateLimitsUpdated => "rate_limits.updated",
            Self::ConversationItemCreated => "conversation.item.created",
            Self::ConversationItemTruncated => "conversation.item.truncated",
            Self::InputAudioTranscriptionDelta => {
                "conversation.item.input_audio_transcription.delta"
            }
            Self::InputAudioTranscriptionCompleted => {
                "conversation.item.input_audio_transcription.completed"
            }
            Self::InputAudioBufferSpeechStarted => "input_audio_buffer.speech_started",
            Self::InputAudioBufferSpeechStopped => "input_audio_buffer.speech_stopped",
            Self::InputAudioBufferCommitted => "input_audio_buffer.committed",
            Self::InputAudioBufferTimeoutTriggered => "input_audio_buffer.timeout_triggered",
            Self::ResponseCreated => "response.created",
            Self::ResponseDone => "response.done",
            Self::ResponseOutputItemAdded => "response.output_item.added",
            Self::ResponseOutputItemDone => "response.output_item.done",
            Self::ResponseFunctionCallArgumentsDelta => "response.function_call_arguments.delta",
            Self::ResponseFunctionCallArgumentsDone => "response.function_call_arguments.done",
            Self::ResponseOutputTextDelta => "response.output_text.delta",
            Self::ResponseOutputTextDone => "response.output_text.done",
            Self::ResponseOutputAudioDelta => "response.output_audio.delta",
            Self::ResponseOutputAudioDone => "response.output_audio.done",
            Self::ResponseOutputAudioTranscriptDelta => "response.output_audio_transcript.delta",
            Self::ResponseOutputAudioTranscriptDone => "response.output_audio_transcript.done",
            Self::OutputAudioBufferStarted => "output_audio_buffer.started",
            Self::OutputAudioBufferStopped => "output_audio_buffer.stopped",
            Self::OutputAudioBufferCleared => "output_audio_buffer.cleared",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ServerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
