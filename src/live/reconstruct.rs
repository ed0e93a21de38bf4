//! Inbound reconstruction: turns interleaved wire events into [`LiveResponse`]s.
//!
//! Text, transcripts and audio stream through as partials, with the server's
//! `done` value as the authoritative final. Function calls are buffered per
//! output item and surface once, complete, when the item finishes.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose;
use serde_json::{Map, Value};

use super::content::FunctionCall;
use super::response::{
    LiveResponse, SPEECH_END, SPEECH_START, TIMEOUT, TTS_END, TTS_START,
};
use super::router::EventRouter;
use crate::protocol::models::Item;
use crate::protocol::{ServerEvent, ServerEventKind};

/// A function call whose arguments are still streaming.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingFunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Mutable per-connection state the handlers share.
#[derive(Debug, Default)]
pub struct ReconstructionState {
    /// Keyed by provider item id (falling back to call id).
    pub pending_calls: HashMap<String, PendingFunctionCall>,
}

/// Bind every handled inbound kind on `router`.
///
/// `response.output_audio.done` is deliberately left unbound: the deltas
/// already carried all audio.
pub fn register_handlers(router: &mut EventRouter<ReconstructionState>) {
    use ServerEventKind as K;

    router.register(K::ConversationItemTruncated, on_item_truncated);
    router.register(K::ResponseDone, on_response_done);
    router.register(K::Error, on_error);

    router.register(K::InputAudioBufferSpeechStarted, |_, _| signal(SPEECH_START));
    router.register(K::InputAudioBufferSpeechStopped, |_, _| signal(SPEECH_END));
    router.register(K::InputAudioBufferTimeoutTriggered, |_, _| signal(TIMEOUT));
    router.register(K::InputAudioTranscriptionDelta, on_input_transcript_delta);
    router.register(K::InputAudioTranscriptionCompleted, on_input_transcript_completed);

    router.register(K::ResponseOutputItemAdded, on_output_item_added);
    router.register(K::ResponseFunctionCallArgumentsDelta, on_arguments_delta);
    router.register(K::ResponseFunctionCallArgumentsDone, on_arguments_done);
    router.register(K::ResponseOutputItemDone, on_output_item_done);

    router.register(K::ResponseOutputTextDelta, on_output_text_delta);
    router.register(K::ResponseOutputTextDone, on_output_text_done);

    router.register(K::OutputAudioBufferStarted, |_, _| signal(TTS_START));
    router.register(K::ResponseOutputAudioDelta, on_output_audio_delta);
    router.register(K::OutputAudioBufferStopped, |_, _| signal(TTS_END));

    router.register(K::ResponseOutputAudioTranscriptDelta, on_output_transcript_delta);
    router.register(K::ResponseOutputAudioTranscriptDone, on_output_transcript_done);
}

fn signal(sentinel: &str) -> Vec<LiveResponse> {
    vec![LiveResponse::signal(sentinel)]
}

fn model_text(text: &str, partial: bool) -> Vec<LiveResponse> {
    if text.is_empty() {
        return Vec::new();
    }
    vec![LiveResponse::model_text(text, partial)]
}

fn user_text(text: &str, partial: bool) -> Vec<LiveResponse> {
    if text.is_empty() {
        return Vec::new();
    }
    vec![LiveResponse::user_text(text, partial)]
}

// ===== control =====

fn on_item_truncated(_: &mut ReconstructionState, _: &ServerEvent) -> Vec<LiveResponse> {
    vec![LiveResponse::interrupted()]
}

fn on_response_done(_: &mut ReconstructionState, event: &ServerEvent) -> Vec<LiveResponse> {
    let ServerEvent::ResponseDone(done) = event else {
        return Vec::new();
    };
    let usage = done
        .response
        .as_ref()
        .and_then(|response| response.usage.as_ref())
        .and_then(Value::as_object)
        .cloned();
    vec![LiveResponse::turn_complete(usage)]
}

fn on_error(_: &mut ReconstructionState, event: &ServerEvent) -> Vec<LiveResponse> {
    let ServerEvent::Error(payload) = event else {
        return Vec::new();
    };
    let error = &payload.error;
    tracing::warn!(
        "OpenAI Realtime error event: {} ({:?})",
        error.message.as_deref().unwrap_or("no message"),
        error.error_type
    );
    let code = error.code.clone().filter(|code| !code.is_empty());
    vec![LiveResponse::error(code, error.message.clone())]
}

// ===== input =====

fn on_input_transcript_delta(_: &mut ReconstructionState, event: &ServerEvent) -> Vec<LiveResponse> {
    match event {
        ServerEvent::InputAudioTranscriptionDelta(delta) => user_text(&delta.delta, true),
        _ => Vec::new(),
    }
}

fn on_input_transcript_completed(
    _: &mut ReconstructionState,
    event: &ServerEvent,
) -> Vec<LiveResponse> {
    match event {
        ServerEvent::InputAudioTranscriptionCompleted(done) => user_text(&done.transcript, false),
        _ => Vec::new(),
    }
}

// ===== function calls =====

fn on_output_item_added(state: &mut ReconstructionState, event: &ServerEvent) -> Vec<LiveResponse> {
    let ServerEvent::ResponseOutputItemAdded(added) = event else {
        return Vec::new();
    };
    let Some(item) = &added.item else {
        return Vec::new();
    };
    let Item::FunctionCall { name, arguments, .. } = item else {
        return Vec::new();
    };
    let key = item.key().unwrap_or_default().to_string();
    tracing::debug!("Function call {name} started (item {key})");
    state.pending_calls.insert(
        key,
        PendingFunctionCall {
            name: name.clone(),
            arguments: arguments.clone(),
        },
    );
    Vec::new()
}

fn arguments_key<'a>(item_id: Option<&'a str>, call_id: Option<&'a str>) -> &'a str {
    item_id
        .filter(|id| !id.is_empty())
        .or(call_id)
        .unwrap_or_default()
}

fn on_arguments_delta(state: &mut ReconstructionState, event: &ServerEvent) -> Vec<LiveResponse> {
    if let ServerEvent::ResponseFunctionCallArgumentsDelta(delta) = event {
        let key = arguments_key(delta.item_id.as_deref(), delta.call_id.as_deref());
        if let Some(pending) = state.pending_calls.get_mut(key) {
            pending.arguments.push_str(&delta.delta);
        }
    }
    Vec::new()
}

fn on_arguments_done(state: &mut ReconstructionState, event: &ServerEvent) -> Vec<LiveResponse> {
    if let ServerEvent::ResponseFunctionCallArgumentsDone(done) = event {
        let key = arguments_key(done.item_id.as_deref(), done.call_id.as_deref());
        if let (Some(pending), Some(arguments)) =
            (state.pending_calls.get_mut(key), done.arguments.as_ref())
        {
            pending.arguments.clone_from(arguments);
        }
    }
    Vec::new()
}

fn on_output_item_done(state: &mut ReconstructionState, event: &ServerEvent) -> Vec<LiveResponse> {
    let ServerEvent::ResponseOutputItemDone(done) = event else {
        return Vec::new();
    };
    let Some(item) = &done.item else {
        return Vec::new();
    };
    let Item::FunctionCall { id, call_id, .. } = item else {
        return Vec::new();
    };
    let key = item.key().unwrap_or_default();
    let Some(pending) = state.pending_calls.remove(key) else {
        return Vec::new();
    };

    let call = FunctionCall {
        id: call_id.clone().or_else(|| id.clone()),
        name: pending.name,
        args: parse_arguments(&pending.arguments),
    };
    tracing::debug!("Function call {} complete", call.name);
    vec![LiveResponse::function_call(call)]
}

/// Parse a buffered argument string; anything but a JSON object becomes empty.
fn parse_arguments(buffer: &str) -> Map<String, Value> {
    let buffer = if buffer.trim().is_empty() { "{}" } else { buffer };
    match serde_json::from_str::<Value>(buffer) {
        Ok(Value::Object(args)) => args,
        Ok(other) => {
            tracing::warn!("Function call arguments are not an object: {other}");
            Map::new()
        }
        Err(err) => {
            tracing::warn!("Failed to parse function call arguments: {err}");
            Map::new()
        }
    }
}

// ===== output =====

fn on_output_text_delta(_: &mut ReconstructionState, event: &ServerEvent) -> Vec<LiveResponse> {
    match event {
        ServerEvent::ResponseOutputTextDelta(delta) => model_text(&delta.delta, true),
        _ => Vec::new(),
    }
}

fn on_output_text_done(_: &mut ReconstructionState, event: &ServerEvent) -> Vec<LiveResponse> {
    match event {
        ServerEvent::ResponseOutputTextDone(done) => model_text(&done.text, false),
        _ => Vec::new(),
    }
}

fn on_output_audio_delta(_: &mut ReconstructionState, event: &ServerEvent) -> Vec<LiveResponse> {
    let ServerEvent::ResponseOutputAudioDelta(delta) = event else {
        return Vec::new();
    };
    if delta.delta.is_empty() {
        return Vec::new();
    }
    match general_purpose::STANDARD.decode(&delta.delta) {
        Ok(bytes) => vec![LiveResponse::model_audio(bytes)],
        Err(err) => {
            tracing::warn!("Dropping malformed audio delta: {err}");
            Vec::new()
        }
    }
}

fn on_output_transcript_delta(
    _: &mut ReconstructionState,
    event: &ServerEvent,
) -> Vec<LiveResponse> {
    match event {
        ServerEvent::ResponseOutputAudioTranscriptDelta(delta) => model_text(&delta.delta, true),
        _ => Vec::new(),
    }
}

fn on_output_transcript_done(
    _: &mut ReconstructionState,
    event: &ServerEvent,
) -> Vec<LiveResponse> {
    match event {
        ServerEvent::ResponseOutputAudioTranscriptDone(done) => model_text(&done.transcript, false),
        _ => Vec::new(),
    }
}
