use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose;
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use serde_json::Value;
use tokio::sync::Mutex;

use super::content::{Content, ContentRole, FunctionResponse, Part};
use super::reconstruct::{PendingFunctionCall, ReconstructionState, register_handlers};
use super::request::RealtimeInput;
use super::response::LiveResponse;
use super::router::EventRouter;
use crate::error::{Error, Result};
use crate::protocol::models::Item;
use crate::protocol::{ClientEvent, SessionConfigMap, ServerEvent};
use crate::transport::{FrameSink, FrameSource};
use crate::{MAX_INPUT_AUDIO_CHUNK_BYTES, TRACE_LOG_MAX_BYTES, safe_truncate};

struct Inbound {
    source: Box<dyn FrameSource>,
    router: EventRouter<ReconstructionState>,
}

/// One live session over an open realtime socket.
///
/// Sends may run concurrently with [`receive`](Self::receive): the writing and
/// reading halves sit behind separate locks. Frames are processed strictly in
/// arrival order. Reconstruction state has a lock of its own, held only while a
/// frame is dispatched, so it can be inspected while a read is pending.
pub struct RealtimeConnection {
    sink: Mutex<Box<dyn FrameSink>>,
    inbound: Mutex<Inbound>,
    state: Mutex<ReconstructionState>,
    closed: AtomicBool,
}

impl std::fmt::Debug for RealtimeConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeConnection")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl RealtimeConnection {
    /// Wrap an already open socket.
    #[must_use]
    pub fn new(sink: impl FrameSink + 'static, source: impl FrameSource + 'static) -> Self {
        Self::from_boxed(Box::new(sink), Box::new(source))
    }

    #[must_use]
    pub fn from_boxed(sink: Box<dyn FrameSink>, source: Box<dyn FrameSource>) -> Self {
        let mut router = EventRouter::new();
        register_handlers(&mut router);
        Self {
            sink: Mutex::new(sink),
            inbound: Mutex::new(Inbound { source, router }),
            state: Mutex::new(ReconstructionState::default()),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send a client event.
    ///
    /// # Errors
    /// Returns an error if the connection is closed, or if serialization or
    /// the socket write fails.
    pub async fn send(&self, event: &ClientEvent) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        let json = serde_json::to_string(event)?;
        tracing::trace!("Sending event: {}", safe_truncate(&json, TRACE_LOG_MAX_BYTES));
        let mut sink = self.sink.lock().await;
        if let Err(err) = sink.send(json).await {
            tracing::error!("Failed to send {} to OpenAI Realtime: {err}", event.kind());
            return Err(err);
        }
        Ok(())
    }

    /// Replay prior turns into a fresh session without asking for a response.
    ///
    /// Tool results become plain user text so they need no matching call in
    /// this session; earlier model function calls are not replayed.
    ///
    /// # Errors
    /// Returns an error if a send fails.
    pub async fn send_history(&self, history: &[Content]) -> Result<()> {
        for content in history {
            let Some(first) = content.first_part() else {
                continue;
            };

            if first.as_function_response().is_some() {
                let outputs: Vec<String> = content
                    .parts
                    .iter()
                    .filter_map(Part::as_function_response)
                    .map(FunctionResponse::output_text)
                    .collect();
                if !outputs.is_empty() {
                    self.send(&ClientEvent::item_create(Item::user_text(outputs))).await?;
                }
                continue;
            }

            let texts: Vec<&str> = content.texts().collect();
            if texts.is_empty() {
                continue;
            }
            let item = match content.role {
                ContentRole::Model => Item::assistant_text(texts),
                ContentRole::User => Item::user_text(texts),
                ContentRole::Server => continue,
            };
            self.send(&ClientEvent::item_create(item)).await?;
        }
        Ok(())
    }

    /// Send a new user turn, or tool results, and ask for a response.
    ///
    /// # Errors
    /// Returns [`Error::EmptyContent`] if `content` has no parts, or an error
    /// if a send fails.
    pub async fn send_content(&self, content: &Content) -> Result<()> {
        let Some(first) = content.first_part() else {
            return Err(Error::EmptyContent);
        };

        if first.as_function_response().is_some() {
            for response in content.parts.iter().filter_map(Part::as_function_response) {
                let call_id = response.id.clone().unwrap_or_else(|| {
                    tracing::warn!("Function response for {} has no call id", response.name);
                    String::new()
                });
                let item = Item::FunctionCallOutput {
                    id: None,
                    call_id,
                    output: response.output_text(),
                };
                self.send(&ClientEvent::item_create(item)).await?;
            }
            tracing::debug!("Trigger response.create after function outputs");
            return self.start_response().await;
        }

        let texts: Vec<&str> = content.texts().collect();
        if texts.is_empty() {
            return Ok(());
        }
        self.send(&ClientEvent::item_create(Item::user_text(texts))).await?;
        tracing::debug!("Trigger response.create after user message");
        self.start_response().await
    }

    /// Stream audio or turn markers.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedRealtimeInput`] for content or non-audio
    /// blobs, [`Error::InvalidClientEvent`] for oversized chunks, or an error if
    /// a send fails. Nothing is sent on a rejected input.
    pub async fn send_realtime(&self, input: RealtimeInput) -> Result<()> {
        match input {
            RealtimeInput::Blob(blob) => {
                if !blob.is_audio() {
                    return Err(Error::UnsupportedRealtimeInput(format!(
                        "blob with mime type {}",
                        blob.mime_type
                    )));
                }
                let size = blob.data.len();
                if size > MAX_INPUT_AUDIO_CHUNK_BYTES {
                    return Err(Error::InvalidClientEvent(format!(
                        "input_audio_buffer.append exceeds 15MB ({size} bytes)",
                    )));
                }
                let audio = general_purpose::STANDARD.encode(&blob.data);
                self.send(&ClientEvent::InputAudioBufferAppend {
                    event_id: None,
                    audio,
                })
                .await
            }
            RealtimeInput::ActivityStart => {
                self.commit_input_audio().await?;
                self.start_response().await
            }
            RealtimeInput::ActivityEnd => self.clear_input_audio().await,
            other @ RealtimeInput::Content(_) => {
                Err(Error::UnsupportedRealtimeInput(other.label().to_string()))
            }
        }
    }

    /// Normalized responses, in arrival order.
    ///
    /// Ends on a graceful close. A transport failure or abnormal close is
    /// yielded once as an `Err`, after which the stream ends.
    pub fn receive(&self) -> BoxStream<'_, Result<LiveResponse>> {
        stream::try_unfold(self, |conn| async move {
            let batch = conn.next_batch().await?;
            Ok::<_, Error>(batch.map(|responses| {
                (stream::iter(responses.into_iter().map(Ok::<_, Error>)), conn)
            }))
        })
        .try_flatten()
        .boxed()
    }

    /// Read frames until one produces responses. `None` once the socket is done.
    async fn next_batch(&self) -> Result<Option<Vec<LiveResponse>>> {
        loop {
            let mut inbound = self.inbound.lock().await;
            let frame = match inbound.source.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => return Ok(None),
                Err(_) if self.is_closed() => return Ok(None),
                Err(err) => {
                    tracing::error!("OpenAI Realtime connection closed unexpectedly: {err}");
                    return Err(err);
                }
            };
            tracing::trace!("Received event: {}", safe_truncate(&frame, TRACE_LOG_MAX_BYTES));

            let value: Value = match serde_json::from_str(&frame) {
                Ok(value) => value,
                Err(err) => {
                    tracing::error!("Invalid JSON from OpenAI Realtime: {err}");
                    continue;
                }
            };

            let event = ServerEvent::parse(value);
            // Dispatch before releasing the source so frames keep arrival order.
            let responses = {
                let mut state = self.state.lock().await;
                inbound.router.dispatch(&mut *state, &event)
            };
            if !responses.is_empty() {
                return Ok(Some(responses));
            }
        }
    }

    /// Close the socket. Only the first call has any effect.
    ///
    /// # Errors
    /// Returns an error if closing the socket fails.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut sink = self.sink.lock().await;
        sink.close().await?;
        tracing::info!("OpenAI Realtime connection closed");
        Ok(())
    }

    /// Function calls whose arguments are still streaming, by item id.
    ///
    /// Does not wait on a pending socket read.
    pub async fn pending_function_calls(&self) -> HashMap<String, PendingFunctionCall> {
        self.state.lock().await.pending_calls.clone()
    }

    // ===== control helpers =====

    /// # Errors
    /// Returns an error if the send fails.
    pub async fn start_response(&self) -> Result<()> {
        self.send(&ClientEvent::response_create()).await
    }

    /// # Errors
    /// Returns an error if the send fails.
    pub async fn cancel_response(&self) -> Result<()> {
        self.send(&ClientEvent::ResponseCancel {
            event_id: None,
            response_id: None,
        })
        .await
    }

    /// # Errors
    /// Returns an error if the send fails.
    pub async fn commit_input_audio(&self) -> Result<()> {
        self.send(&ClientEvent::InputAudioBufferCommit { event_id: None }).await
    }

    /// # Errors
    /// Returns an error if the send fails.
    pub async fn clear_input_audio(&self) -> Result<()> {
        self.send(&ClientEvent::InputAudioBufferClear { event_id: None }).await
    }

    /// # Errors
    /// Returns an error if the send fails.
    pub async fn clear_output_audio(&self) -> Result<()> {
        self.send(&ClientEvent::OutputAudioBufferClear { event_id: None }).await
    }

    /// Push further session settings.
    ///
    /// # Errors
    /// Returns an error if the send fails.
    pub async fn update_session(&self, session: SessionConfigMap) -> Result<()> {
        self.send(&ClientEvent::SessionUpdate {
            event_id: None,
            session,
        })
        .await
    }

    /// # Errors
    /// Returns an error if the send fails.
    pub async fn delete_item(&self, item_id: impl Into<String>) -> Result<()> {
        self.send(&ClientEvent::ConversationItemDelete {
            event_id: None,
            item_id: item_id.into(),
        })
        .await
    }

    /// Cut an assistant audio item at `audio_end_ms`, e.g. after a barge-in.
    ///
    /// # Errors
    /// Returns an error if the send fails.
    pub async fn truncate_item(
        &self,
        item_id: impl Into<String>,
        content_index: u32,
        audio_end_ms: u32,
    ) -> Result<()> {
        self.send(&ClientEvent::ConversationItemTruncate {
            event_id: None,
            item_id: item_id.into(),
            content_index,
            audio_end_ms,
        })
        .await
    }
}
