use super::content::{Blob, Content};
use super::tools::ToolDeclaration;

/// What the runtime asks for when it opens a live session.
#[derive(Debug, Clone, Default)]
pub struct LiveRequest {
    /// Model override; the bridge's configured model is used when `None`.
    pub model: Option<String>,
    pub system_instruction: Option<String>,
    pub tools: Vec<ToolDeclaration>,
    /// Extra handshake headers, sent as given.
    pub headers: Vec<(String, String)>,
}

impl LiveRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn with_tool(mut self, tool: ToolDeclaration) -> Self {
        self.tools.push(tool);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Streaming input for [`send_realtime`](super::RealtimeConnection::send_realtime).
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeInput {
    /// A chunk of input audio.
    Blob(Blob),
    /// Client-managed turn start: commit buffered audio and ask for a response.
    ActivityStart,
    /// Client-managed turn end: discard buffered audio.
    ActivityEnd,
    /// Turn content; not accepted as realtime input.
    Content(Content),
}

impl RealtimeInput {
    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::Blob(_) => "blob",
            Self::ActivityStart => "activity_start",
            Self::ActivityEnd => "activity_end",
            Self::Content(_) => "content",
        }
    }
}
