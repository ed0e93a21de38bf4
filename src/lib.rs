#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

pub mod error;
pub mod live;
pub mod protocol;
pub mod transport;

pub use error::{Error, Result};
pub use live::{
    Blob, Content, ContentRole, FunctionCall, FunctionDeclaration, FunctionResponse, LiveRequest,
    LiveResponse, Part, RealtimeBridge, RealtimeBridgeBuilder, RealtimeConnection,
    RealtimeContext, RealtimeInput, Schema, SchemaType, ToolDeclaration,
};
pub use protocol::client_events::ClientEvent;
pub use protocol::server_events::ServerEvent;
pub use protocol::{ClientEventKind, ServerEventKind, SessionConfigMap};
pub use transport::{FrameSink, FrameSource};

pub(crate) const TRACE_LOG_MAX_BYTES: usize = 1024;
/// Provider limit for one `input_audio_buffer.append` chunk, in decoded bytes.
pub const MAX_INPUT_AUDIO_CHUNK_BYTES: usize = 15 * 1024 * 1024;
const TRACE_TRUNCATE_SUFFIX: &str = "... (truncated)";

pub(crate) fn safe_truncate(s: &str, max_bytes: usize) -> std::borrow::Cow<'_, str> {
    if s.len() <= max_bytes {
        return std::borrow::Cow::Borrowed(s);
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    std::borrow::Cow::Owned(format!(
        "{} {} {} bytes",
        &s[..end],
        TRACE_TRUNCATE_SUFFIX,
        s.len() - end
    ))
}
