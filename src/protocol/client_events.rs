use serde::{Deserialize, Serialize};

use super::event_types::ClientEventKind;
use super::models::{ArbitraryJson, Item};

/// Session settings as sent in `session.update`.
///
/// Kept as an open JSON object: callers layer provider overrides on top of the
/// fields the bridge fills in, and the provider accepts keys this crate does
/// not model.
pub type SessionConfigMap = serde_json::Map<String, ArbitraryJson>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        session: SessionConfigMap,
    },
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        previous_item_id: Option<String>,
        item: Box<Item>,
    },
    #[serde(rename = "conversation.item.delete")]
    ConversationItemDelete {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        item_id: String,
    },
    #[serde(rename = "conversation.item.truncate")]
    ConversationItemTruncate {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        item_id: String,
        content_index: u32,
        audio_end_ms: u32,
    },
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        /// Base64-encoded audio bytes.
        audio: String,
    },
    #[serde(rename = "input_audio_buffer.commit")]
    InputAudioBufferCommit {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
    },
    #[serde(rename = "input_audio_buffer.clear")]
    InputAudioBufferClear {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
    },
    #[serde(rename = "response.create")]
    ResponseCreate {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<ArbitraryJson>,
    },
    #[serde(rename = "response.cancel")]
    ResponseCancel {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        response_id: Option<String>,
    },
    #[serde(rename = "output_audio_buffer.clear")]
    OutputAudioBufferClear {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
    },
}

impl ClientEvent {
    #[must_use]
    pub const fn kind(&self) -> ClientEventKind {
        match self {
            Self::SessionUpdate { .. } => ClientEventKind::SessionUpdate,
            Self::ConversationItemCreate { .. } => ClientEventKind::ConversationItemCreate,
            Self::ConversationItemDelete { .. } => ClientEventKind::ConversationItemDelete,
            Self::ConversationItemTruncate { .. } => ClientEventKind::ConversationItemTruncate,
            Self::InputAudioBufferAppend { .. } => ClientEventKind::InputAudioBufferAppend,
            Self::InputAudioBufferCommit { .. } => ClientEventKind::InputAudioBufferCommit,
            Self::InputAudioBufferClear { .. } => ClientEventKind::InputAudioBufferClear,
            Self::ResponseCreate { .. } => ClientEventKind::ResponseCreate,
            Self::ResponseCancel { .. } => ClientEventKind::ResponseCancel,
            Self::OutputAudioBufferClear { .. } => ClientEventKind::OutputAudioBufferClear,
        }
    }

    /// Create a conversation item with no ordering hint.
    #[must_use]
    pub fn item_create(item: Item) -> Self {
        Self::ConversationItemCreate {
            event_id: None,
            previous_item_id: None,
            item: Box::new(item),
        }
    }

    #[must_use]
    pub const fn response_create() -> Self {
        Self::ResponseCreate {
            event_id: None,
            response: None,
        }
    }
}
