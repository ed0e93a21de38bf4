use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_tungstenite::tungstenite::http::header::{InvalidHeaderName, InvalidHeaderValue};

use crate::protocol::models::common::{or_default, string_or_number};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    RateLimitError,
    AuthenticationError,
    ServerError,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Error payload carried by a server `error` event.
///
/// Every field is optional; the provider omits `code` for many failures.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ServerError {
    #[serde(rename = "type", deserialize_with = "or_default")]
    pub error_type: ApiErrorType,
    /// Usually a string; numeric codes are kept as their decimal text.
    #[serde(deserialize_with = "string_or_number")]
    pub code: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub message: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub param: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub event_id: Option<String>,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Failed to parse or serialize JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Header error: {0}")]
    Header(#[from] InvalidHeaderValue),

    #[error("Header name error: {0}")]
    HeaderName(#[from] InvalidHeaderName),

    #[error("The connection is closed")]
    ConnectionClosed,

    #[error("The connection was closed unexpectedly (code {code}): {reason}")]
    ConnectionClosedAbnormally { code: u16, reason: String },

    #[error("Content must contain at least one part")]
    EmptyContent,

    #[error("Unsupported realtime input: {0}")]
    UnsupportedRealtimeInput(String),

    #[error("Invalid client event: {0}")]
    InvalidClientEvent(String),
}

pub type Result<T> = std::result::Result<T, Error>;
