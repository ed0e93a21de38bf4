use serde::{Deserialize, Serialize};

use super::common::or_default;
use super::{ArbitraryJson, Item, Metadata};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    InProgress,
    Completed,
    Cancelled,
    Failed,
    Incomplete,
    #[serde(other)]
    Unknown,
}

/// Response object carried by `response.created` / `response.done`.
///
/// Every field tolerates `null` or an unexpected shape, so the event itself
/// always parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    #[serde(deserialize_with = "or_default")]
    pub id: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub object: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub status: Option<ResponseStatus>,
    #[serde(deserialize_with = "or_default")]
    pub status_details: Option<ResponseStatusDetails>,
    #[serde(deserialize_with = "or_default")]
    pub output: Vec<Item>,
    /// Free-form metadata for the response.
    #[serde(deserialize_with = "or_default")]
    pub metadata: Option<Metadata>,
    /// Token usage exactly as the provider reported it.
    #[serde(deserialize_with = "or_default")]
    pub usage: Option<ArbitraryJson>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResponseStatusDetails {
    #[serde(deserialize_with = "or_default")]
    pub reason: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub error: Option<crate::error::ServerError>,
}
