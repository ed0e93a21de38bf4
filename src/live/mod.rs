//! Bridge between the runtime's live-conversation model and a realtime session.
//!
//! [`RealtimeBridge`] opens sessions; each yields a [`RealtimeConnection`] that
//! accepts [`Content`] and [`RealtimeInput`] and streams back
//! [`LiveResponse`] records.

mod bridge;
pub mod config;
mod connection;
pub mod content;
pub mod reconstruct;
mod request;
pub mod response;
pub mod router;
pub mod tools;

pub use bridge::{API_KEY_ENV, RealtimeBridge, RealtimeBridgeBuilder};
pub use config::{OverrideProvider, RealtimeContext, build_session_config, deep_merge};
pub use connection::RealtimeConnection;
pub use content::{Blob, Content, ContentRole, FunctionCall, FunctionResponse, Part};
pub use reconstruct::PendingFunctionCall;
pub use request::{LiveRequest, RealtimeInput};
pub use response::LiveResponse;
pub use router::EventRouter;
pub use tools::{FunctionDeclaration, Schema, SchemaType, ToolDeclaration};
