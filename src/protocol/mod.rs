//! Wire protocol of the OpenAI Realtime API, as far as the bridge speaks it.

pub mod client_events;
pub mod event_types;
pub mod models;
pub mod server_events;

pub use client_events::{ClientEvent, SessionConfigMap};
pub use event_types::{ClientEventKind, ServerEventKind};
pub use server_events::ServerEvent;
