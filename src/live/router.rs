use std::collections::HashMap;

use super::response::LiveResponse;
use crate::protocol::{ServerEvent, ServerEventKind};

pub type EventHandler<S> = Box<dyn Fn(&mut S, &ServerEvent) -> Vec<LiveResponse> + Send + Sync>;

/// Dispatch table from inbound event kind to handler.
///
/// Handlers mutate a per-connection state `S`. Each kind has at most one
/// handler; registering again replaces it.
pub struct EventRouter<S> {
    handlers: HashMap<ServerEventKind, EventHandler<S>>,
}

impl<S> Default for EventRouter<S> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<S> EventRouter<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, kind: ServerEventKind, handler: F)
    where
        F: Fn(&mut S, &ServerEvent) -> Vec<LiveResponse> + Send + Sync + 'static,
    {
        if self.handlers.insert(kind, Box::new(handler)).is_some() {
            tracing::debug!("Replaced handler for {kind}");
        }
    }

    #[must_use]
    pub fn is_registered(&self, kind: ServerEventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Run the handler for `event`; unknown events and kinds without a
    /// handler produce nothing.
    pub fn dispatch(&self, state: &mut S, event: &ServerEvent) -> Vec<LiveResponse> {
        event
            .kind()
            .and_then(|kind| self.handlers.get(&kind))
            .map_or_else(Vec::new, |handler| handler(state, event))
    }
}

impl<S> std::fmt::Debug for EventRouter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
