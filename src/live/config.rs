//! Layered session configuration for the initial `session.update`.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::request::LiveRequest;
use super::tools::function_tools_to_session_tools;
use crate::Result;
use crate::protocol::SessionConfigMap;
use crate::protocol::models::ToolChoice;

/// Produces session overrides for a request. Set once on the bridge.
pub type OverrideProvider = Arc<dyn Fn(&LiveRequest) -> Option<SessionConfigMap> + Send + Sync>;

/// Per-connection runtime hints, merged over the provider overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RealtimeContext {
    pub hints: SessionConfigMap,
}

impl RealtimeContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_hint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.hints.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

impl From<SessionConfigMap> for RealtimeContext {
    fn from(hints: SessionConfigMap) -> Self {
        Self { hints }
    }
}

/// Recursively merge `extra` into `base`.
///
/// Nested objects merge key by key. A `null` in `extra` is skipped, so it never
/// removes a value set by an earlier layer; any other value replaces.
pub fn deep_merge(base: &mut SessionConfigMap, extra: &SessionConfigMap) {
    for (key, value) in extra {
        if value.is_null() {
            continue;
        }
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Build the `session` payload for the handshake `session.update`.
///
/// Layers, in order: provider overrides, runtime hints, a default
/// `tool_choice` of `auto`, the system instruction, then the request's tools.
///
/// # Errors
/// Returns an error if the tool list cannot be serialized.
#[allow(clippy::result_large_err)]
pub fn build_session_config(
    request: &LiveRequest,
    overrides: Option<&OverrideProvider>,
    context: Option<&RealtimeContext>,
) -> Result<SessionConfigMap> {
    let mut session = SessionConfigMap::new();

    if let Some(provider_overrides) = overrides.and_then(|provider| provider(request)) {
        let logged = Value::Object(provider_overrides.clone());
        tracing::info!("OpenAI Realtime provider overrides: {logged}");
        deep_merge(&mut session, &provider_overrides);
    }

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        let logged = Value::Object(context.hints.clone());
        tracing::info!("OpenAI Realtime runtime context: {logged}");
        deep_merge(&mut session, &context.hints);
    }

    if !session.contains_key("tool_choice") {
        session.insert("tool_choice".into(), serde_json::to_value(ToolChoice::default())?);
    }

    if let Some(instructions) = request.system_instruction.as_deref().filter(|s| !s.is_empty()) {
        session.insert("instructions".into(), instructions.into());
    }

    let tools = function_tools_to_session_tools(&request.tools);
    if !tools.is_empty() {
        session.insert("tools".into(), serde_json::to_value(&tools)?);
    }

    Ok(session)
}

/// Debug view of an override provider.
pub(crate) struct ProviderDebug<'a>(pub &'a Option<OverrideProvider>);

impl fmt::Debug for ProviderDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() { "Some(<fn>)" } else { "None" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::tools::{FunctionDeclaration, ToolDeclaration};
    use serde_json::json;

    fn map(value: Value) -> SessionConfigMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn deep_merge_skips_null_and_keeps_siblings() {
        let mut base = map(json!({ "a": { "b": 1, "c": 2 } }));
        deep_merge(&mut base, &map(json!({ "a": { "b": null, "d": 3 } })));
        assert_eq!(Value::Object(base), json!({ "a": { "b": 1, "c": 2, "d": 3 } }));
    }

    #[test]
    fn deep_merge_replaces_non_objects() {
        let mut base = map(json!({ "voice": "alloy", "audio": { "rate": 16000 } }));
        deep_merge(&mut base, &map(json!({ "voice": "verse", "audio": "off" })));
        assert_eq!(Value::Object(base), json!({ "voice": "verse", "audio": "off" }));
    }

    #[test]
    fn top_level_null_does_not_delete() {
        let mut base = map(json!({ "voice": "alloy" }));
        deep_merge(&mut base, &map(json!({ "voice": null })));
        assert_eq!(base["voice"], "alloy");
    }

    #[test]
    fn layers_apply_in_order() {
        let provider: OverrideProvider = Arc::new(|_req: &LiveRequest| {
            Some(map(json!({ "voice": "alloy", "audio": { "input": { "format": "pcm16" } } })))
        });
        let context = RealtimeContext::new()
            .with_hint("voice", json!("verse"))
            .with_hint("audio", json!({ "output": { "speed": 1.1 } }));
        let request = LiveRequest::new()
            .with_system_instruction("Be brief.")
            .with_tool(ToolDeclaration::functions(vec![FunctionDeclaration::new("lookup")]));

        let session = build_session_config(&request, Some(&provider), Some(&context)).unwrap();

        assert_eq!(session["voice"], "verse");
        assert_eq!(
            session["audio"],
            json!({ "input": { "format": "pcm16" }, "output": { "speed": 1.1 } })
        );
        assert_eq!(session["tool_choice"], "auto");
        assert_eq!(session["instructions"], "Be brief.");
        assert_eq!(session["tools"][0]["name"], "lookup");
    }

    #[test]
    fn explicit_tool_choice_is_kept() {
        let context = RealtimeContext::new().with_hint("tool_choice", json!("required"));
        let session = build_session_config(&LiveRequest::new(), None, Some(&context)).unwrap();
        assert_eq!(session["tool_choice"], "required");
    }

    #[test]
    fn bare_request_only_sets_tool_choice() {
        let session = build_session_config(&LiveRequest::new(), None, None).unwrap();
        assert_eq!(Value::Object(session), json!({ "tool_choice": "auto" }));
    }
}
