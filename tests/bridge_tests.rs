mod common;

use common::{RecordingSink, ScriptedSource};
use oai_rt_bridge::{
    FunctionDeclaration, LiveRequest, RealtimeBridge, RealtimeContext, Schema, SchemaType,
    ToolDeclaration,
};
use serde_json::json;

fn weather_request() -> LiveRequest {
    let parameters = Schema::of(SchemaType::Object)
        .with_property("city", Schema::of(SchemaType::String))
        .with_required(["city"]);
    LiveRequest::new()
        .with_system_instruction("Be brief.")
        .with_tool(ToolDeclaration::functions(vec![
            FunctionDeclaration::new("weather")
                .with_description("Current weather")
                .with_parameters(parameters),
        ]))
}

#[tokio::test]
async fn attach_sends_initial_session_update() {
    let bridge = RealtimeBridge::builder().build();
    let sink = RecordingSink::default();

    let conn = bridge
        .attach(sink.clone(), ScriptedSource::default(), &weather_request(), None)
        .await
        .unwrap();
    assert!(!conn.is_closed());

    let frames = sink.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(
        frames[0],
        json!({
            "type": "session.update",
            "session": {
                "tool_choice": "auto",
                "instructions": "Be brief.",
                "tools": [{
                    "type": "function",
                    "name": "weather",
                    "description": "Current weather",
                    "parameters": {
                        "type": "object",
                        "properties": { "city": { "type": "string" } },
                        "required": ["city"]
                    }
                }]
            }
        })
    );
}

#[tokio::test]
async fn overrides_and_context_are_layered() {
    let bridge = RealtimeBridge::builder()
        .session_overrides(|_| {
            match json!({
                "voice": "alloy",
                "audio": { "input": { "format": { "type": "audio/pcm", "rate": 24000 } } },
                "tool_choice": "required"
            }) {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            }
        })
        .build();
    let context = RealtimeContext::new()
        .with_hint("voice", json!("verse"))
        .with_hint("audio", json!({ "input": { "turn_detection": null } }));

    let sink = RecordingSink::default();
    bridge
        .attach(sink.clone(), ScriptedSource::default(), &LiveRequest::new(), Some(&context))
        .await
        .unwrap();

    let session = &sink.frames()[0]["session"];
    assert_eq!(session["voice"], "verse");
    assert_eq!(session["tool_choice"], "required");
    assert_eq!(session["audio"]["input"]["format"]["rate"], 24000);
    assert!(session["audio"]["input"].get("turn_detection").is_none());
    assert!(session.get("instructions").is_none());
    assert!(session.get("tools").is_none());
}

#[test]
fn session_config_matches_handshake_payload() {
    let bridge = RealtimeBridge::builder().model("gpt-realtime-mini").build();
    let config = bridge.session_config(&weather_request(), None).unwrap();
    assert_eq!(config["tool_choice"], "auto");
    assert_eq!(config["tools"][0]["name"], "weather");
    assert_eq!(bridge.model(), "gpt-realtime-mini");
}
