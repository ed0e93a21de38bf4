mod common;

use std::time::Duration;

use common::{ScriptedSource, connection};
use futures::StreamExt;
use oai_rt_bridge::live::response::{SPEECH_START, TTS_END};
use oai_rt_bridge::{
    Blob, Content, ContentRole, Error, FunctionCall, FunctionResponse, LiveResponse, Part,
    RealtimeInput,
};
use serde_json::json;

async fn collect(conn: &oai_rt_bridge::RealtimeConnection) -> Vec<LiveResponse> {
    conn.receive()
        .map(|item| item.expect("stream item"))
        .collect()
        .await
}

#[tokio::test]
async fn text_deltas_then_done() {
    let (conn, _) = connection(ScriptedSource::frames([
        json!({ "type": "response.output_text.delta", "delta": "He" }),
        json!({ "type": "response.output_text.delta", "delta": "llo" }),
        json!({ "type": "response.output_text.done", "text": "Hello" }),
    ]));

    let out = collect(&conn).await;
    assert_eq!(out.len(), 3);
    assert_eq!((out[0].text(), out[0].partial), (Some("He"), true));
    assert_eq!((out[1].text(), out[1].partial), (Some("llo"), true));
    assert_eq!((out[2].text(), out[2].partial), (Some("Hello"), false));
    assert!(out.iter().all(|r| r.content.as_ref().unwrap().role == ContentRole::Model));
}

#[tokio::test]
async fn empty_deltas_are_suppressed() {
    let (conn, _) = connection(ScriptedSource::frames([
        json!({ "type": "response.text.delta", "delta": "" }),
        json!({ "type": "response.text.done", "text": "" }),
    ]));
    assert!(collect(&conn).await.is_empty());
}

#[tokio::test]
async fn streamed_function_call_is_emitted_once() {
    let (conn, _) = connection(ScriptedSource::frames([
        json!({
            "type": "response.output_item.added",
            "item": {
                "type": "function_call", "id": "1", "call_id": "call_1",
                "name": "lookup", "arguments": "{\"q\":"
            }
        }),
        json!({ "type": "response.function_call_arguments.delta", "item_id": "1", "delta": "\"x\"}" }),
        json!({
            "type": "response.output_item.done",
            "item": { "type": "function_call", "id": "1", "call_id": "call_1", "name": "lookup" }
        }),
    ]));

    let out = collect(&conn).await;
    assert_eq!(out.len(), 1);
    let content = out[0].content.as_ref().unwrap();
    assert_eq!(content.role, ContentRole::Model);
    let Part::FunctionCall(FunctionCall { id, name, args }) = &content.parts[0] else {
        panic!("expected a function call, got {:?}", content.parts[0]);
    };
    assert_eq!(name, "lookup");
    assert_eq!(id.as_deref(), Some("call_1"));
    assert_eq!(serde_json::Value::Object(args.clone()), json!({ "q": "x" }));
    assert!(!conn.pending_function_calls().await.contains_key("1"));
}

#[tokio::test]
async fn arguments_for_unknown_item_are_ignored() {
    let (conn, _) = connection(ScriptedSource::frames([
        json!({ "type": "response.function_call_arguments.delta", "item_id": "nope", "delta": "{}" }),
        json!({ "type": "response.function_call_arguments.done", "item_id": "nope", "arguments": "{}" }),
    ]));
    assert!(collect(&conn).await.is_empty());
    assert!(conn.pending_function_calls().await.is_empty());
}

#[tokio::test]
async fn unrecognized_events_produce_nothing() {
    let (conn, _) = connection(ScriptedSource::frames([
        json!({ "type": "response.mcp_call.completed", "item_id": "m" }),
        json!({ "type": "session.created", "session": { "id": "s" } }),
        json!({ "type": "response.output_audio.done", "item_id": "a" }),
    ]));
    assert!(collect(&conn).await.is_empty());
}

#[tokio::test]
async fn malformed_frame_is_skipped() {
    let source = ScriptedSource::default()
        .raw("{not json")
        .then(json!({ "type": "input_audio_buffer.speech_started" }))
        .then(json!({ "type": "output_audio_buffer.stopped" }));
    let (conn, _) = connection(source);

    let out = collect(&conn).await;
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].signal_name(), Some(SPEECH_START));
    assert_eq!(out[1].signal_name(), Some(TTS_END));
}

#[tokio::test]
async fn error_event_without_code_uses_default() {
    let (conn, _) = connection(ScriptedSource::frames([
        json!({ "type": "error", "error": { "type": "invalid_request_error", "message": "bad" } }),
        json!({ "type": "error", "error": { "code": "rate_limited", "message": "slow down" } }),
    ]));

    let out = collect(&conn).await;
    assert_eq!(out[0].error_code.as_deref(), Some("OPENAI_ERROR"));
    assert_eq!(out[0].error_message.as_deref(), Some("bad"));
    assert_eq!(out[1].error_code.as_deref(), Some("rate_limited"));
    assert!(!conn.is_closed());
}

#[tokio::test]
async fn odd_done_and_error_bodies_still_produce_responses() {
    let (conn, _) = connection(ScriptedSource::frames([
        json!({ "type": "response.done", "response": { "status": "completed", "output": null } }),
        json!({ "type": "error", "error": { "code": 500, "message": "boom" } }),
    ]));

    let out = collect(&conn).await;
    assert_eq!(out.len(), 2);
    assert!(out[0].turn_complete);
    assert_eq!(out[1].error_code.as_deref(), Some("500"));
    assert_eq!(out[1].error_message.as_deref(), Some("boom"));
}

#[tokio::test]
async fn pending_calls_readable_while_read_is_pending() {
    let source = ScriptedSource::frames([json!({
        "type": "response.output_item.added",
        "item": { "type": "function_call", "id": "1", "call_id": "call_1", "name": "lookup" }
    })])
    .stall();
    let (conn, _) = connection(source);

    let mut stream = conn.receive();
    let read = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
    assert!(read.is_err(), "the source should still be waiting");

    let pending = tokio::time::timeout(Duration::from_secs(1), conn.pending_function_calls())
        .await
        .expect("accessor must not wait on the socket");
    assert_eq!(pending["1"].name, "lookup");
}

#[tokio::test]
async fn abnormal_close_surfaces_as_error() {
    let source = ScriptedSource::frames([json!({ "type": "response.text.delta", "delta": "a" })])
        .abnormal_close(1011, "internal error")
        .then(json!({ "type": "response.text.delta", "delta": "never" }));
    let (conn, _) = connection(source);

    let items: Vec<_> = conn.receive().collect().await;
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    match &items[1] {
        Err(Error::ConnectionClosedAbnormally { code, .. }) => assert_eq!(*code, 1011),
        other => panic!("unexpected item: {other:?}"),
    }
}

#[tokio::test]
async fn graceful_close_ends_stream() {
    let (conn, _) = connection(ScriptedSource::frames([
        json!({ "type": "response.done", "response": { "status": "completed" } }),
    ]));
    let items: Vec<_> = conn.receive().collect().await;
    assert_eq!(items.len(), 1);
    assert!(items[0].as_ref().unwrap().turn_complete);
}

#[tokio::test]
async fn send_content_requires_parts() {
    let (conn, sink) = connection(ScriptedSource::default());
    let err = conn
        .send_content(&Content::new(ContentRole::User, Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyContent));
    assert!(sink.frames().is_empty());
}

#[tokio::test]
async fn send_content_text_starts_response() {
    let (conn, sink) = connection(ScriptedSource::default());
    let content = Content::new(
        ContentRole::User,
        vec![Part::text("Hi"), Part::text(""), Part::text("there")],
    );
    conn.send_content(&content).await.unwrap();

    let frames = sink.frames();
    assert_eq!(sink.types(), ["conversation.item.create", "response.create"]);
    assert_eq!(
        frames[0]["item"],
        json!({
            "type": "message",
            "role": "user",
            "content": [
                { "type": "input_text", "text": "Hi" },
                { "type": "input_text", "text": "there" }
            ]
        })
    );
}

#[tokio::test]
async fn send_content_without_text_sends_nothing() {
    let (conn, sink) = connection(ScriptedSource::default());
    let content = Content::new(ContentRole::User, vec![Part::InlineData(Blob::pcm(vec![1]))]);
    conn.send_content(&content).await.unwrap();
    assert!(sink.frames().is_empty());
}

#[tokio::test]
async fn send_content_function_responses() {
    let (conn, sink) = connection(ScriptedSource::default());
    let content = Content::new(
        ContentRole::User,
        vec![
            Part::FunctionResponse(FunctionResponse {
                id: Some("call_1".into()),
                name: "lookup".into(),
                response: json!({ "result": 42 }),
            }),
            Part::FunctionResponse(FunctionResponse {
                id: Some("call_2".into()),
                name: "lookup".into(),
                response: json!("plain"),
            }),
        ],
    );
    conn.send_content(&content).await.unwrap();

    let frames = sink.frames();
    assert_eq!(
        sink.types(),
        ["conversation.item.create", "conversation.item.create", "response.create"]
    );
    assert_eq!(frames[0]["item"]["type"], "function_call_output");
    assert_eq!(frames[0]["item"]["call_id"], "call_1");
    assert_eq!(frames[0]["item"]["output"], "{\"result\":42}");
    assert_eq!(frames[1]["item"]["output"], "\"plain\"");
}

#[tokio::test]
async fn history_replay() {
    let (conn, sink) = connection(ScriptedSource::default());
    let history = vec![
        Content::new(ContentRole::User, vec![Part::text("one"), Part::text("two")]),
        Content::new(
            ContentRole::Model,
            vec![Part::FunctionCall(FunctionCall {
                id: Some("call_1".into()),
                name: "lookup".into(),
                args: serde_json::Map::new(),
            })],
        ),
        Content::new(
            ContentRole::User,
            vec![Part::FunctionResponse(FunctionResponse {
                id: Some("call_1".into()),
                name: "lookup".into(),
                response: json!({ "ok": true }),
            })],
        ),
        Content::new(
            ContentRole::Model,
            vec![
                Part::FunctionCall(FunctionCall {
                    id: Some("call_2".into()),
                    name: "lookup".into(),
                    args: serde_json::Map::new(),
                }),
                Part::text("x"),
            ],
        ),
        Content::model_text("Done."),
        Content::new(ContentRole::User, Vec::new()),
        Content::server_text(SPEECH_START),
    ];
    conn.send_history(&history).await.unwrap();

    let frames = sink.frames();
    assert_eq!(frames.len(), 4);
    assert!(sink.types().iter().all(|t| t == "conversation.item.create"));
    assert_eq!(
        frames[0]["item"]["content"],
        json!([
            { "type": "input_text", "text": "one" },
            { "type": "input_text", "text": "two" }
        ])
    );
    assert_eq!(frames[1]["item"]["role"], "user");
    assert_eq!(frames[1]["item"]["content"][0]["text"], "{\"ok\":true}");
    assert_eq!(frames[2]["item"]["role"], "assistant");
    assert_eq!(frames[2]["item"]["content"], json!([{ "type": "text", "text": "x" }]));
    assert_eq!(frames[3]["item"]["role"], "assistant");
    assert_eq!(frames[3]["item"]["content"][0], json!({ "type": "text", "text": "Done." }));
    assert!(frames.iter().all(|f| f["item"]["type"] == "message"));
}

#[tokio::test]
async fn realtime_audio_and_activity() {
    let (conn, sink) = connection(ScriptedSource::default());
    conn.send_realtime(RealtimeInput::Blob(Blob::pcm(vec![0, 1, 2])))
        .await
        .unwrap();
    conn.send_realtime(RealtimeInput::ActivityStart).await.unwrap();
    conn.send_realtime(RealtimeInput::ActivityEnd).await.unwrap();

    let frames = sink.frames();
    assert_eq!(frames[0], json!({ "type": "input_audio_buffer.append", "audio": "AAEC" }));
    assert_eq!(
        sink.types()[1..],
        ["input_audio_buffer.commit", "response.create", "input_audio_buffer.clear"]
    );
}

#[tokio::test]
async fn unsupported_realtime_input_sends_nothing() {
    let (conn, sink) = connection(ScriptedSource::default());

    let err = conn
        .send_realtime(RealtimeInput::Content(Content::user_text("hi")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedRealtimeInput(_)));

    let image = Blob { mime_type: "image/png".into(), data: vec![1, 2, 3] };
    let err = conn.send_realtime(RealtimeInput::Blob(image)).await.unwrap_err();
    assert!(err.to_string().contains("image/png"));

    assert!(sink.frames().is_empty());
}

#[tokio::test]
async fn oversized_audio_chunk_is_rejected() {
    let (conn, sink) = connection(ScriptedSource::default());
    let chunk = Blob::pcm(vec![0; oai_rt_bridge::MAX_INPUT_AUDIO_CHUNK_BYTES + 1]);
    let err = conn.send_realtime(RealtimeInput::Blob(chunk)).await.unwrap_err();
    assert!(matches!(err, Error::InvalidClientEvent(_)));
    assert!(sink.frames().is_empty());
}

#[tokio::test]
async fn close_is_idempotent() {
    let (conn, sink) = connection(ScriptedSource::default());
    conn.close().await.unwrap();
    conn.close().await.unwrap();
    assert_eq!(sink.close_count(), 1);
    assert!(conn.is_closed());

    let err = conn.start_response().await.unwrap_err();
    assert!(matches!(err, Error::ConnectionClosed));
    assert!(sink.frames().is_empty());
}

#[tokio::test]
async fn control_helpers_send_single_frames() {
    let (conn, sink) = connection(ScriptedSource::default());
    conn.cancel_response().await.unwrap();
    conn.clear_output_audio().await.unwrap();
    conn.update_session(serde_json::Map::from_iter([("voice".to_string(), json!("alloy"))]))
        .await
        .unwrap();
    conn.delete_item("item_1").await.unwrap();
    conn.truncate_item("item_2", 0, 1500).await.unwrap();

    assert_eq!(
        sink.types(),
        [
            "response.cancel",
            "output_audio_buffer.clear",
            "session.update",
            "conversation.item.delete",
            "conversation.item.truncate"
        ]
    );
    let frames = sink.frames();
    assert_eq!(frames[2]["session"], json!({ "voice": "alloy" }));
    assert_eq!(
        frames[4],
        json!({
            "type": "conversation.item.truncate",
            "item_id": "item_2",
            "content_index": 0,
            "audio_end_ms": 1500
        })
    );
}
