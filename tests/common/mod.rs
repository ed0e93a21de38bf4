#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oai_rt_bridge::{Error, FrameSink, FrameSource, RealtimeConnection, Result};
use serde_json::Value;

/// Sink that records every frame it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl RecordingSink {
    pub fn frames(&self) -> Vec<Value> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|frame| serde_json::from_str(frame).unwrap())
            .collect()
    }

    pub fn types(&self) -> Vec<String> {
        self.frames()
            .iter()
            .map(|frame| frame["type"].as_str().unwrap().to_string())
            .collect()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn send(&mut self, frame: String) -> Result<()> {
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub enum Step {
    Frame(String),
    AbnormalClose(u16, String),
    /// Never yields, like an idle socket.
    Stall,
}

/// Source that plays back a fixed script, then closes gracefully.
#[derive(Default)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
}

impl ScriptedSource {
    pub fn frames<I: IntoIterator<Item = Value>>(frames: I) -> Self {
        Self {
            steps: frames.into_iter().map(|v| Step::Frame(v.to_string())).collect(),
        }
    }

    pub fn raw(mut self, frame: &str) -> Self {
        self.steps.push_back(Step::Frame(frame.to_string()));
        self
    }

    pub fn then(mut self, frame: Value) -> Self {
        self.steps.push_back(Step::Frame(frame.to_string()));
        self
    }

    pub fn stall(mut self) -> Self {
        self.steps.push_back(Step::Stall);
        self
    }

    pub fn abnormal_close(mut self, code: u16, reason: &str) -> Self {
        self.steps.push_back(Step::AbnormalClose(code, reason.to_string()));
        self
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn next_frame(&mut self) -> Result<Option<String>> {
        match self.steps.pop_front() {
            Some(Step::Frame(frame)) => Ok(Some(frame)),
            Some(Step::AbnormalClose(code, reason)) => {
                Err(Error::ConnectionClosedAbnormally { code, reason })
            }
            Some(Step::Stall) => futures::future::pending().await,
            None => Ok(None),
        }
    }
}

pub fn connection(source: ScriptedSource) -> (RealtimeConnection, RecordingSink) {
    let sink = RecordingSink::default();
    (RealtimeConnection::new(sink.clone(), source), sink)
}
