//! Scripted fakes for unit tests
//!
//! `ScriptedTransport` answers from queued replies and records every request;
//! `RecordingSleeper` records requested suspensions without waiting.

use crate::http::{Sleeper, Transport, TransportError, TransportResponse};
use crate::types::{JsonValue, StringMap};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Reply = std::result::Result<TransportResponse, TransportError>;

/// A request seen by the scripted transport
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub uri: String,
    pub body: Option<JsonValue>,
    pub query: Vec<(String, String)>,
    pub headers: StringMap,
}

#[derive(Default)]
struct Script {
    posts: VecDeque<Reply>,
    gets: VecDeque<Reply>,
    sent_posts: Vec<SentRequest>,
    sent_gets: Vec<SentRequest>,
}

#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply for the next POST
    pub fn post_json_reply(&self, body: JsonValue) -> &Self {
        self.post_reply(Ok(TransportResponse::new(200, body.to_string())))
    }

    pub fn post_reply(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().posts.push_back(reply);
        self
    }

    /// Queue a JSON reply for the next GET
    pub fn get_json_reply(&self, body: JsonValue) -> &Self {
        self.get_reply(Ok(TransportResponse::new(200, body.to_string())))
    }

    pub fn get_reply(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().gets.push_back(reply);
        self
    }

    pub fn posts(&self) -> Vec<SentRequest> {
        self.script.lock().unwrap().sent_posts.clone()
    }

    pub fn gets(&self) -> Vec<SentRequest> {
        self.script.lock().unwrap().sent_gets.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, uri: &str, body: &JsonValue, headers: &StringMap) -> Reply {
        let mut script = self.script.lock().unwrap();
        script.sent_posts.push(SentRequest {
            uri: uri.to_string(),
            body: Some(body.clone()),
            query: Vec::new(),
            headers: headers.clone(),
        });
        script
            .posts
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected POST to {uri}"))
    }

    async fn get_query(&self, uri: &str, query: &[(&str, &str)], headers: &StringMap) -> Reply {
        let mut script = self.script.lock().unwrap();
        script.sent_gets.push(SentRequest {
            uri: uri.to_string(),
            body: None,
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            headers: headers.clone(),
        });
        script
            .gets
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected GET to {uri}"))
    }
}

#[derive(Clone, Default)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}
