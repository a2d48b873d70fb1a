//! Shared test infrastructure for the sync engine tests.
//!
//! `ScriptedTransport` replays queued replies in order and records every
//! request it was asked to send. Once the queue is empty it behaves like an
//! unreachable server.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::oneshot;
use todo_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, MemoryMirror, MirrorStore, Todo, TodoClient, TodoSync, Transport};

pub const BASE_URL: &str = "http://localhost:8000/api";

struct Scripted {
    gate: Option<oneshot::Receiver<()>>,
    reply: Result<HttpResponse, ApiError>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, gate: Option<oneshot::Receiver<()>>, reply: Result<HttpResponse, ApiError>) {
        self.replies.lock().unwrap().push_back(Scripted { gate, reply });
    }

    pub fn reply_json(&self, status: u16, body: Value) {
        self.push(None, Ok(json_response(status, body)));
    }

    pub fn reply_empty(&self, status: u16) {
        self.push(None, Ok(empty_response(status)));
    }

    /// Queue a transport failure.
    pub fn fail(&self) {
        self.push(None, Err(ApiError::Transport("connection refused".to_string())));
    }

    /// Queue a JSON reply that is held back until the returned sender fires.
    pub fn reply_json_gated(&self, status: u16, body: Value) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(Some(rx), Ok(json_response(status, body)));
        tx
    }

    /// Queue a transport failure that is held back until the sender fires.
    pub fn fail_gated(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(Some(rx), Err(ApiError::Transport("connection reset".to_string())));
        tx
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `(method, path)` of every request, with the base URL stripped.
    pub fn calls(&self) -> Vec<(HttpMethod, String)> {
        self.requests()
            .into_iter()
            .map(|req| (req.method, req.path.trim_start_matches(BASE_URL).to_string()))
            .collect()
    }

    pub fn last_body(&self) -> Value {
        let requests = self.requests();
        let body = requests.last().and_then(|req| req.body.clone()).expect("request body");
        serde_json::from_str(&body).unwrap()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        let next = self.replies.lock().unwrap().pop_front();
        let Some(scripted) = next else {
            return Err(ApiError::Transport("no route to host".to_string()));
        };
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.reply
    }
}

pub fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: body.to_string(),
    }
}

pub fn empty_response(status: u16) -> HttpResponse {
    HttpResponse {
        status,
        headers: Vec::new(),
        body: String::new(),
    }
}

pub fn todo_json(id: i64, text: &str, completed: bool) -> Value {
    json!({ "id": id, "text": text, "completed": completed })
}

pub fn engine(transport: &Arc<ScriptedTransport>, mirror: &Arc<MemoryMirror>) -> TodoSync {
    TodoSync::new(TodoClient::new(BASE_URL), transport.clone(), mirror.clone())
}

/// An engine whose initial load returned `initial`.
pub async fn mounted(
    transport: &Arc<ScriptedTransport>,
    mirror: &Arc<MemoryMirror>,
    initial: Vec<Value>,
) -> TodoSync {
    transport.reply_json(200, Value::Array(initial));
    TodoSync::mount(TodoClient::new(BASE_URL), transport.clone(), mirror.clone()).await
}

pub fn mirrored(mirror: &MemoryMirror) -> Option<Vec<Todo>> {
    mirror.read().unwrap()
}
