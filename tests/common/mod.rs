#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use assistant_proxy::ProxyError;
use assistant_proxy::ai::AssistantsApi;
use assistant_proxy::core::config::PollConfig;
use async_trait::async_trait;
use serde_json::{Value, json};

/// One scripted upstream answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Value),
    Status(u16, Value),
    Transport(&'static str),
}

impl Reply {
    fn into_result(self) -> Result<Value, ProxyError> {
        match self {
            Reply::Ok(v) => Ok(v),
            Reply::Status(status, details) => Err(ProxyError::UpstreamError { status, details }),
            Reply::Transport(msg) => Err(ProxyError::HttpError(msg.to_string())),
        }
    }
}

#[derive(Debug, Default)]
struct Queues {
    create_thread: VecDeque<Reply>,
    add_message: VecDeque<Reply>,
    create_run: VecDeque<Reply>,
    retrieve_run: VecDeque<Reply>,
    list_messages: VecDeque<Reply>,
}

/// In-memory upstream. Each queue serves its replies in order and repeats the last one.
#[derive(Debug, Default)]
pub struct FakeAssistants {
    queues: Mutex<Queues>,
    calls: Mutex<Vec<String>>,
}

fn next(queue: &mut VecDeque<Reply>, name: &str) -> Reply {
    match queue.len() {
        0 => panic!("no scripted reply for {name}"),
        1 => queue.front().cloned().unwrap(),
        _ => queue.pop_front().unwrap(),
    }
}

impl FakeAssistants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_thread(self, replies: Vec<Reply>) -> Self {
        self.queues.lock().unwrap().create_thread = replies.into();
        self
    }

    pub fn add_message(self, replies: Vec<Reply>) -> Self {
        self.queues.lock().unwrap().add_message = replies.into();
        self
    }

    pub fn create_run(self, replies: Vec<Reply>) -> Self {
        self.queues.lock().unwrap().create_run = replies.into();
        self
    }

    pub fn retrieve_run(self, replies: Vec<Reply>) -> Self {
        self.queues.lock().unwrap().retrieve_run = replies.into();
        self
    }

    pub fn list_messages(self, replies: Vec<Reply>) -> Self {
        self.queues.lock().unwrap().list_messages = replies.into();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AssistantsApi for FakeAssistants {
    async fn create_thread(&self) -> Result<Value, ProxyError> {
        self.record("create_thread".to_string());
        let reply = next(&mut self.queues.lock().unwrap().create_thread, "create_thread");
        reply.into_result()
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<Value, ProxyError> {
        self.record(format!("add_message {thread_id} {content}"));
        let reply = next(&mut self.queues.lock().unwrap().add_message, "add_message");
        reply.into_result()
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Value, ProxyError> {
        self.record(format!("create_run {thread_id} {assistant_id}"));
        let reply = next(&mut self.queues.lock().unwrap().create_run, "create_run");
        reply.into_result()
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Value, ProxyError> {
        self.record(format!("retrieve_run {thread_id} {run_id}"));
        let reply = next(&mut self.queues.lock().unwrap().retrieve_run, "retrieve_run");
        reply.into_result()
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Value, ProxyError> {
        self.record(format!("list_messages {thread_id}"));
        let reply = next(&mut self.queues.lock().unwrap().list_messages, "list_messages");
        reply.into_result()
    }
}

pub fn run(status: &str) -> Reply {
    Reply::Ok(json!({ "id": "run_1", "object": "thread.run", "status": status }))
}

pub fn reply_list(text: &str) -> Reply {
    Reply::Ok(json!({ "data": [{ "content": [{ "text": { "value": text } }] }] }))
}

pub fn no_wait() -> PollConfig {
    PollConfig {
        poll_interval_ms: 0,
        max_attempts: 30,
    }
}

/// API Gateway HTTP API (v2) event with a JSON string body.
pub fn event(method: &str, body: &Value) -> Value {
    json!({
        "rawPath": "/api/assistant",
        "requestContext": { "http": { "method": method } },
        "headers": { "content-type": "application/json" },
        "body": body.to_string(),
        "isBase64Encoded": false
    })
}

pub fn status_of(response: &Value) -> u64 {
    response["statusCode"].as_u64().unwrap()
}

pub fn body_of(response: &Value) -> Value {
    serde_json::from_str(response["body"].as_str().unwrap()).unwrap()
}

pub fn assert_cors(response: &Value) {
    let headers = &response["headers"];
    assert_eq!(headers["Access-Control-Allow-Origin"], "*");
    assert_eq!(headers["Access-Control-Allow-Methods"], "GET, POST, OPTIONS");
    assert_eq!(
        headers["Access-Control-Allow-Headers"],
        "Content-Type, Authorization"
    );
}
