#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use DoneDepConsole::notifications::NoticeQueue;
use DoneDepConsole::services::api_client::{ApiClient, ApiRequest, RawResponse, Transport, TransportError};
use DoneDepConsole::token_storage::TokenStorage;

/// Replays queued replies per `METHOD path`. The last reply queued for a
/// route is repeated once the queue runs dry; unknown routes fail like a
/// refused connection.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Result<RawResponse, TransportError>>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

fn route(method: &Method, path: &str) -> String {
    format!("{} {}", method, path)
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.push(method, path, Ok(RawResponse::json(status, body)));
    }

    pub fn fail(&self, method: Method, path: &str, error: TransportError) {
        self.push(method, path, Err(error));
    }

    fn push(&self, method: Method, path: &str, reply: Result<RawResponse, TransportError>) {
        self.replies
            .lock()
            .unwrap()
            .entry(route(&method, path))
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        let queue = match replies.get_mut(&route(&request.method, &request.path)) {
            Some(queue) => queue,
            None => return Err(TransportError::Network("connection refused".to_string())),
        };
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        reply.unwrap_or_else(|| Err(TransportError::Network("connection refused".to_string())))
    }
}

pub fn client(transport: Arc<ScriptedTransport>) -> (ApiClient, Arc<NoticeQueue>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let events = Arc::new(NoticeQueue::new());
    let client = ApiClient::new(transport, Arc::new(TokenStorage::in_memory()), events.clone());
    (client, events)
}

/// An unsigned JWT whose `exp` is `exp_secs`.
pub fn jwt_with_exp(exp_secs: i64) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{}}}"#, exp_secs));
    format!("{}.{}.signature", header, claims)
}
