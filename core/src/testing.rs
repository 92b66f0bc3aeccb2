//! Scripted `Transport` for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::storage::MemoryStorage;
use crate::transport::Transport;

pub const BASE_URL: &str = "http://backend.test/api";

#[derive(Clone)]
pub enum Reply {
    Json(u16, String),
    Fail(String),
    /// Never resolves.
    Hang,
    /// Resolves with `Json` once the gate is notified.
    Gated(Arc<Notify>, u16, String),
}

pub fn ok(body: serde_json::Value) -> Reply {
    Reply::Json(200, body.to_string())
}

/// Routes are keyed by `"<METHOD> <path-and-query>"` relative to `BASE_URL`,
/// e.g. `"GET CityApi?countryId=1"`. One-shot replies win over standing ones;
/// unknown routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    standing: Mutex<HashMap<String, Reply>>,
    once: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, route: &str, reply: Reply) -> &Self {
        self.standing.lock().insert(route.to_string(), reply);
        self
    }

    pub fn once(&self, route: &str, reply: Reply) -> &Self {
        self.once
            .lock()
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self, route: &str) -> usize {
        self.requests.lock().iter().filter(|r| route_of(r) == route).count()
    }

    fn reply_for(&self, route: &str) -> Option<Reply> {
        if let Some(reply) = self.once.lock().get_mut(route).and_then(VecDeque::pop_front) {
            return Some(reply);
        }
        self.standing.lock().get(route).cloned()
    }
}

fn route_of(request: &HttpRequest) -> String {
    let path = request
        .url
        .strip_prefix(BASE_URL)
        .unwrap_or(&request.url)
        .trim_start_matches('/');
    format!("{} {path}", request.method)
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let route = route_of(&request);
        self.requests.lock().push(request);

        let response = |status, body| HttpResponse {
            status,
            headers: Vec::new(),
            body,
        };
        match self.reply_for(&route) {
            Some(Reply::Json(status, body)) => Ok(response(status, body)),
            Some(Reply::Fail(msg)) => Err(ApiError::Network(msg)),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Gated(gate, status, body)) => {
                gate.notified().await;
                Ok(response(status, body))
            }
            None => Ok(response(404, String::new())),
        }
    }
}

pub fn client(transport: &Arc<ScriptedTransport>) -> (ApiClient, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let client = ApiClient::new(BASE_URL, transport.clone(), storage.clone());
    (client, storage)
}
