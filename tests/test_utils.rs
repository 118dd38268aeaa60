use std::collections::VecDeque;
use std::sync::{Mutex, Once};
use std::time::Duration;

use moneybird_rs::{ApiClient, Error, RemoteResult, Result};
use serde_json::Value;
use tracing::info;

/// A request as the mock client received it. JSON bodies are parsed for easy comparison.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// An in-memory [`ApiClient`] that records every request and answers from a queue.
///
/// When the queue runs dry it answers 404 without a body.
#[derive(Debug, Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<RemoteResult>>>,
    requests: Mutex<Vec<Request>>,
}

#[allow(dead_code)]
impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with a JSON body.
    pub fn respond(&self, status: u16, body: Value) -> &Self {
        self.push(Ok(RemoteResult::new(status, Some(body))))
    }

    /// Queues a response without a body.
    pub fn respond_empty(&self, status: u16) -> &Self {
        self.push(Ok(RemoteResult::new(status, None)))
    }

    /// Queues the error a transport raises when MoneyBird answers 429.
    pub fn rate_limited(&self) -> &Self {
        self.push(Err(Error::RateLimitExceeded {
            retry_after: Some(Duration::from_secs(60)),
            url: "https://moneybird.com/api/v2/1/contacts".to_string(),
            response_body: None,
        }))
    }

    fn push(&self, response: Result<RemoteResult>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<Request> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn record(
        &self,
        method: &'static str,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<RemoteResult> {
        info!(method, path, "mock request");
        self.requests.lock().unwrap().push(Request {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body: body.map(|body| serde_json::from_str(body).unwrap()),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RemoteResult::new(404, None)))
    }
}

impl ApiClient for MockClient {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RemoteResult> {
        self.record("GET", path, query, None)
    }

    async fn post(&self, path: &str, body: &str) -> Result<RemoteResult> {
        self.record("POST", path, &[], Some(body))
    }

    async fn patch(&self, path: &str, body: &str) -> Result<RemoteResult> {
        self.record("PATCH", path, &[], Some(body))
    }

    async fn delete(&self, path: &str) -> Result<RemoteResult> {
        self.record("DELETE", path, &[], None)
    }
}

/// Turns a `json!` object into the field map models hydrate from.
#[allow(dead_code)]
pub fn fields(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(fields) => fields,
        other => panic!("expected a JSON object, got {other}"),
    }
}

static LOGGING_CONFIGURED: Once = Once::new();

/// Setup before test runs
#[allow(dead_code)]
pub fn do_setup() {
    LOGGING_CONFIGURED.call_once(|| tracing_subscriber::fmt().with_test_writer().init());
    info!("Setting up test environment");
}
