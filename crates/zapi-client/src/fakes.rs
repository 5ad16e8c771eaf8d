//! In-memory transport fake (testing only)
//!
//! `ScriptedTransport` replays canned responses per `(method, path)` and
//! records every call it receives, so tests can assert both on results and
//! on which requests were (or were not) sent.
//!
//! Responses queued for one route are returned in order; the last one is
//! sticky and keeps being returned. Unscripted routes answer 404.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ZapiError;
use crate::transport::{FileUpload, RawResponse, Transport};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Multipart,
}

/// One request seen by the fake
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub payload: Option<Value>,
    pub upload: Option<FileUpload>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(RawResponse),
    Disconnect(String),
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method` + exact `path`.
    pub fn on(self, method: Method, path: impl Into<String>, response: RawResponse) -> Self {
        self.push(method, path.into(), Scripted::Respond(response));
        self
    }

    /// Queue a 200 response with a JSON body.
    pub fn on_json(self, method: Method, path: impl Into<String>, body: Value) -> Self {
        self.on(method, path, RawResponse::new(200, body.to_string()))
    }

    /// Queue a connection failure (no response at all).
    pub fn disconnect_on(self, method: Method, path: impl Into<String>, reason: &str) -> Self {
        self.push(method, path.into(), Scripted::Disconnect(reason.to_string()));
        self
    }

    fn push(&self, method: Method, path: String, scripted: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path))
            .or_default()
            .push_back(scripted);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of calls with `method` whose path starts with `prefix`.
    pub fn count(&self, method: Method, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method && c.path.starts_with(prefix))
            .count()
    }

    fn respond(&self, call: RecordedCall) -> Result<RawResponse> {
        let key = (call.method, call.path.clone());
        self.calls.lock().unwrap().push(call);

        let mut routes = self.routes.lock().unwrap();
        let scripted = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Disconnect(reason)) => Err(ZapiError::Connection(reason)),
            None => Ok(RawResponse::new(
                404,
                r#"{"errorMessages":["No route scripted"]}"#,
            )),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        self.respond(RecordedCall {
            method: Method::Get,
            path: path.to_string(),
            payload: None,
            upload: None,
        })
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<RawResponse> {
        self.respond(RecordedCall {
            method: Method::Post,
            path: path.to_string(),
            payload: Some(payload.clone()),
            upload: None,
        })
    }

    async fn put(&self, path: &str, payload: &Value) -> Result<RawResponse> {
        self.respond(RecordedCall {
            method: Method::Put,
            path: path.to_string(),
            payload: Some(payload.clone()),
            upload: None,
        })
    }

    async fn post_multipart(&self, path: &str, upload: FileUpload) -> Result<RawResponse> {
        self.respond(RecordedCall {
            method: Method::Multipart,
            path: path.to_string(),
            payload: None,
            upload: Some(upload),
        })
    }
}
