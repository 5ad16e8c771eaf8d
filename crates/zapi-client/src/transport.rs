//! Transport trait definition
//!
//! `Transport` is the only seam between the client and the network. It
//! sends one request and hands back the raw status and body; it does not
//! interpret either. Status classification and JSON decoding live in the
//! `api` module so every transport behaves identically.
//!
//! The reqwest-backed implementation is [`HttpTransport`](crate::HttpTransport);
//! an in-memory scripted fake is provided in the `fakes` module.

use async_trait::async_trait;

use crate::Result;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A file to send as the single `file` part of a multipart upload.
///
/// Holds the bytes already read, so the local file handle is released
/// before the request is made.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Sends requests to the Jira base URL.
///
/// Paths are relative to the base URL, without a leading slash
/// (e.g. `rest/api/2/issue/DEMO-1`). Implementations must attach the
/// Basic auth token, JSON content negotiation headers and the
/// `X-Atlassian-Token: no-check` marker to every request.
///
/// `Err` is reserved for requests that produced no response at all;
/// every HTTP status, including errors, comes back as `Ok(RawResponse)`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<RawResponse>;

    async fn post(&self, path: &str, payload: &serde_json::Value) -> Result<RawResponse>;

    async fn put(&self, path: &str, payload: &serde_json::Value) -> Result<RawResponse>;

    async fn post_multipart(&self, path: &str, upload: FileUpload) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        (**self).get(path).await
    }

    async fn post(&self, path: &str, payload: &serde_json::Value) -> Result<RawResponse> {
        (**self).post(path, payload).await
    }

    async fn put(&self, path: &str, payload: &serde_json::Value) -> Result<RawResponse> {
        (**self).put(path, payload).await
    }

    async fn post_multipart(&self, path: &str, upload: FileUpload) -> Result<RawResponse> {
        (**self).post_multipart(path, upload).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        (**self).get(path).await
    }

    async fn post(&self, path: &str, payload: &serde_json::Value) -> Result<RawResponse> {
        (**self).post(path, payload).await
    }

    async fn put(&self, path: &str, payload: &serde_json::Value) -> Result<RawResponse> {
        (**self).put(path, payload).await
    }

    async fn post_multipart(&self, path: &str, upload: FileUpload) -> Result<RawResponse> {
        (**self).post_multipart(path, upload).await
    }
}
