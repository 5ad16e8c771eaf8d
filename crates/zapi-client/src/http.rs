//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::config::ZapiConfig;
use crate::error::ZapiError;
use crate::transport::{FileUpload, RawResponse, Transport};
use crate::Result;

/// Header that tells Jira to skip its XSRF check for API calls
pub const XSRF_HEADER: &str = "x-atlassian-token";

/// HTTP transport for a single Jira instance
pub struct HttpTransport {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new transport from configuration
    pub fn new(config: &ZapiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Basic {}", config.auth_key))
            .map_err(|e| ZapiError::Config(format!("invalid auth key: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(XSRF_HEADER, HeaderValue::from_static("no-check"));

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("zapi-client/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(HttpTransport {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn finish(response: reqwest::Response) -> Result<RawResponse> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "response received");
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        debug!(method = "GET", path, "sending request");
        let response = self
            .http_client
            .get(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        Self::finish(response).await
    }

    async fn post(&self, path: &str, payload: &serde_json::Value) -> Result<RawResponse> {
        debug!(method = "POST", path, "sending request");
        let response = self
            .http_client
            .post(self.url(path))
            .json(payload)
            .send()
            .await?;
        Self::finish(response).await
    }

    async fn put(&self, path: &str, payload: &serde_json::Value) -> Result<RawResponse> {
        debug!(method = "PUT", path, "sending request");
        let response = self
            .http_client
            .put(self.url(path))
            .json(payload)
            .send()
            .await?;
        Self::finish(response).await
    }

    async fn post_multipart(&self, path: &str, upload: FileUpload) -> Result<RawResponse> {
        debug!(
            method = "POST",
            path,
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "sending multipart request"
        );
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)
            .map_err(|e| {
                ZapiError::InvalidInput(format!("invalid MIME type '{}': {}", upload.mime_type, e))
            })?;
        let form = Form::new().part("file", part);

        // Content-Type is set by reqwest (multipart boundary)
        let response = self
            .http_client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await?;
        Self::finish(response).await
    }
}
