//! HTTP transport
//!
//! The core talks to the upstream API through the [`Transport`] trait so it
//! never inspects transport internals; the reqwest-backed implementation
//! maps every failure into one of the three error categories (upstream
//! rejection, malformed body, connection-level failure). A recording
//! [`MockTransport`] is available for integration tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{ConfigError, CrosspostError, QuotaUsage, Result, TransportError, UpstreamError};
use crate::media;
use crate::request::WireField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// Outbound payload: nothing, a JSON document, or a multipart field set
#[derive(Debug, Clone)]
pub enum Payload {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<WireField>),
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one call and return the parsed response body.
    ///
    /// # Errors
    ///
    /// - non-2xx response: [`CrosspostError::Upstream`] carrying the status
    ///   and parsed error text (plus quota counters when present)
    /// - unparseable response body: [`TransportError::MalformedResponse`]
    /// - no definitive response: [`TransportError::Timeout`] or
    ///   [`TransportError::Connection`]
    async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<serde_json::Value>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(ConfigError::MissingField("api.key".to_string()).into());
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| ConfigError::MissingField("api.key".to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| TransportError::Connection(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn multipart_form(fields: Vec<WireField>) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for field in fields {
            match field {
                WireField::Text { name, value } => {
                    form = form.text(name, value);
                }
                WireField::File { name, path } => {
                    let bytes = tokio::fs::read(&path).await.map_err(|e| {
                        CrosspostError::InvalidInput(format!(
                            "Failed to read {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "upload".to_string());
                    let part = reqwest::multipart::Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(media::mime_for_path(&path))
                        .map_err(|e| {
                            TransportError::Connection(format!("invalid part: {}", e))
                        })?;
                    form = form.part(name, part);
                }
            }
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };

        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&body),
            Payload::Multipart(fields) => request.multipart(Self::multipart_form(fields).await?),
        };

        let response = request.send().await.map_err(classify_send_error)?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        if !status.is_success() {
            let (message, usage) = parse_error_body(&text);
            return Err(UpstreamError {
                status: status.as_u16(),
                message,
                usage,
            }
            .into());
        }

        serde_json::from_str(&text)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()).into())
    }
}

fn classify_send_error(e: reqwest::Error) -> CrosspostError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string()).into()
    } else {
        TransportError::Connection(e.to_string()).into()
    }
}

/// Pull the upstream message and optional quota counters out of an error
/// body. Bodies that are not the expected JSON shape are passed through
/// verbatim so the caller still sees what the upstream said.
fn parse_error_body(text: &str) -> (String, Option<QuotaUsage>) {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(body) => {
            let message = body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or(text)
                .to_string();
            let usage = body
                .get("usage")
                .and_then(|u| serde_json::from_value::<QuotaUsage>(u.clone()).ok());
            (message, usage)
        }
        Err(_) => (text.to_string(), None),
    }
}

// ============================================================================
// Mock transport
// ============================================================================

/// A recorded outbound call
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub payload: Payload,
}

/// Recording transport for tests: queue responses, then inspect what was
/// sent. An exhausted queue answers with an empty JSON object.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<serde_json::Value>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, body: serde_json::Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    pub fn push_upstream_error(&self, status: u16, message: &str, usage: Option<QuotaUsage>) {
        self.responses.lock().unwrap().push_back(Err(UpstreamError {
            status,
            message: message.to_string(),
            usage,
        }
        .into()));
    }

    pub fn push_transport_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error.into()));
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<serde_json::Value> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            payload,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(serde_json::json!({})))
    }
}
